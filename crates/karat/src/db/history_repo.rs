//! Status history of jobs. One row per workflow move.

use rusqlite::{params, Connection};
use serde::Serialize;

use super::DatabaseError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub job_id: String,
    /// `None` for the entry written when the job is created.
    pub from_status: Option<String>,
    pub to_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub changed_at: String,
}

pub fn insert(conn: &Connection, entry: &HistoryRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO job_history (job_id, from_status, to_status, note, changed_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.job_id,
            entry.from_status,
            entry.to_status,
            entry.note,
            entry.changed_at,
        ],
    )?;
    Ok(())
}

/// History of a job in the order it happened.
pub fn for_job(conn: &Connection, job_id: &str) -> Result<Vec<HistoryRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT job_id, from_status, to_status, note, changed_at
         FROM job_history WHERE job_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![job_id], |row| {
            Ok(HistoryRow {
                job_id: row.get(0)?,
                from_status: row.get(1)?,
                to_status: row.get(2)?,
                note: row.get(3)?,
                changed_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
