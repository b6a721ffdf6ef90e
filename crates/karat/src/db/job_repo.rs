//! Job repository: CRUD operations for the `jobs` table.
//!
//! Status and phase are plain strings here; `models::Job` is where they
//! are parsed and checked against the workflow map.

use rusqlite::{params, Connection, Row};

use super::{optional_row, DatabaseError, WhereBuilder, DISPLAY_NUMBER};

/// A raw job row from the database.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub display_id: String,
    pub order_id: String,
    pub sku_id: String,
    pub status: String,
    pub current_phase: String,
    pub manufacturer_id: Option<String>,
    pub bag_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            display_id: row.get("display_id")?,
            order_id: row.get("order_id")?,
            sku_id: row.get("sku_id")?,
            status: row.get("status")?,
            current_phase: row.get("current_phase")?,
            manufacturer_id: row.get("manufacturer_id")?,
            bag_id: row.get("bag_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            completed_at: row.get("completed_at")?,
        })
    }
}

/// Query filter parameters for job listing.
#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub status: Option<String>,
    pub phase: Option<String>,
    pub order_id: Option<String>,
    pub manufacturer_id: Option<String>,
    pub exclude_status: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Inserts a new job row.
pub fn insert(conn: &Connection, job: &JobRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO jobs (id, display_id, order_id, sku_id, status, current_phase,
         manufacturer_id, bag_id, created_at, updated_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            job.id,
            job.display_id,
            job.order_id,
            job.sku_id,
            job.status,
            job.current_phase,
            job.manufacturer_id,
            job.bag_id,
            job.created_at,
            job.updated_at,
            job.completed_at,
        ],
    )?;
    Ok(())
}

/// Writes the workflow fields of `job`, but only if the stored status is
/// still `expected_status`. A concurrent move makes this fail with
/// `NoRowUpdated` instead of overwriting it.
pub fn update_workflow(
    conn: &Connection,
    job: &JobRow,
    expected_status: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE jobs SET status = ?2, current_phase = ?3, manufacturer_id = ?4, bag_id = ?5,
         updated_at = ?6, completed_at = ?7
         WHERE id = ?1 AND status = ?8",
        params![
            job.id,
            job.status,
            job.current_phase,
            job.manufacturer_id,
            job.bag_id,
            job.updated_at,
            job.completed_at,
            expected_status,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NoRowUpdated {
            table: "jobs",
            id: job.id.clone(),
        });
    }
    Ok(())
}

/// Finds a job by its ID or display ID.
pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<JobRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM jobs WHERE id = ?1 OR display_id = ?1")?;
    let rows = stmt.query_map(params![id], JobRow::from_row)?;
    optional_row(rows)
}

/// Queries jobs with filters, returning (rows, total_count).
pub fn query(conn: &Connection, filter: &JobFilter) -> Result<(Vec<JobRow>, u64), DatabaseError> {
    let mut wb = WhereBuilder::default();
    wb.push("status", "=", filter.status.clone());
    wb.push("current_phase", "=", filter.phase.clone());
    wb.push("order_id", "=", filter.order_id.clone());
    wb.push("manufacturer_id", "=", filter.manufacturer_id.clone());
    wb.push("status", "!=", filter.exclude_status.clone());
    let where_clause = wb.clause();

    let total: u64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM jobs {}", where_clause),
        wb.params().as_slice(),
        |r| r.get(0),
    )?;

    let limit_idx = wb.bind(filter.limit.unwrap_or(100) as i64);
    let offset_idx = wb.bind(filter.offset.unwrap_or(0) as i64);
    let sql = format!(
        "SELECT * FROM jobs {} ORDER BY created_at DESC, {} DESC LIMIT ?{} OFFSET ?{}",
        where_clause, DISPLAY_NUMBER, limit_idx, offset_idx
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(wb.params().as_slice(), JobRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok((rows, total))
}

/// All jobs of an order, oldest first.
pub fn for_order(conn: &Connection, order_id: &str) -> Result<Vec<JobRow>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM jobs WHERE order_id = ?1 ORDER BY {}",
        DISPLAY_NUMBER
    ))?;
    let rows = stmt
        .query_map(params![order_id], JobRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Job counts grouped by a column (`status` or `current_phase`).
pub fn count_grouped(
    conn: &Connection,
    column: GroupColumn,
) -> Result<Vec<(String, u64)>, DatabaseError> {
    let col = match column {
        GroupColumn::Status => "status",
        GroupColumn::Phase => "current_phase",
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {col}, COUNT(*) FROM jobs GROUP BY {col} ORDER BY {col}"
    ))?;
    let rows = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, u64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, Copy)]
pub enum GroupColumn {
    Status,
    Phase,
}
