//! Versioned schema migrations.
//!
//! Each step is applied once, inside its own transaction, and recorded in
//! `schema_version`. Opening an existing database only runs the steps it
//! has not seen yet.

use rusqlite::{params, Connection};

use super::error::DatabaseError;

/// Schema steps in the order they apply.
const STEPS: &[(u32, &str, &str)] = &[
    (1, "catalog", include_str!("sql/001_create_catalog.sql")),
    (2, "lots", include_str!("sql/002_create_lots.sql")),
    (3, "orders", include_str!("sql/003_create_orders.sql")),
    (4, "jobs", include_str!("sql/004_create_jobs.sql")),
    (5, "allocations", include_str!("sql/005_create_allocations.sql")),
    (6, "job_history", include_str!("sql/006_create_job_history.sql")),
];

/// Current schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<u32, DatabaseError> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}

/// Brings the schema up to the latest version.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let from = current_version(conn)?;
    for &(version, name, sql) in STEPS.iter().filter(|(v, _, _)| *v > from) {
        log::info!("Applying schema v{} ({})", version, name);

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql).map_err(|e| DatabaseError::Migration {
            version,
            reason: e.to_string(),
        })?;
        tx.execute(
            "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
            params![version, name],
        )?;
        tx.commit()?;
    }

    Ok(())
}
