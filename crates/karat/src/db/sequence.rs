//! Named counters backing human-readable display IDs.

use rusqlite::{params, Connection};

use super::DatabaseError;

/// Increments the named sequence and returns its new value (first call yields 1).
pub fn next_value(conn: &Connection, name: &str) -> Result<i64, DatabaseError> {
    let value = conn.query_row(
        "INSERT INTO sequences (name, value) VALUES (?1, 1)
         ON CONFLICT(name) DO UPDATE SET value = value + 1
         RETURNING value",
        params![name],
        |r| r.get(0),
    )?;
    Ok(value)
}
