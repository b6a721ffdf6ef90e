//! Manufacturer repository: fulfillment partners and their load counters.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use super::{optional_row, DatabaseError};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerRow {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub rating: f64,
    pub current_load: i64,
    pub capacity: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl ManufacturerRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            contact: row.get("contact")?,
            rating: row.get("rating")?,
            current_load: row.get("current_load")?,
            capacity: row.get("capacity")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn has_capacity(&self) -> bool {
        self.current_load < self.capacity
    }
}

pub fn insert(conn: &Connection, m: &ManufacturerRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO manufacturers (id, name, contact, rating, current_load, capacity, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            m.id,
            m.name,
            m.contact,
            m.rating,
            m.current_load,
            m.capacity,
            m.created_at,
            m.updated_at,
        ],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<ManufacturerRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM manufacturers WHERE id = ?1")?;
    let rows = stmt.query_map(params![id], ManufacturerRow::from_row)?;
    optional_row(rows)
}

/// All manufacturers, best rated first.
pub fn list(conn: &Connection) -> Result<Vec<ManufacturerRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM manufacturers ORDER BY rating DESC, name")?;
    let rows = stmt
        .query_map([], ManufacturerRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Adds `delta` to the current load. The schema's CHECK keeps it non-negative.
pub fn adjust_load(
    conn: &Connection,
    id: &str,
    delta: i64,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE manufacturers SET current_load = current_load + ?2, updated_at = ?3 WHERE id = ?1",
        params![id, delta, updated_at],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NoRowUpdated {
            table: "manufacturers",
            id: id.to_string(),
        });
    }
    Ok(())
}
