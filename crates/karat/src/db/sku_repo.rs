//! SKU repository: catalog designs in the `skus` table.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use super::{optional_row, DatabaseError};

/// A catalog design. The image blob is loaded separately.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkuRow {
    pub id: String,
    pub code: String,
    pub name: String,
    pub category: String,
    pub metal: String,
    pub stone_count: i64,
    pub diamond_count: i64,
    pub has_image: bool,
    pub created_at: String,
}

const COLUMNS: &str = "id, code, name, category, metal, stone_count, diamond_count,
                       image IS NOT NULL AS has_image, created_at";

impl SkuRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            code: row.get("code")?,
            name: row.get("name")?,
            category: row.get("category")?,
            metal: row.get("metal")?,
            stone_count: row.get("stone_count")?,
            diamond_count: row.get("diamond_count")?,
            has_image: row.get("has_image")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub fn insert(conn: &Connection, sku: &SkuRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO skus (id, code, name, category, metal, stone_count, diamond_count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            sku.id,
            sku.code,
            sku.name,
            sku.category,
            sku.metal,
            sku.stone_count,
            sku.diamond_count,
            sku.created_at,
        ],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<SkuRow>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM skus WHERE id = ?1", COLUMNS))?;
    let rows = stmt.query_map(params![id], SkuRow::from_row)?;
    optional_row(rows)
}

pub fn find_by_code(conn: &Connection, code: &str) -> Result<Option<SkuRow>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM skus WHERE code = ?1", COLUMNS))?;
    let rows = stmt.query_map(params![code], SkuRow::from_row)?;
    optional_row(rows)
}

/// All SKUs ordered by code.
pub fn list(conn: &Connection) -> Result<Vec<SkuRow>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM skus ORDER BY code", COLUMNS))?;
    let rows = stmt
        .query_map([], SkuRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Stores the (already compressed) product image.
pub fn set_image(conn: &Connection, id: &str, image: &[u8]) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE skus SET image = ?2 WHERE id = ?1",
        params![id, image],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NoRowUpdated {
            table: "skus",
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn get_image(conn: &Connection, id: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT image FROM skus WHERE id = ?1")?;
    let rows = stmt.query_map(params![id], |r| r.get::<_, Option<Vec<u8>>>(0))?;
    Ok(optional_row(rows)?.flatten())
}
