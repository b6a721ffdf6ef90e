//! Lot repository: stone and diamond lots plus their allocations to jobs.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use super::{optional_row, DatabaseError, WhereBuilder, DISPLAY_NUMBER};

/// Tolerance for carat comparisons; weights are kept to 1/1000 ct.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// A raw lot row from the database.
#[derive(Debug, Clone)]
pub struct LotRow {
    pub id: String,
    pub display_id: String,
    pub kind: String,
    pub description: String,
    pub supplier: Option<String>,
    pub total_quantity: i64,
    pub available_quantity: i64,
    pub total_weight_ct: f64,
    pub available_weight_ct: f64,
    pub received_at: String,
}

impl LotRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            display_id: row.get("display_id")?,
            kind: row.get("kind")?,
            description: row.get("description")?,
            supplier: row.get("supplier")?,
            total_quantity: row.get("total_quantity")?,
            available_quantity: row.get("available_quantity")?,
            total_weight_ct: row.get("total_weight_ct")?,
            available_weight_ct: row.get("available_weight_ct")?,
            received_at: row.get("received_at")?,
        })
    }
}

/// Query filter parameters for lot listing.
#[derive(Debug, Default, Clone)]
pub struct LotFilter {
    pub kind: Option<String>,
    /// Only lots with pieces left.
    pub available_only: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// A recorded draw from a lot for a job.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRow {
    pub id: i64,
    pub job_id: String,
    pub lot_id: String,
    pub quantity: i64,
    pub weight_ct: f64,
    pub allocated_at: String,
}

pub fn insert(conn: &Connection, lot: &LotRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO lots (id, display_id, kind, description, supplier, total_quantity,
         available_quantity, total_weight_ct, available_weight_ct, received_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            lot.id,
            lot.display_id,
            lot.kind,
            lot.description,
            lot.supplier,
            lot.total_quantity,
            lot.available_quantity,
            lot.total_weight_ct,
            lot.available_weight_ct,
            lot.received_at,
        ],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<LotRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM lots WHERE id = ?1 OR display_id = ?1")?;
    let rows = stmt.query_map(params![id], LotRow::from_row)?;
    optional_row(rows)
}

/// Queries lots with filters, returning (rows, total_count).
pub fn query(conn: &Connection, filter: &LotFilter) -> Result<(Vec<LotRow>, u64), DatabaseError> {
    let mut wb = WhereBuilder::default();
    wb.push("kind", "=", filter.kind.clone());
    if filter.available_only {
        wb.push("available_quantity", ">", Some(0i64));
    }
    let where_clause = wb.clause();

    let total: u64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM lots {}", where_clause),
        wb.params().as_slice(),
        |r| r.get(0),
    )?;

    let limit_idx = wb.bind(filter.limit.unwrap_or(100) as i64);
    let offset_idx = wb.bind(filter.offset.unwrap_or(0) as i64);
    let sql = format!(
        "SELECT * FROM lots {} ORDER BY received_at DESC, {} DESC LIMIT ?{} OFFSET ?{}",
        where_clause, DISPLAY_NUMBER, limit_idx, offset_idx
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(wb.params().as_slice(), LotRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok((rows, total))
}

/// Removes pieces and weight from a lot's availability.
///
/// The update is guarded so availability never goes below zero; a draw that
/// does not fit matches no row and fails with `NoRowUpdated`.
pub fn draw(
    conn: &Connection,
    lot_id: &str,
    quantity: i64,
    weight_ct: f64,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE lots SET
           available_quantity = available_quantity - ?2,
           available_weight_ct = MAX(available_weight_ct - ?3, 0)
         WHERE id = ?1 AND available_quantity >= ?2 AND available_weight_ct + ?4 >= ?3",
        params![lot_id, quantity, weight_ct, WEIGHT_EPSILON],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NoRowUpdated {
            table: "lots",
            id: lot_id.to_string(),
        });
    }
    Ok(())
}

pub fn insert_allocation(
    conn: &Connection,
    job_id: &str,
    lot_id: &str,
    quantity: i64,
    weight_ct: f64,
    allocated_at: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO allocations (job_id, lot_id, quantity, weight_ct, allocated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![job_id, lot_id, quantity, weight_ct, allocated_at],
    )?;
    Ok(conn.last_insert_rowid())
}

fn allocation_from_row(row: &Row<'_>) -> Result<AllocationRow, rusqlite::Error> {
    Ok(AllocationRow {
        id: row.get("id")?,
        job_id: row.get("job_id")?,
        lot_id: row.get("lot_id")?,
        quantity: row.get("quantity")?,
        weight_ct: row.get("weight_ct")?,
        allocated_at: row.get("allocated_at")?,
    })
}

pub fn allocations_for_job(
    conn: &Connection,
    job_id: &str,
) -> Result<Vec<AllocationRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM allocations WHERE job_id = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map(params![job_id], allocation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn allocations_for_lot(
    conn: &Connection,
    lot_id: &str,
) -> Result<Vec<AllocationRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM allocations WHERE lot_id = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map(params![lot_id], allocation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
