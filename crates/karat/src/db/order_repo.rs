//! Order repository: the `orders` and `order_items` tables.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use super::{optional_row, DatabaseError, WhereBuilder, DISPLAY_NUMBER};

/// A raw order row from the database.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub display_id: String,
    pub customer_name: String,
    pub status: String,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl OrderRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            display_id: row.get("display_id")?,
            customer_name: row.get("customer_name")?,
            status: row.get("status")?,
            due_date: row.get("due_date")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// One line of an order: a SKU and how many pieces of it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: String,
    pub sku_id: String,
    pub quantity: i64,
}

/// Query filter parameters for order listing.
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub customer_name: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub fn insert(conn: &Connection, order: &OrderRow) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO orders (id, display_id, customer_name, status, due_date, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            order.id,
            order.display_id,
            order.customer_name,
            order.status,
            order.due_date,
            order.notes,
            order.created_at,
            order.updated_at,
        ],
    )?;
    Ok(())
}

pub fn insert_item(
    conn: &Connection,
    order_id: &str,
    sku_id: &str,
    quantity: i64,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO order_items (order_id, sku_id, quantity) VALUES (?1, ?2, ?3)",
        params![order_id, sku_id, quantity],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Finds an order by its ID or display ID.
pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<OrderRow>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM orders WHERE id = ?1 OR display_id = ?1")?;
    let rows = stmt.query_map(params![id], OrderRow::from_row)?;
    optional_row(rows)
}

pub fn items_for_order(
    conn: &Connection,
    order_id: &str,
) -> Result<Vec<OrderItemRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, order_id, sku_id, quantity FROM order_items WHERE order_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![order_id], |row| {
            Ok(OrderItemRow {
                id: row.get(0)?,
                order_id: row.get(1)?,
                sku_id: row.get(2)?,
                quantity: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Queries orders with filters, returning (rows, total_count).
pub fn query(
    conn: &Connection,
    filter: &OrderFilter,
) -> Result<(Vec<OrderRow>, u64), DatabaseError> {
    let mut wb = WhereBuilder::default();
    wb.push("status", "=", filter.status.clone());
    wb.push("customer_name", "=", filter.customer_name.clone());
    let where_clause = wb.clause();

    let total: u64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM orders {}", where_clause),
        wb.params().as_slice(),
        |r| r.get(0),
    )?;

    let limit_idx = wb.bind(filter.limit.unwrap_or(100) as i64);
    let offset_idx = wb.bind(filter.offset.unwrap_or(0) as i64);
    let sql = format!(
        "SELECT * FROM orders {} ORDER BY created_at DESC, {} DESC LIMIT ?{} OFFSET ?{}",
        where_clause, DISPLAY_NUMBER, limit_idx, offset_idx
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(wb.params().as_slice(), OrderRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok((rows, total))
}

/// Updates only the status and updated_at of an order.
pub fn update_status(
    conn: &Connection,
    id: &str,
    status: &str,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, status, updated_at],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NoRowUpdated {
            table: "orders",
            id: id.to_string(),
        });
    }
    Ok(())
}
