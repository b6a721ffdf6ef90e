use chrono::{DateTime, Utc};
use serde::Serialize;

use super::parse_timestamp;
use crate::db::order_repo::{OrderItemRow, OrderRow};
use crate::error::WorkflowError;
use crate::workflow::OrderStatus;

/// A line item: SKU and quantity.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub sku_id: String,
    pub quantity: i64,
}

impl From<&OrderItemRow> for OrderLine {
    fn from(row: &OrderItemRow) -> Self {
        Self {
            sku_id: row.sku_id.clone(),
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub display_id: String,
    pub customer_name: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn from_rows(row: &OrderRow, items: &[OrderItemRow]) -> Result<Self, WorkflowError> {
        Ok(Self {
            id: row.id.clone(),
            display_id: row.display_id.clone(),
            customer_name: row.customer_name.clone(),
            status: row.status.parse()?,
            due_date: row.due_date.clone(),
            notes: row.notes.clone(),
            lines: items.iter().map(OrderLine::from).collect(),
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
        })
    }

    /// Total pieces across all lines (one job per piece).
    pub fn piece_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}
