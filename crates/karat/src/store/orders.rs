use chrono::Utc;
use serde::Serialize;

use super::{ErpStore, ListResponse};
use crate::db::history_repo::{self, HistoryRow};
use crate::db::order_repo::{self, OrderFilter, OrderRow};
use crate::db::{job_repo, sku_repo};
use crate::error::{KaratError, Result};
use crate::events::JobTransitionEvent;
use crate::ids;
use crate::models::{format_timestamp, Job, Order, OrderLine};
use crate::workflow::OrderStatus;

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    /// SKUs may be given by ID or code.
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub customer_name: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// An order with its jobs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: Order,
    pub jobs: Vec<Job>,
}

impl ErpStore {
    /// Creates an order and one `New` job per piece ordered.
    pub fn create_order(&self, new: NewOrder) -> Result<OrderDetail> {
        let _span =
            tracing::info_span!("store.create_order", customer = %new.customer_name).entered();

        let customer_name = new.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return Err(KaratError::InvalidInput(
                "Customer name is empty".to_string(),
            ));
        }
        if new.lines.is_empty() {
            return Err(KaratError::InvalidInput(
                "An order needs at least one line".to_string(),
            ));
        }
        if let Some(line) = new.lines.iter().find(|l| l.quantity <= 0) {
            return Err(KaratError::InvalidInput(format!(
                "Quantity for SKU {} must be positive, got {}",
                line.sku_id, line.quantity
            )));
        }

        let now = Utc::now();
        let now_str = format_timestamp(now);

        let detail = self.db.with_tx(|tx| {
            let row = OrderRow {
                id: ids::new_id(),
                display_id: self.next_display_id(tx, ids::ORDER_PREFIX)?,
                customer_name,
                status: OrderStatus::New.to_string(),
                due_date: new.due_date,
                notes: new.notes,
                created_at: now_str.clone(),
                updated_at: now_str.clone(),
            };
            order_repo::insert(tx, &row)?;

            let mut items = Vec::with_capacity(new.lines.len());
            let mut jobs = Vec::new();
            for line in &new.lines {
                let sku = match sku_repo::find_by_id(tx, &line.sku_id)? {
                    Some(s) => s,
                    None => sku_repo::find_by_code(tx, &line.sku_id)?
                        .ok_or_else(|| KaratError::not_found("SKU", line.sku_id.as_str()))?,
                };
                let item_id = order_repo::insert_item(tx, &row.id, &sku.id, line.quantity)?;
                items.push(order_repo::OrderItemRow {
                    id: item_id,
                    order_id: row.id.clone(),
                    sku_id: sku.id.clone(),
                    quantity: line.quantity,
                });

                for _ in 0..line.quantity {
                    let job = Job::new(
                        ids::new_id(),
                        self.next_display_id(tx, ids::JOB_PREFIX)?,
                        row.id.clone(),
                        sku.id.clone(),
                        now,
                    );
                    job_repo::insert(tx, &job.to_row())?;
                    history_repo::insert(
                        tx,
                        &HistoryRow {
                            job_id: job.id.clone(),
                            from_status: None,
                            to_status: job.status.to_string(),
                            note: None,
                            changed_at: now_str.clone(),
                        },
                    )?;
                    jobs.push(job);
                }
            }

            let order = Order::from_rows(&row, &items)?;
            Ok::<_, KaratError>(OrderDetail { order, jobs })
        })?;

        log::info!(
            "Created order {} for {} with {} job(s)",
            detail.order.display_id,
            detail.order.customer_name,
            detail.jobs.len()
        );

        for job in &detail.jobs {
            self.events.send(JobTransitionEvent {
                job_id: job.id.clone(),
                display_id: job.display_id.clone(),
                order_id: job.order_id.clone(),
                from_status: None,
                to_status: job.status,
                phase: job.current_phase,
                order_status: None,
                route: job.route(),
                timestamp: now,
            });
        }

        Ok(detail)
    }

    /// Finds an order by ID or display ID, with its jobs.
    pub fn get_order(&self, id: &str) -> Result<OrderDetail> {
        self.db.with_conn(|conn| {
            let row = order_repo::find_by_id(conn, id)?
                .ok_or_else(|| KaratError::not_found("Order", id))?;
            let items = order_repo::items_for_order(conn, &row.id)?;
            let order = Order::from_rows(&row, &items)?;
            let jobs = job_repo::for_order(conn, &row.id)?
                .iter()
                .map(Job::from_row)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(OrderDetail { order, jobs })
        })
    }

    /// Orders, newest first.
    pub fn list_orders(&self, query: &OrderQuery) -> Result<ListResponse<Order>> {
        let (limit, offset) = self.page(query.limit, query.offset);
        let filter = OrderFilter {
            status: query.status.map(|s| s.to_string()),
            customer_name: query.customer_name.clone(),
            limit: Some(limit),
            offset: Some(offset),
        };

        self.db.with_conn(|conn| {
            let (rows, total) = order_repo::query(conn, &filter)?;
            let mut items = Vec::with_capacity(rows.len());
            for row in &rows {
                let lines = order_repo::items_for_order(conn, &row.id)?;
                items.push(Order::from_rows(row, &lines)?);
            }
            Ok(ListResponse {
                items,
                total,
                limit,
                offset,
            })
        })
    }
}
