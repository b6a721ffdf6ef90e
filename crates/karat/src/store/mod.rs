//! The ERP store: catalog, orders, lots and the job workflow on top of the
//! database.
//!
//! Every write goes through one SQLite transaction. Job moves re-aggregate
//! the parent order and are broadcast to subscribers after commit.

use std::path::PathBuf;

use rusqlite::Connection;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::aggregate::{Aggregation, OrderStatusAggregator, UnanimousAggregator};
use crate::config::Config;
use crate::db::{self, job_repo, order_repo, sequence, Database};
use crate::error::{KaratError, Result};
use crate::events::{JobTransitionEvent, TransitionBroadcaster};
use crate::ids;
use crate::workflow::{JobStatus, OrderStatus};

mod catalog;
mod orders;
mod queries;
mod transitions;

pub use catalog::{LotQuery, NewLot, NewManufacturer, NewSku};
pub use orders::{NewOrder, OrderDetail, OrderQuery};
pub use queries::{JobDetail, JobQuery, WorkflowSummary};
pub use transitions::JobAction;

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

pub struct ErpStore {
    db: Database,
    config: Config,
    events: TransitionBroadcaster,
    aggregator: Box<dyn OrderStatusAggregator>,
}

impl ErpStore {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            config,
            events: TransitionBroadcaster::default(),
            aggregator: Box::new(UnanimousAggregator),
        }
    }

    /// Opens the database named by `config` (or the default location).
    pub fn open(config: Config) -> Result<Self> {
        let path = match &config.database_path {
            Some(p) => PathBuf::from(p),
            None => db::default_database_path().ok_or_else(|| {
                KaratError::InvalidInput("Cannot determine home directory".to_string())
            })?,
        };
        let db = Database::open(&path)?;
        Ok(Self::new(db, config))
    }

    pub fn open_in_memory(config: Config) -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?, config))
    }

    /// Replaces the order-status aggregation rule.
    pub fn with_aggregator(mut self, aggregator: impl OrderStatusAggregator + 'static) -> Self {
        self.aggregator = Box::new(aggregator);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobTransitionEvent> {
        self.events.subscribe()
    }

    fn next_display_id(&self, conn: &Connection, prefix: &str) -> Result<String> {
        let n = sequence::next_value(conn, prefix)?;
        Ok(ids::format_display_id(
            prefix,
            n,
            self.config.display_id_width,
        ))
    }

    fn page(&self, limit: Option<u64>, offset: Option<u64>) -> (u64, u64) {
        (
            self.config.pagination.page_size(limit),
            offset.unwrap_or(0),
        )
    }

    /// Recomputes an order's status from its jobs.
    ///
    /// Returns the new status when it changed.
    fn reaggregate_order(
        &self,
        conn: &Connection,
        order_id: &str,
        updated_at: &str,
    ) -> Result<Option<OrderStatus>> {
        let order = order_repo::find_by_id(conn, order_id)?
            .ok_or_else(|| KaratError::not_found("Order", order_id))?;
        let current: OrderStatus = order.status.parse()?;

        let statuses = job_repo::for_order(conn, &order.id)?
            .iter()
            .map(|j| j.status.parse::<JobStatus>())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        match self.aggregator.aggregate(&statuses) {
            Aggregation::Determined(status) if status != current => {
                order_repo::update_status(conn, &order.id, status.as_str(), updated_at)?;
                log::info!(
                    "Order {} moved from {} to {}",
                    order.display_id,
                    current,
                    status
                );
                Ok(Some(status))
            }
            Aggregation::Determined(_) => Ok(None),
            Aggregation::Undetermined => {
                log::info!(
                    "Order {} has jobs in mixed states, status left at {}",
                    order.display_id,
                    current
                );
                Ok(None)
            }
        }
    }
}
