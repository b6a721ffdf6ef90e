//! Typed domain records built from raw database rows.

pub mod job;
pub mod lot;
pub mod order;

pub use job::Job;
pub use lot::{Lot, LotKind};
pub use order::{Order, OrderLine};

use chrono::{DateTime, Utc};

pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::warn!("parse_timestamp: failed to parse '{}': {}", s, e);
            Utc::now()
        })
}

pub(crate) fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
