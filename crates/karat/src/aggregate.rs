//! Order-level status from the statuses of an order's jobs.
//!
//! How an order with jobs in different phases should be summarized is a
//! business rule that has not been decided. The store only depends on the
//! `OrderStatusAggregator` trait; the shipped implementation answers the
//! cases where every job agrees and declines the rest.

use crate::workflow::{order_status_for_job_status, JobStatus, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Determined(OrderStatus),
    /// The aggregator has no rule for this mix; the order keeps its status.
    Undetermined,
}

pub trait OrderStatusAggregator: Send + Sync {
    fn aggregate(&self, job_statuses: &[JobStatus]) -> Aggregation;
}

/// Answers only when every job maps to the same order status.
///
/// This is exact for single-job orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnanimousAggregator;

impl OrderStatusAggregator for UnanimousAggregator {
    fn aggregate(&self, job_statuses: &[JobStatus]) -> Aggregation {
        let mut mapped = job_statuses.iter().map(|s| order_status_for_job_status(*s));
        let Some(first) = mapped.next() else {
            return Aggregation::Undetermined;
        };
        if mapped.all(|s| s == first) {
            Aggregation::Determined(first)
        } else {
            Aggregation::Undetermined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_job_follows_lookup() {
        let agg = UnanimousAggregator;
        for status in JobStatus::ALL {
            assert_eq!(
                agg.aggregate(&[status]),
                Aggregation::Determined(order_status_for_job_status(status))
            );
        }
    }

    #[test]
    fn test_agreeing_jobs() {
        let agg = UnanimousAggregator;
        assert_eq!(
            agg.aggregate(&[JobStatus::StoneSelected, JobStatus::InProduction]),
            Aggregation::Determined(OrderStatus::Pending)
        );
        assert_eq!(
            agg.aggregate(&[JobStatus::Completed, JobStatus::Completed]),
            Aggregation::Determined(OrderStatus::Completed)
        );
    }

    #[test]
    fn test_mixed_jobs_are_undetermined() {
        let agg = UnanimousAggregator;
        assert_eq!(
            agg.aggregate(&[JobStatus::New, JobStatus::Completed]),
            Aggregation::Undetermined
        );
        assert_eq!(
            agg.aggregate(&[JobStatus::QcPassed, JobStatus::Completed]),
            Aggregation::Undetermined
        );
    }

    #[test]
    fn test_no_jobs_is_undetermined() {
        assert_eq!(UnanimousAggregator.aggregate(&[]), Aggregation::Undetermined);
    }
}
