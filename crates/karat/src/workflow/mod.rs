//! The job workflow map.
//!
//! Phase and order status are always derived from a job's status through
//! the functions in this module. Nothing else in the crate keeps its own
//! copy of these tables.

pub mod phase;
pub mod progress;
pub mod status;
pub mod transition;

pub use phase::{phase_info, JobPhase, PhaseInfo};
pub use progress::{progress_steps, ProgressStep, StepState};
pub use status::{JobStatus, OrderStatus};
pub use transition::{check_transition, next_statuses};

use crate::error::WorkflowError;

/// Maps a job status to the workflow phase that handles it.
///
/// `QcFailed` goes back to `Manufacturer`: a failed piece is reworked.
pub const fn phase_for_status(status: JobStatus) -> JobPhase {
    match status {
        JobStatus::New | JobStatus::BagCreated => JobPhase::Stone,
        JobStatus::StoneSelected => JobPhase::Diamond,
        JobStatus::DiamondSelected
        | JobStatus::SentToManufacturer
        | JobStatus::InProduction
        | JobStatus::QcFailed => JobPhase::Manufacturer,
        JobStatus::ReceivedFromManufacturer => JobPhase::Qc,
        JobStatus::QcPassed | JobStatus::Completed => JobPhase::Complete,
    }
}

/// Resolves a raw status string to its phase.
///
/// Unknown statuses are an error, never a default phase.
pub fn resolve_phase(raw_status: &str) -> Result<JobPhase, WorkflowError> {
    raw_status.parse::<JobStatus>().map(phase_for_status)
}

/// Per-job contribution to the parent order's status.
pub const fn order_status_for_job_status(status: JobStatus) -> OrderStatus {
    match status {
        JobStatus::New => OrderStatus::New,
        JobStatus::Completed => OrderStatus::Completed,
        _ => OrderStatus::Pending,
    }
}

/// Builds the screen route for a job, e.g. `/jobs/JOB-0001/quality-check`.
pub fn job_route(display_id: &str, status: JobStatus) -> String {
    format!(
        "/jobs/{}/{}",
        display_id,
        phase_for_status(status).route_segment()
    )
}

/// Checks a stored phase against the one derived from `status`.
pub fn verify_phase(
    job_id: &str,
    status: JobStatus,
    stored: JobPhase,
) -> Result<(), WorkflowError> {
    let expected = phase_for_status(status);
    if expected == stored {
        Ok(())
    } else {
        Err(WorkflowError::PhaseMismatch {
            job_id: job_id.to_string(),
            status: status.to_string(),
            stored: stored.to_string(),
            expected: expected.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_table() {
        let expected = [
            (JobStatus::New, JobPhase::Stone),
            (JobStatus::BagCreated, JobPhase::Stone),
            (JobStatus::StoneSelected, JobPhase::Diamond),
            (JobStatus::DiamondSelected, JobPhase::Manufacturer),
            (JobStatus::SentToManufacturer, JobPhase::Manufacturer),
            (JobStatus::InProduction, JobPhase::Manufacturer),
            (JobStatus::ReceivedFromManufacturer, JobPhase::Qc),
            (JobStatus::QcPassed, JobPhase::Complete),
            (JobStatus::QcFailed, JobPhase::Manufacturer),
            (JobStatus::Completed, JobPhase::Complete),
        ];
        assert_eq!(expected.len(), JobStatus::ALL.len());
        for (status, phase) in expected {
            assert_eq!(phase_for_status(status), phase, "{}", status);
        }
    }

    #[test]
    fn test_every_phase_is_reachable() {
        for phase in JobPhase::ALL {
            assert!(
                JobStatus::ALL.iter().any(|s| phase_for_status(*s) == phase),
                "no status maps to {}",
                phase
            );
        }
    }

    #[test]
    fn test_qc_failed_returns_to_manufacturer() {
        assert_eq!(resolve_phase("QC Failed").unwrap(), JobPhase::Manufacturer);
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        assert_eq!(
            resolve_phase("Shipped"),
            Err(WorkflowError::UnmappedStatus("Shipped".to_string()))
        );
        assert!(resolve_phase("").is_err());
    }

    #[test]
    fn test_order_status_lookup() {
        assert_eq!(order_status_for_job_status(JobStatus::New), OrderStatus::New);
        assert_eq!(
            order_status_for_job_status(JobStatus::Completed),
            OrderStatus::Completed
        );
        let pending = JobStatus::ALL
            .iter()
            .filter(|s| order_status_for_job_status(**s) == OrderStatus::Pending)
            .count();
        assert_eq!(pending, 8);
    }

    #[test]
    fn test_job_route() {
        assert_eq!(
            job_route("JOB-0007", JobStatus::ReceivedFromManufacturer),
            "/jobs/JOB-0007/quality-check"
        );
        assert_eq!(
            job_route("JOB-0001", JobStatus::New),
            "/jobs/JOB-0001/stone-selection"
        );
    }

    #[test]
    fn test_verify_phase() {
        assert!(verify_phase("j1", JobStatus::QcFailed, JobPhase::Manufacturer).is_ok());
        let err = verify_phase("j1", JobStatus::QcFailed, JobPhase::Complete).unwrap_err();
        assert!(matches!(err, WorkflowError::PhaseMismatch { ref expected, .. } if expected == "manufacturer"));
    }
}
