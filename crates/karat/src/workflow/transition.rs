//! Legal status moves for the phase-transition actions.

use super::JobStatus;
use crate::error::WorkflowError;

/// Statuses a job may move to from `from`.
pub fn next_statuses(from: JobStatus) -> &'static [JobStatus] {
    use JobStatus::*;

    match from {
        // Stones may be selected straight away, the bag is optional.
        New => &[BagCreated, StoneSelected],
        BagCreated => &[StoneSelected],
        StoneSelected => &[DiamondSelected],
        DiamondSelected => &[SentToManufacturer],
        SentToManufacturer => &[InProduction, ReceivedFromManufacturer],
        InProduction => &[ReceivedFromManufacturer],
        ReceivedFromManufacturer => &[QcPassed, QcFailed],
        QcPassed => &[Completed],
        QcFailed => &[SentToManufacturer],
        Completed => &[],
    }
}

/// Fails with `IllegalTransition` unless `from -> to` is a legal move.
pub fn check_transition(from: JobStatus, to: JobStatus) -> Result<(), WorkflowError> {
    if next_statuses(from).contains(&to) {
        Ok(())
    } else {
        Err(WorkflowError::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{phase_for_status, JobPhase};

    #[test]
    fn test_completed_has_no_moves() {
        assert!(next_statuses(JobStatus::Completed).is_empty());
    }

    #[test]
    fn test_every_status_reaches_completed() {
        for start in JobStatus::ALL {
            let mut seen = vec![start];
            let mut frontier = vec![start];
            while let Some(s) = frontier.pop() {
                for next in next_statuses(s) {
                    if !seen.contains(next) {
                        seen.push(*next);
                        frontier.push(*next);
                    }
                }
            }
            assert!(seen.contains(&JobStatus::Completed), "{} is stuck", start);
        }
    }

    #[test]
    fn test_phase_never_moves_backwards_except_rework() {
        for from in JobStatus::ALL {
            for to in next_statuses(from) {
                let (a, b) = (phase_for_status(from), phase_for_status(*to));
                if b < a {
                    assert_eq!(from, JobStatus::ReceivedFromManufacturer);
                    assert_eq!(*to, JobStatus::QcFailed);
                    assert_eq!(b, JobPhase::Manufacturer);
                }
            }
        }
    }

    #[test]
    fn test_illegal_transition() {
        let err = check_transition(JobStatus::New, JobStatus::Completed).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::IllegalTransition {
                from: "New".to_string(),
                to: "Completed".to_string(),
            }
        );
        assert!(check_transition(JobStatus::QcFailed, JobStatus::SentToManufacturer).is_ok());
    }
}
