use serde::Serialize;

use super::{phase_for_status, phase_info, JobPhase, JobStatus, PhaseInfo};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Done,
    Current,
    Upcoming,
}

/// One entry of a job's progress tracker.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressStep {
    pub phase: JobPhase,
    pub state: StepState,
    pub info: &'static PhaseInfo,
}

/// Lays out all phases for `status`, marking the ones behind, at and ahead
/// of the job. A completed job has every step done.
pub fn progress_steps(status: JobStatus) -> Vec<ProgressStep> {
    let current = phase_for_status(status);
    JobPhase::ALL
        .iter()
        .map(|&phase| {
            let state = if status.is_terminal() || phase < current {
                StepState::Done
            } else if phase == current {
                StepState::Current
            } else {
                StepState::Upcoming
            };
            ProgressStep {
                phase,
                state,
                info: phase_info(phase),
            }
        })
        .collect()
}
