use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{format_timestamp, parse_timestamp};
use crate::db::job_repo::JobRow;
use crate::error::WorkflowError;
use crate::workflow::{job_route, phase_for_status, verify_phase, JobPhase, JobStatus};

/// A manufacturing job with its workflow state parsed and verified.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub display_id: String,
    pub order_id: String,
    pub sku_id: String,
    pub status: JobStatus,
    pub current_phase: JobPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bag_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Creates a job in the `New` status.
    pub fn new(
        id: String,
        display_id: String,
        order_id: String,
        sku_id: String,
        now: DateTime<Utc>,
    ) -> Self {
        let status = JobStatus::New;
        Self {
            id,
            display_id,
            order_id,
            sku_id,
            status,
            current_phase: phase_for_status(status),
            manufacturer_id: None,
            bag_id: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Parses a database row.
    ///
    /// Fails on an unknown status or phase, or when the stored phase is not
    /// the one the status maps to.
    pub fn from_row(row: &JobRow) -> Result<Self, WorkflowError> {
        let status: JobStatus = row.status.parse()?;
        let stored_phase: JobPhase = row.current_phase.parse()?;
        verify_phase(&row.id, status, stored_phase)?;

        Ok(Self {
            id: row.id.clone(),
            display_id: row.display_id.clone(),
            order_id: row.order_id.clone(),
            sku_id: row.sku_id.clone(),
            status,
            current_phase: stored_phase,
            manufacturer_id: row.manufacturer_id.clone(),
            bag_id: row.bag_id.clone(),
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
            completed_at: row.completed_at.as_deref().map(parse_timestamp),
        })
    }

    pub fn to_row(&self) -> JobRow {
        JobRow {
            id: self.id.clone(),
            display_id: self.display_id.clone(),
            order_id: self.order_id.clone(),
            sku_id: self.sku_id.clone(),
            status: self.status.to_string(),
            current_phase: self.current_phase.to_string(),
            manufacturer_id: self.manufacturer_id.clone(),
            bag_id: self.bag_id.clone(),
            created_at: format_timestamp(self.created_at),
            updated_at: format_timestamp(self.updated_at),
            completed_at: self.completed_at.map(format_timestamp),
        }
    }

    /// Moves the job to `status`, recomputing its phase.
    ///
    /// Does not check that the move is legal; see `workflow::check_transition`.
    pub fn set_status(&mut self, status: JobStatus, now: DateTime<Utc>) {
        self.status = status;
        self.current_phase = phase_for_status(status);
        self.updated_at = now;
        if status.is_terminal() {
            self.completed_at = Some(now);
        }
    }

    /// Screen route for the job's current phase.
    pub fn route(&self) -> String {
        job_route(&self.display_id, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, phase: &str) -> JobRow {
        JobRow {
            id: "j1".to_string(),
            display_id: "JOB-0001".to_string(),
            order_id: "o1".to_string(),
            sku_id: "s1".to_string(),
            status: status.to_string(),
            current_phase: phase.to_string(),
            manufacturer_id: None,
            bag_id: None,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
            completed_at: None,
        }
    }

    #[test]
    fn test_from_row_consistent() {
        let job = Job::from_row(&row("Stone Selected", "diamond")).unwrap();
        assert_eq!(job.status, JobStatus::StoneSelected);
        assert_eq!(job.current_phase, JobPhase::Diamond);
        assert_eq!(job.route(), "/jobs/JOB-0001/diamond-selection");
    }

    #[test]
    fn test_from_row_rejects_unknown_status() {
        let err = Job::from_row(&row("Shipped", "stone")).unwrap_err();
        assert_eq!(err, WorkflowError::UnmappedStatus("Shipped".to_string()));
    }

    #[test]
    fn test_from_row_rejects_stale_phase() {
        // The old listing logic filed failed QC under "complete".
        let err = Job::from_row(&row("QC Failed", "complete")).unwrap_err();
        assert!(matches!(err, WorkflowError::PhaseMismatch { .. }));
    }

    #[test]
    fn test_set_status_recomputes_phase() {
        let now = Utc::now();
        let mut job = Job::new(
            "j1".into(),
            "JOB-0001".into(),
            "o1".into(),
            "s1".into(),
            now,
        );
        assert_eq!(job.current_phase, JobPhase::Stone);

        job.set_status(JobStatus::ReceivedFromManufacturer, now);
        assert_eq!(job.current_phase, JobPhase::Qc);
        assert!(job.completed_at.is_none());

        job.set_status(JobStatus::Completed, now);
        assert_eq!(job.current_phase, JobPhase::Complete);
        assert_eq!(job.completed_at, Some(now));
    }

    #[test]
    fn test_row_round_trip() {
        let job = Job::from_row(&row("QC Failed", "manufacturer")).unwrap();
        let again = Job::from_row(&job.to_row()).unwrap();
        assert_eq!(job, again);
    }
}
