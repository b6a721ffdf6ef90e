//! Read-side views of jobs.

use serde::Serialize;

use super::{ErpStore, ListResponse};
use crate::db::history_repo::{self, HistoryRow};
use crate::db::job_repo::{self, GroupColumn, JobFilter};
use crate::db::lot_repo::{self, AllocationRow};
use crate::error::{KaratError, Result};
use crate::models::Job;
use crate::workflow::{next_statuses, progress_steps, JobPhase, JobStatus, ProgressStep};

#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    pub status: Option<JobStatus>,
    pub phase: Option<JobPhase>,
    pub order_id: Option<String>,
    pub manufacturer_id: Option<String>,
    /// Leave out completed jobs.
    pub open_only: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Everything a job screen shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub job: Job,
    pub route: String,
    pub progress: Vec<ProgressStep>,
    pub next_statuses: Vec<JobStatus>,
    pub history: Vec<HistoryRow>,
    pub allocations: Vec<AllocationRow>,
}

/// Job counts per phase and per status. Every phase is listed, zero or not.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub by_phase: Vec<(JobPhase, u64)>,
    pub by_status: Vec<(JobStatus, u64)>,
}

impl ErpStore {
    /// Finds a job by ID or display ID.
    pub fn get_job(&self, id: &str) -> Result<Job> {
        self.db.with_conn(|conn| {
            let row = job_repo::find_by_id(conn, id)?
                .ok_or_else(|| KaratError::not_found("Job", id))?;
            Ok(Job::from_row(&row)?)
        })
    }

    pub fn job_detail(&self, id: &str) -> Result<JobDetail> {
        let job = self.get_job(id)?;
        let (history, allocations) = self.db.with_conn(|conn| {
            Ok::<_, KaratError>((
                history_repo::for_job(conn, &job.id)?,
                lot_repo::allocations_for_job(conn, &job.id)?,
            ))
        })?;

        Ok(JobDetail {
            route: job.route(),
            progress: progress_steps(job.status),
            next_statuses: next_statuses(job.status).to_vec(),
            history,
            allocations,
            job,
        })
    }

    pub fn job_history(&self, id: &str) -> Result<Vec<HistoryRow>> {
        let job = self.get_job(id)?;
        self.db
            .with_conn(|conn| history_repo::for_job(conn, &job.id).map_err(KaratError::from))
    }

    pub fn job_allocations(&self, id: &str) -> Result<Vec<AllocationRow>> {
        let job = self.get_job(id)?;
        self.db.with_conn(|conn| {
            lot_repo::allocations_for_job(conn, &job.id).map_err(KaratError::from)
        })
    }

    /// Jobs, newest first.
    pub fn list_jobs(&self, query: &JobQuery) -> Result<ListResponse<Job>> {
        let (limit, offset) = self.page(query.limit, query.offset);
        let filter = JobFilter {
            status: query.status.map(|s| s.to_string()),
            phase: query.phase.map(|p| p.to_string()),
            order_id: query.order_id.clone(),
            manufacturer_id: query.manufacturer_id.clone(),
            exclude_status: query
                .open_only
                .then(|| JobStatus::Completed.to_string()),
            limit: Some(limit),
            offset: Some(offset),
        };

        self.db.with_conn(|conn| {
            let (rows, total) = job_repo::query(conn, &filter)?;
            let items = rows
                .iter()
                .map(Job::from_row)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ListResponse {
                items,
                total,
                limit,
                offset,
            })
        })
    }

    /// Counts jobs per phase and status.
    ///
    /// A stored value outside the workflow tables is an error, not a bucket.
    pub fn workflow_summary(&self) -> Result<WorkflowSummary> {
        let (phases, statuses) = self.db.with_conn(|conn| {
            Ok::<_, KaratError>((
                job_repo::count_grouped(conn, GroupColumn::Phase)?,
                job_repo::count_grouped(conn, GroupColumn::Status)?,
            ))
        })?;

        let mut by_phase: Vec<(JobPhase, u64)> = JobPhase::ALL.iter().map(|&p| (p, 0)).collect();
        for (raw, count) in phases {
            let phase: JobPhase = raw.parse()?;
            by_phase[phase.index()].1 = count;
        }

        let mut by_status = Vec::with_capacity(statuses.len());
        for (raw, count) in statuses {
            by_status.push((raw.parse::<JobStatus>()?, count));
        }
        by_status.sort();

        Ok(WorkflowSummary {
            by_phase,
            by_status,
        })
    }
}
