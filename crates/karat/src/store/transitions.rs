//! Actions that move a job through the workflow.

use chrono::Utc;
use rusqlite::Connection;

use super::ErpStore;
use crate::db::history_repo::{self, HistoryRow};
use crate::db::lot_repo::{self, WEIGHT_EPSILON};
use crate::db::{job_repo, manufacturer_repo};
use crate::error::{AllocationError, KaratError, Result};
use crate::events::JobTransitionEvent;
use crate::models::{format_timestamp, Job, Lot, LotKind};
use crate::workflow::{check_transition, JobStatus};

/// A workflow move together with the data it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum JobAction {
    CreateBag,
    SelectStones {
        lot_id: String,
        quantity: i64,
        weight_ct: f64,
    },
    SelectDiamonds {
        lot_id: String,
        quantity: i64,
        weight_ct: f64,
    },
    SendToManufacturer {
        manufacturer_id: String,
    },
    StartProduction,
    ReceiveFromManufacturer,
    RecordQc {
        passed: bool,
    },
    Complete,
}

impl JobAction {
    /// Status the job ends up in.
    pub fn target(&self) -> JobStatus {
        match self {
            JobAction::CreateBag => JobStatus::BagCreated,
            JobAction::SelectStones { .. } => JobStatus::StoneSelected,
            JobAction::SelectDiamonds { .. } => JobStatus::DiamondSelected,
            JobAction::SendToManufacturer { .. } => JobStatus::SentToManufacturer,
            JobAction::StartProduction => JobStatus::InProduction,
            JobAction::ReceiveFromManufacturer => JobStatus::ReceivedFromManufacturer,
            JobAction::RecordQc { passed: true } => JobStatus::QcPassed,
            JobAction::RecordQc { passed: false } => JobStatus::QcFailed,
            JobAction::Complete => JobStatus::Completed,
        }
    }
}

impl ErpStore {
    /// Applies `action` to a job in one transaction, re-aggregates its order
    /// and broadcasts the move.
    pub fn apply(&self, job_id: &str, action: JobAction, note: Option<String>) -> Result<Job> {
        let to = action.target();
        let _span = tracing::info_span!("store.transition", job = %job_id, to = %to).entered();

        let now = Utc::now();
        let now_str = format_timestamp(now);

        let (job, from, order_status) = self.db.with_tx(|tx| {
            let row = job_repo::find_by_id(tx, job_id)?
                .ok_or_else(|| KaratError::not_found("Job", job_id))?;
            let mut job = Job::from_row(&row)?;
            let from = job.status;
            check_transition(from, to)?;

            self.perform(tx, &mut job, &action, &now_str)?;

            job.set_status(to, now);
            job_repo::update_workflow(tx, &job.to_row(), from.as_str())?;
            history_repo::insert(
                tx,
                &HistoryRow {
                    job_id: job.id.clone(),
                    from_status: Some(from.to_string()),
                    to_status: to.to_string(),
                    note,
                    changed_at: now_str.clone(),
                },
            )?;

            let order_status = self.reaggregate_order(tx, &job.order_id, &now_str)?;
            Ok::<_, KaratError>((job, from, order_status))
        })?;

        log::info!(
            "Job {} moved from {} to {} (phase {})",
            job.display_id,
            from,
            job.status,
            job.current_phase
        );

        self.events.send(JobTransitionEvent {
            job_id: job.id.clone(),
            display_id: job.display_id.clone(),
            order_id: job.order_id.clone(),
            from_status: Some(from),
            to_status: job.status,
            phase: job.current_phase,
            order_status,
            route: job.route(),
            timestamp: now,
        });

        Ok(job)
    }

    pub fn create_bag(&self, job_id: &str) -> Result<Job> {
        self.apply(job_id, JobAction::CreateBag, None)
    }

    pub fn select_stones(
        &self,
        job_id: &str,
        lot_id: &str,
        quantity: i64,
        weight_ct: f64,
    ) -> Result<Job> {
        self.apply(
            job_id,
            JobAction::SelectStones {
                lot_id: lot_id.to_string(),
                quantity,
                weight_ct,
            },
            None,
        )
    }

    pub fn select_diamonds(
        &self,
        job_id: &str,
        lot_id: &str,
        quantity: i64,
        weight_ct: f64,
    ) -> Result<Job> {
        self.apply(
            job_id,
            JobAction::SelectDiamonds {
                lot_id: lot_id.to_string(),
                quantity,
                weight_ct,
            },
            None,
        )
    }

    pub fn send_to_manufacturer(&self, job_id: &str, manufacturer_id: &str) -> Result<Job> {
        self.apply(
            job_id,
            JobAction::SendToManufacturer {
                manufacturer_id: manufacturer_id.to_string(),
            },
            None,
        )
    }

    pub fn start_production(&self, job_id: &str) -> Result<Job> {
        self.apply(job_id, JobAction::StartProduction, None)
    }

    pub fn receive_from_manufacturer(&self, job_id: &str) -> Result<Job> {
        self.apply(job_id, JobAction::ReceiveFromManufacturer, None)
    }

    pub fn record_qc(&self, job_id: &str, passed: bool, note: Option<String>) -> Result<Job> {
        self.apply(job_id, JobAction::RecordQc { passed }, note)
    }

    pub fn complete(&self, job_id: &str) -> Result<Job> {
        self.apply(job_id, JobAction::Complete, None)
    }

    /// Side effects of an action, run inside the move's transaction.
    fn perform(
        &self,
        conn: &Connection,
        job: &mut Job,
        action: &JobAction,
        now: &str,
    ) -> Result<()> {
        match action {
            JobAction::CreateBag => {
                job.bag_id = Some(self.next_display_id(conn, "BAG")?);
            }
            JobAction::SelectStones {
                lot_id,
                quantity,
                weight_ct,
            } => allocate(conn, job, LotKind::Stone, lot_id, *quantity, *weight_ct, now)?,
            JobAction::SelectDiamonds {
                lot_id,
                quantity,
                weight_ct,
            } => allocate(conn, job, LotKind::Diamond, lot_id, *quantity, *weight_ct, now)?,
            JobAction::SendToManufacturer { manufacturer_id } => {
                let m = manufacturer_repo::find_by_id(conn, manufacturer_id)?
                    .ok_or_else(|| KaratError::not_found("Manufacturer", manufacturer_id.as_str()))?;
                if !m.has_capacity() {
                    return Err(AllocationError::ManufacturerAtCapacity {
                        manufacturer_id: m.id,
                        capacity: m.capacity,
                    }
                    .into());
                }
                manufacturer_repo::adjust_load(conn, &m.id, 1, now)?;
                job.manufacturer_id = Some(m.id);
            }
            JobAction::ReceiveFromManufacturer => {
                if let Some(manufacturer_id) = &job.manufacturer_id {
                    manufacturer_repo::adjust_load(conn, manufacturer_id, -1, now)?;
                }
            }
            JobAction::StartProduction | JobAction::RecordQc { .. } | JobAction::Complete => {}
        }
        Ok(())
    }
}

/// Draws `quantity` pieces and `weight_ct` carats from a lot for `job`.
fn allocate(
    conn: &Connection,
    job: &Job,
    kind: LotKind,
    lot_id: &str,
    quantity: i64,
    weight_ct: f64,
    now: &str,
) -> Result<()> {
    if quantity <= 0 || !weight_ct.is_finite() || weight_ct <= 0.0 {
        return Err(AllocationError::NonPositive {
            quantity,
            weight_ct,
        }
        .into());
    }

    let row = lot_repo::find_by_id(conn, lot_id)?
        .ok_or_else(|| KaratError::not_found("Lot", lot_id))?;
    let lot = Lot::from_row(&row)?;

    if lot.kind != kind {
        return Err(AllocationError::WrongLotKind {
            lot_id: lot.display_id,
            expected: kind.to_string(),
            actual: lot.kind.to_string(),
        }
        .into());
    }
    if quantity > lot.available_quantity {
        return Err(AllocationError::InsufficientQuantity {
            lot_id: lot.display_id,
            available: lot.available_quantity,
            requested: quantity,
        }
        .into());
    }
    if weight_ct > lot.available_weight_ct + WEIGHT_EPSILON {
        return Err(AllocationError::InsufficientWeight {
            lot_id: lot.display_id,
            available: lot.available_weight_ct,
            requested: weight_ct,
        }
        .into());
    }

    lot_repo::draw(conn, &lot.id, quantity, weight_ct)?;
    lot_repo::insert_allocation(conn, &job.id, &lot.id, quantity, weight_ct, now)?;

    log::debug!(
        "Allocated {} pcs / {:.3} ct from {} to {}",
        quantity,
        weight_ct,
        lot.display_id,
        job.display_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::error::WorkflowError;
    use crate::workflow::{JobPhase, OrderStatus};

    #[test]
    fn test_full_happy_path() {
        let store = store();
        let stones = lot(&store, LotKind::Stone, 10, 5.0);
        let diamonds = lot(&store, LotKind::Diamond, 200, 4.0);
        let mfr = manufacturer(&store, 5);
        let job = single_job(&store);

        let job = store.create_bag(&job.id).unwrap();
        assert_eq!(job.bag_id.as_deref(), Some("BAG-0001"));
        assert_eq!(job.current_phase, JobPhase::Stone);

        let job = store.select_stones(&job.id, &stones, 1, 0.75).unwrap();
        assert_eq!(job.current_phase, JobPhase::Diamond);

        let job = store.select_diamonds(&job.id, &diamonds, 24, 0.36).unwrap();
        assert_eq!(job.current_phase, JobPhase::Manufacturer);

        let job = store.send_to_manufacturer(&job.id, &mfr).unwrap();
        assert_eq!(job.manufacturer_id.as_deref(), Some(mfr.as_str()));
        assert_eq!(store.get_manufacturer(&mfr).unwrap().current_load, 1);

        let job = store.start_production(&job.id).unwrap();
        let job = store.receive_from_manufacturer(&job.id).unwrap();
        assert_eq!(job.current_phase, JobPhase::Qc);
        assert_eq!(store.get_manufacturer(&mfr).unwrap().current_load, 0);

        let job = store.record_qc(&job.id, true, None).unwrap();
        assert_eq!(job.current_phase, JobPhase::Complete);
        assert!(job.completed_at.is_none());

        let job = store.complete(&job.id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());

        let order = store.get_order(&job.order_id).unwrap();
        assert_eq!(order.order.status, OrderStatus::Completed);

        let stone_lot = store.get_lot(&stones).unwrap();
        assert_eq!(stone_lot.available_quantity, 9);
        assert!((stone_lot.available_weight_ct - 4.25).abs() < 1e-9);
    }

    #[test]
    fn test_illegal_transition() {
        let store = store();
        let job = single_job(&store);
        let err = store.complete(&job.id).unwrap_err();
        assert!(matches!(
            err,
            KaratError::Workflow(WorkflowError::IllegalTransition { .. })
        ));
        assert_eq!(store.get_job(&job.id).unwrap().status, JobStatus::New);
    }

    #[test]
    fn test_qc_failure_returns_to_manufacturer() {
        let store = store();
        let stones = lot(&store, LotKind::Stone, 10, 5.0);
        let diamonds = lot(&store, LotKind::Diamond, 200, 4.0);
        let mfr = manufacturer(&store, 5);
        let job = single_job(&store);

        store.select_stones(&job.id, &stones, 1, 0.5).unwrap();
        store.select_diamonds(&job.id, &diamonds, 10, 0.2).unwrap();
        store.send_to_manufacturer(&job.id, &mfr).unwrap();
        store.receive_from_manufacturer(&job.id).unwrap();

        let failed = store
            .record_qc(&job.id, false, Some("Prong loose".to_string()))
            .unwrap();
        assert_eq!(failed.status, JobStatus::QcFailed);
        assert_eq!(failed.current_phase, JobPhase::Manufacturer);
        assert_eq!(failed.route(), format!("/jobs/{}/manufacturer", failed.display_id));

        let resent = store.send_to_manufacturer(&job.id, &mfr).unwrap();
        assert_eq!(resent.status, JobStatus::SentToManufacturer);

        let history = store.job_history(&job.id).unwrap();
        let qc = history
            .iter()
            .find(|h| h.to_status == "QC Failed")
            .unwrap();
        assert_eq!(qc.note.as_deref(), Some("Prong loose"));
    }

    #[test]
    fn test_over_allocation_is_rejected() {
        let store = store();
        let stones = lot(&store, LotKind::Stone, 2, 1.0);
        let job = single_job(&store);

        let err = store.select_stones(&job.id, &stones, 3, 0.5).unwrap_err();
        assert!(matches!(
            err,
            KaratError::Allocation(AllocationError::InsufficientQuantity { available: 2, .. })
        ));

        let err = store.select_stones(&job.id, &stones, 1, 1.5).unwrap_err();
        assert!(matches!(
            err,
            KaratError::Allocation(AllocationError::InsufficientWeight { .. })
        ));

        // Nothing was drawn and the job did not move.
        let lot = store.get_lot(&stones).unwrap();
        assert_eq!(lot.available_quantity, 2);
        assert_eq!(store.get_job(&job.id).unwrap().status, JobStatus::New);
        assert!(store.job_allocations(&job.id).unwrap().is_empty());
    }

    #[test]
    fn test_exact_weight_can_be_drawn() {
        let store = store();
        let stones = lot(&store, LotKind::Stone, 1, 0.3);
        let job = single_job(&store);
        store.select_stones(&job.id, &stones, 1, 0.3).unwrap();

        let lot = store.get_lot(&stones).unwrap();
        assert_eq!(lot.available_quantity, 0);
        assert!(lot.available_weight_ct.abs() < 1e-9);
    }

    #[test]
    fn test_wrong_lot_kind() {
        let store = store();
        let diamonds = lot(&store, LotKind::Diamond, 100, 2.0);
        let job = single_job(&store);
        let err = store.select_stones(&job.id, &diamonds, 1, 0.1).unwrap_err();
        assert!(matches!(
            err,
            KaratError::Allocation(AllocationError::WrongLotKind { .. })
        ));
    }

    #[test]
    fn test_non_positive_allocation() {
        let store = store();
        let stones = lot(&store, LotKind::Stone, 10, 5.0);
        let job = single_job(&store);
        for (qty, weight) in [
            (0, 0.5),
            (1, 0.0),
            (1, f64::NAN),
            (1, f64::INFINITY),
            (-1, 0.5),
        ] {
            let err = store.select_stones(&job.id, &stones, qty, weight).unwrap_err();
            assert!(matches!(
                err,
                KaratError::Allocation(AllocationError::NonPositive { .. })
            ));
        }
        assert_eq!(store.get_lot(&stones).unwrap().available_weight_ct, 5.0);
    }

    #[test]
    fn test_manufacturer_capacity() {
        let store = store();
        let stones = lot(&store, LotKind::Stone, 10, 5.0);
        let diamonds = lot(&store, LotKind::Diamond, 200, 4.0);
        let mfr = manufacturer(&store, 1);
        let jobs = order(&store, 2).jobs;

        for job in &jobs {
            store.select_stones(&job.id, &stones, 1, 0.5).unwrap();
            store.select_diamonds(&job.id, &diamonds, 10, 0.2).unwrap();
        }
        store.send_to_manufacturer(&jobs[0].id, &mfr).unwrap();
        let err = store.send_to_manufacturer(&jobs[1].id, &mfr).unwrap_err();
        assert!(matches!(
            err,
            KaratError::Allocation(AllocationError::ManufacturerAtCapacity { capacity: 1, .. })
        ));
    }

    #[test]
    fn test_mixed_order_keeps_status() {
        let store = store();
        let jobs = order(&store, 2).jobs;

        // One job moves, the other stays New: the jobs disagree.
        store.create_bag(&jobs[0].id).unwrap();
        let order = store.get_order(&jobs[0].order_id).unwrap();
        assert_eq!(order.order.status, OrderStatus::New);

        // Both pending now.
        store.create_bag(&jobs[1].id).unwrap();
        let order = store.get_order(&jobs[0].order_id).unwrap();
        assert_eq!(order.order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_transition_is_broadcast() {
        let store = store();
        let job = single_job(&store);
        let mut rx = store.subscribe();

        store.create_bag(&job.id).unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.from_status, Some(JobStatus::New));
        assert_eq!(event.to_status, JobStatus::BagCreated);
        assert_eq!(event.order_status, Some(OrderStatus::Pending));
    }

    #[test]
    fn test_action_targets() {
        assert_eq!(
            JobAction::RecordQc { passed: false }.target(),
            JobStatus::QcFailed
        );
        assert_eq!(JobAction::CreateBag.target(), JobStatus::BagCreated);
    }
}
