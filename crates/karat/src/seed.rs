//! Demo data for trying out the workflow screens.
//!
//! The same catalog, lots, manufacturers and orders are created on every
//! run. Jobs are spread over every status by driving them through the
//! store's own actions, so their phases come from the workflow map like any
//! other job's.

use serde::Serialize;

use crate::error::{KaratError, Result};
use crate::models::{LotKind, OrderLine};
use crate::store::{
    ErpStore, JobAction, LotQuery, NewLot, NewManufacturer, NewOrder, NewSku, OrderQuery,
};
use crate::workflow::JobStatus;

struct SkuSeed {
    code: &'static str,
    name: &'static str,
    category: &'static str,
    metal: &'static str,
    stone_count: i64,
    diamond_count: i64,
}

const SKUS: [SkuSeed; 4] = [
    SkuSeed {
        code: "RING-SOL-01",
        name: "Classic Solitaire Ring",
        category: "ring",
        metal: "18k white gold",
        stone_count: 1,
        diamond_count: 8,
    },
    SkuSeed {
        code: "RING-HALO-02",
        name: "Halo Engagement Ring",
        category: "ring",
        metal: "platinum",
        stone_count: 1,
        diamond_count: 24,
    },
    SkuSeed {
        code: "PEND-DROP-01",
        name: "Teardrop Pendant",
        category: "pendant",
        metal: "18k yellow gold",
        stone_count: 1,
        diamond_count: 12,
    },
    SkuSeed {
        code: "EAR-STUD-01",
        name: "Cluster Stud Earrings",
        category: "earrings",
        metal: "14k rose gold",
        stone_count: 2,
        diamond_count: 14,
    },
];

const MANUFACTURERS: [(&str, f64, i64); 3] = [
    ("Aurum Works", 4.8, 8),
    ("Meridian Casting", 4.2, 6),
    ("Northgate Setters", 3.9, 4),
];

const CUSTOMERS: [&str; 12] = [
    "Hartley", "Mercer", "Okafor", "Lindqvist", "Tanaka", "Moreau", "Castillo", "Novak",
    "Brennan", "Achterberg", "Ramanathan", "Whitfield",
];

/// What `generate` created.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub skus: usize,
    pub lots: usize,
    pub manufacturers: usize,
    pub orders: usize,
    pub jobs: usize,
}

/// Fills an empty database with demo data.
pub fn generate(store: &ErpStore) -> Result<SeedSummary> {
    let _span = tracing::info_span!("seed.generate").entered();

    let occupied = !store.list_skus()?.is_empty()
        || !store.list_manufacturers()?.is_empty()
        || store.list_lots(&LotQuery::default())?.total > 0
        || store.list_orders(&OrderQuery::default())?.total > 0;
    if occupied {
        return Err(KaratError::InvalidInput(
            "Database already contains data, refusing to seed".to_string(),
        ));
    }

    let mut summary = SeedSummary::default();

    let mut skus = Vec::with_capacity(SKUS.len());
    for s in &SKUS {
        let row = store.create_sku(NewSku {
            code: s.code.to_string(),
            name: s.name.to_string(),
            category: s.category.to_string(),
            metal: s.metal.to_string(),
            stone_count: s.stone_count,
            diamond_count: s.diamond_count,
        })?;
        skus.push(row);
    }
    summary.skus = skus.len();

    let stone_lots = [
        receive(store, LotKind::Stone, "Burmese ruby, oval 6x4", "Mogok Gems", 40, 34.0)?,
        receive(store, LotKind::Stone, "Ceylon sapphire, round 5mm", "Ratnapura Trading", 40, 28.0)?,
    ];
    let diamond_lots = [
        receive(store, LotKind::Diamond, "Melee, VS G-H, 1.3mm", "Antwerp Trading", 1500, 15.0)?,
        receive(store, LotKind::Diamond, "Melee, SI F-G, 1.5mm", "Surat Polished", 1000, 14.0)?,
    ];
    summary.lots = stone_lots.len() + diamond_lots.len();

    let mut manufacturers = Vec::with_capacity(MANUFACTURERS.len());
    for (name, rating, capacity) in MANUFACTURERS {
        let row = store.add_manufacturer(NewManufacturer {
            name: name.to_string(),
            contact: Some(format!(
                "orders@{}.example",
                name.to_lowercase().replace(' ', "-")
            )),
            rating,
            capacity,
        })?;
        manufacturers.push(row.id);
    }
    summary.manufacturers = manufacturers.len();

    // One single-piece order per customer, cycling through every status.
    for (i, customer) in CUSTOMERS.iter().enumerate() {
        let sku = &skus[i % skus.len()];
        let detail = store.create_order(NewOrder {
            customer_name: customer.to_string(),
            due_date: Some(format!("2026-{:02}-15", 11 + i % 2)),
            notes: None,
            lines: vec![OrderLine {
                sku_id: sku.id.clone(),
                quantity: 1,
            }],
        })?;
        summary.orders += 1;

        let target = JobStatus::ALL[i % JobStatus::ALL.len()];
        let actions = actions_to(
            target,
            &stone_lots[i % stone_lots.len()],
            &diamond_lots[i % diamond_lots.len()],
            &manufacturers[i % manufacturers.len()],
            sku.stone_count,
            sku.diamond_count,
        );
        for job in &detail.jobs {
            for action in &actions {
                store.apply(&job.id, action.clone(), None)?;
            }
            summary.jobs += 1;
        }
    }

    // A multi-line order left untouched.
    let detail = store.create_order(NewOrder {
        customer_name: "Vasquez".to_string(),
        due_date: Some("2027-01-10".to_string()),
        notes: Some("Matching bridal set".to_string()),
        lines: vec![
            OrderLine {
                sku_id: skus[1].id.clone(),
                quantity: 2,
            },
            OrderLine {
                sku_id: skus[3].id.clone(),
                quantity: 1,
            },
        ],
    })?;
    summary.orders += 1;
    summary.jobs += detail.jobs.len();

    log::info!(
        "Seeded {} SKUs, {} lots, {} manufacturers, {} orders, {} jobs",
        summary.skus,
        summary.lots,
        summary.manufacturers,
        summary.orders,
        summary.jobs
    );
    Ok(summary)
}

fn receive(
    store: &ErpStore,
    kind: LotKind,
    description: &str,
    supplier: &str,
    quantity: i64,
    weight_ct: f64,
) -> Result<String> {
    let lot = store.receive_lot(NewLot {
        kind,
        description: description.to_string(),
        supplier: Some(supplier.to_string()),
        quantity,
        weight_ct,
    })?;
    Ok(lot.id)
}

/// Actions that take a `New` job to `target`.
fn actions_to(
    target: JobStatus,
    stone_lot: &str,
    diamond_lot: &str,
    manufacturer_id: &str,
    stones: i64,
    diamonds: i64,
) -> Vec<JobAction> {
    let happy_path = [
        JobAction::CreateBag,
        JobAction::SelectStones {
            lot_id: stone_lot.to_string(),
            quantity: stones,
            weight_ct: 0.75 * stones as f64,
        },
        JobAction::SelectDiamonds {
            lot_id: diamond_lot.to_string(),
            quantity: diamonds,
            weight_ct: 0.01 * diamonds as f64,
        },
        JobAction::SendToManufacturer {
            manufacturer_id: manufacturer_id.to_string(),
        },
        JobAction::StartProduction,
        JobAction::ReceiveFromManufacturer,
    ];

    // Statuses are ordered along the workflow; the QC outcomes come after
    // the whole happy path.
    let mut actions: Vec<JobAction> = happy_path
        .into_iter()
        .take_while(|a| a.target() <= target)
        .collect();

    match target {
        JobStatus::QcPassed => actions.push(JobAction::RecordQc { passed: true }),
        JobStatus::QcFailed => actions.push(JobAction::RecordQc { passed: false }),
        JobStatus::Completed => {
            actions.push(JobAction::RecordQc { passed: true });
            actions.push(JobAction::Complete);
        }
        _ => {}
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::JobQuery;
    use crate::workflow::{phase_for_status, OrderStatus};

    #[test]
    fn test_actions_reach_every_status() {
        for target in JobStatus::ALL {
            let actions = actions_to(target, "l1", "l2", "m1", 1, 8);
            let last = actions.last().map(|a| a.target()).unwrap_or(JobStatus::New);
            assert_eq!(last, target, "path to {}", target);
        }
    }

    #[test]
    fn test_generate() {
        let store = ErpStore::open_in_memory(Config::default()).unwrap();
        let summary = generate(&store).unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                skus: 4,
                lots: 4,
                manufacturers: 3,
                orders: 13,
                jobs: 15,
            }
        );

        let jobs = store
            .list_jobs(&JobQuery {
                limit: Some(100),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(jobs.total, 15);
        for job in &jobs.items {
            assert_eq!(job.current_phase, phase_for_status(job.status));
        }

        let summary = store.workflow_summary().unwrap();
        for status in JobStatus::ALL {
            assert!(
                summary.by_status.iter().any(|(s, n)| *s == status && *n > 0),
                "no job in {}",
                status
            );
        }

        let completed = store.get_order("ORD-0010").unwrap();
        assert_eq!(completed.jobs[0].status, JobStatus::Completed);
        assert_eq!(completed.order.status, OrderStatus::Completed);
    }

    #[test]
    fn test_refuses_to_seed_twice() {
        let store = ErpStore::open_in_memory(Config::default()).unwrap();
        generate(&store).unwrap();
        assert!(matches!(
            generate(&store).unwrap_err(),
            KaratError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_refuses_to_seed_over_existing_records() {
        let store = ErpStore::open_in_memory(Config::default()).unwrap();
        store
            .add_manufacturer(NewManufacturer {
                name: "Existing Atelier".to_string(),
                contact: None,
                rating: 4.0,
                capacity: 2,
            })
            .unwrap();
        assert!(generate(&store).is_err());

        let store = ErpStore::open_in_memory(Config::default()).unwrap();
        receive(&store, LotKind::Diamond, "Melee", "Antwerp Trading", 10, 0.1).unwrap();
        assert!(generate(&store).is_err());
        assert!(store.list_skus().unwrap().is_empty());
    }
}
