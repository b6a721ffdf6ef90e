//! Command handlers. Each opens the store, runs one operation and prints
//! the result as text or JSON.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use karat::config::{default_config_path, load_config_or_default};
use karat::store::{JobQuery, LotQuery, NewLot, NewManufacturer, NewOrder, NewSku, OrderQuery};
use karat::{
    order_status_for_job_status, phase_for_status, phase_info, Config, ErpStore, JobAction,
    JobStatus,
};

use crate::cli::{
    AdvanceAction, Cli, Commands, JobCommand, LotCommand, ManufacturerCommand, OrderCommand,
    SkuCommand,
};
use crate::output;

pub fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(p) => p,
        None => default_config_path().context("Cannot determine home directory")?,
    };
    let json = cli.json;

    match cli.command {
        Commands::Init { force } => init(&config_path, force),
        Commands::StatusMap => status_map(json),
        Commands::Seed => seed(&open_store(&config_path)?, json),
        Commands::Orders(cmd) => orders(&open_store(&config_path)?, cmd, json),
        Commands::Jobs(cmd) => jobs(&open_store(&config_path)?, cmd, json),
        Commands::Lots(cmd) => lots(&open_store(&config_path)?, cmd, json),
        Commands::Manufacturers(cmd) => manufacturers(&open_store(&config_path)?, cmd, json),
        Commands::Skus(cmd) => skus(&open_store(&config_path)?, cmd, json),
    }
}

fn open_store(config_path: &Path) -> Result<ErpStore> {
    let config = load_config_or_default(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    Ok(ErpStore::open(config)?)
}

fn seed(store: &ErpStore, json: bool) -> Result<()> {
    let summary = karat::seed::generate(store)?;
    if json {
        return output::json(&summary);
    }
    println!(
        "Seeded {} SKUs, {} lots, {} manufacturers, {} orders, {} jobs",
        summary.skus, summary.lots, summary.manufacturers, summary.orders, summary.jobs
    );
    Ok(())
}

fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        log::info!(
            "Config already exists at {}, keeping it",
            config_path.display()
        );
    } else {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&Config::default())?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        log::info!("Wrote default config to {}", config_path.display());
    }

    let config = load_config_or_default(config_path)?;
    let db_path = config
        .database_path
        .clone()
        .map(PathBuf::from)
        .or_else(karat::db::default_database_path);
    ErpStore::open(config)?;
    if let Some(p) = db_path {
        println!("Database ready at {}", p.display());
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusMapRow {
    status: JobStatus,
    phase: karat::JobPhase,
    phase_label: &'static str,
    order_status: karat::OrderStatus,
    route_segment: &'static str,
}

fn status_map(json: bool) -> Result<()> {
    let rows: Vec<StatusMapRow> = JobStatus::ALL
        .iter()
        .map(|&status| {
            let phase = phase_for_status(status);
            StatusMapRow {
                status,
                phase,
                phase_label: phase_info(phase).label,
                order_status: order_status_for_job_status(status),
                route_segment: phase.route_segment(),
            }
        })
        .collect();

    if json {
        return output::json(&rows);
    }
    println!(
        "{:<28} {:<18} {:<10} {}",
        "STATUS", "PHASE", "ORDER", "ROUTE"
    );
    for r in &rows {
        println!(
            "{:<28} {:<18} {:<10} {}",
            r.status, r.phase_label, r.order_status, r.route_segment
        );
    }
    Ok(())
}

fn orders(store: &ErpStore, cmd: OrderCommand, json: bool) -> Result<()> {
    match cmd {
        OrderCommand::List {
            status,
            customer,
            page,
        } => {
            let result = store.list_orders(&OrderQuery {
                status,
                customer_name: customer,
                limit: page.limit,
                offset: page.offset,
            })?;
            if json {
                return output::json(&result);
            }
            output::orders(&result);
        }
        OrderCommand::Create {
            customer,
            lines,
            due,
            notes,
        } => {
            let detail = store.create_order(NewOrder {
                customer_name: customer,
                due_date: due,
                notes,
                lines,
            })?;
            if json {
                return output::json(&detail);
            }
            output::order_detail(&detail);
        }
        OrderCommand::Show { id } => {
            let detail = store.get_order(&id)?;
            if json {
                return output::json(&detail);
            }
            output::order_detail(&detail);
        }
    }
    Ok(())
}

fn jobs(store: &ErpStore, cmd: JobCommand, json: bool) -> Result<()> {
    match cmd {
        JobCommand::List {
            status,
            phase,
            order,
            manufacturer,
            open,
            page,
        } => {
            // Accept display IDs for the order filter.
            let order_id = match order {
                Some(o) => Some(store.get_order(&o)?.order.id),
                None => None,
            };
            let result = store.list_jobs(&JobQuery {
                status,
                phase,
                order_id,
                manufacturer_id: manufacturer,
                open_only: open,
                limit: page.limit,
                offset: page.offset,
            })?;
            if json {
                return output::json(&result);
            }
            output::jobs(&result);
        }
        JobCommand::Show { id } => {
            let detail = store.job_detail(&id)?;
            if json {
                return output::json(&detail);
            }
            output::job_detail(&detail);
        }
        JobCommand::Advance { id, action } => {
            let (action, note) = to_job_action(action)?;
            let job = store.apply(&id, action, note)?;
            if json {
                return output::json(&job);
            }
            output::job(&job);
        }
        JobCommand::Summary => {
            let summary = store.workflow_summary()?;
            if json {
                return output::json(&summary);
            }
            output::summary(&summary);
        }
    }
    Ok(())
}

fn to_job_action(action: AdvanceAction) -> Result<(JobAction, Option<String>)> {
    let converted = match action {
        AdvanceAction::Bag => JobAction::CreateBag,
        AdvanceAction::Stones(a) => JobAction::SelectStones {
            lot_id: a.lot,
            quantity: a.quantity,
            weight_ct: a.weight,
        },
        AdvanceAction::Diamonds(a) => JobAction::SelectDiamonds {
            lot_id: a.lot,
            quantity: a.quantity,
            weight_ct: a.weight,
        },
        AdvanceAction::Send { manufacturer } => JobAction::SendToManufacturer {
            manufacturer_id: manufacturer,
        },
        AdvanceAction::Start => JobAction::StartProduction,
        AdvanceAction::Receive => JobAction::ReceiveFromManufacturer,
        AdvanceAction::Qc { pass, fail, note } => {
            if pass == fail {
                bail!("Pass exactly one of --pass or --fail");
            }
            return Ok((JobAction::RecordQc { passed: pass }, note));
        }
        AdvanceAction::Complete => JobAction::Complete,
    };
    Ok((converted, None))
}

fn lots(store: &ErpStore, cmd: LotCommand, json: bool) -> Result<()> {
    match cmd {
        LotCommand::List {
            kind,
            available,
            page,
        } => {
            let result = store.list_lots(&LotQuery {
                kind,
                available_only: available,
                limit: page.limit,
                offset: page.offset,
            })?;
            if json {
                return output::json(&result);
            }
            output::lots(&result);
        }
        LotCommand::Receive {
            kind,
            quantity,
            weight,
            description,
            supplier,
        } => {
            let lot = store.receive_lot(NewLot {
                kind,
                description,
                supplier,
                quantity,
                weight_ct: weight,
            })?;
            if json {
                return output::json(&lot);
            }
            println!(
                "Received {} lot {}: {} pcs, {:.3} ct",
                lot.kind, lot.display_id, lot.total_quantity, lot.total_weight_ct
            );
        }
    }
    Ok(())
}

fn manufacturers(store: &ErpStore, cmd: ManufacturerCommand, json: bool) -> Result<()> {
    match cmd {
        ManufacturerCommand::List => {
            let rows = store.list_manufacturers()?;
            if json {
                return output::json(&rows);
            }
            output::manufacturers(&rows);
        }
        ManufacturerCommand::Add {
            name,
            contact,
            rating,
            capacity,
        } => {
            let row = store.add_manufacturer(NewManufacturer {
                name,
                contact,
                rating,
                capacity,
            })?;
            if json {
                return output::json(&row);
            }
            println!("Added manufacturer {} ({})", row.name, row.id);
        }
    }
    Ok(())
}

fn skus(store: &ErpStore, cmd: SkuCommand, json: bool) -> Result<()> {
    match cmd {
        SkuCommand::List => {
            let rows = store.list_skus()?;
            if json {
                return output::json(&rows);
            }
            output::skus(&rows);
        }
        SkuCommand::Add {
            code,
            name,
            category,
            metal,
            stones,
            diamonds,
            image,
        } => {
            let new = NewSku {
                code,
                name,
                category,
                metal,
                stone_count: stones,
                diamond_count: diamonds,
            };
            let row = match image {
                Some(path) => {
                    let (row, compressed) = store.create_sku_with_image(new, &path)?;
                    log::info!(
                        "Image compressed to {:.0}% of {}",
                        compressed.ratio() * 100.0,
                        path.display()
                    );
                    row
                }
                None => store.create_sku(new)?,
            };
            if json {
                return output::json(&row);
            }
            println!("Added SKU {} ({})", row.code, row.name);
        }
    }
    Ok(())
}
