//! Plain-text and JSON rendering of command results.

use anyhow::Result;
use serde::Serialize;

use karat::db::manufacturer_repo::ManufacturerRow;
use karat::db::sku_repo::SkuRow;
use karat::store::{JobDetail, ListResponse, OrderDetail, WorkflowSummary};
use karat::workflow::StepState;
use karat::{phase_info, Job, Lot, Order};

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn footer<T>(page: &ListResponse<T>) {
    let shown = page.items.len() as u64;
    if shown < page.total {
        println!(
            "({}-{} of {})",
            page.offset + 1,
            page.offset + shown,
            page.total
        );
    } else {
        println!("({} total)", page.total);
    }
}

pub fn orders(page: &ListResponse<Order>) {
    println!(
        "{:<10} {:<20} {:<10} {:>6}  {}",
        "ORDER", "CUSTOMER", "STATUS", "PIECES", "DUE"
    );
    for o in &page.items {
        println!(
            "{:<10} {:<20} {:<10} {:>6}  {}",
            o.display_id,
            o.customer_name,
            o.status,
            o.piece_count(),
            o.due_date.as_deref().unwrap_or("-")
        );
    }
    footer(page);
}

pub fn order_detail(detail: &OrderDetail) {
    let o = &detail.order;
    println!("{}  {}  [{}]", o.display_id, o.customer_name, o.status);
    if let Some(due) = &o.due_date {
        println!("Due:   {}", due);
    }
    if let Some(notes) = &o.notes {
        println!("Notes: {}", notes);
    }
    println!();
    jobs_table(&detail.jobs);
}

fn jobs_table(jobs: &[Job]) {
    println!(
        "{:<10} {:<28} {:<18} {}",
        "JOB", "STATUS", "PHASE", "ROUTE"
    );
    for j in jobs {
        println!(
            "{:<10} {:<28} {:<18} {}",
            j.display_id,
            j.status,
            phase_info(j.current_phase).label,
            j.route()
        );
    }
}

pub fn jobs(page: &ListResponse<Job>) {
    jobs_table(&page.items);
    footer(page);
}

pub fn job(job: &Job) {
    println!(
        "{} is now {} ({}) -> {}",
        job.display_id,
        job.status,
        phase_info(job.current_phase).label,
        job.route()
    );
}

pub fn job_detail(detail: &JobDetail) {
    let j = &detail.job;
    println!("{}  [{}]", j.display_id, j.status);
    println!("Route: {}", detail.route);
    if let Some(bag) = &j.bag_id {
        println!("Bag:   {}", bag);
    }
    if let Some(m) = &j.manufacturer_id {
        println!("Manufacturer: {}", m);
    }

    let steps: Vec<String> = detail
        .progress
        .iter()
        .map(|s| {
            let mark = match s.state {
                StepState::Done => "x",
                StepState::Current => ">",
                StepState::Upcoming => " ",
            };
            format!("[{}] {}", mark, s.info.label)
        })
        .collect();
    println!("{}", steps.join("  "));

    if !detail.next_statuses.is_empty() {
        let next: Vec<&str> = detail.next_statuses.iter().map(|s| s.as_str()).collect();
        println!("Next:  {}", next.join(" | "));
    }

    if !detail.allocations.is_empty() {
        println!();
        println!("Allocations:");
        for a in &detail.allocations {
            println!("  {:>4} pcs  {:>8.3} ct  lot {}", a.quantity, a.weight_ct, a.lot_id);
        }
    }

    println!();
    println!("History:");
    for h in &detail.history {
        println!(
            "  {}  {} -> {}{}",
            h.changed_at,
            h.from_status.as_deref().unwrap_or("(created)"),
            h.to_status,
            h.note.as_deref().map(|n| format!("  ({})", n)).unwrap_or_default()
        );
    }
}

pub fn summary(summary: &WorkflowSummary) {
    println!("{:<18} {:>6}", "PHASE", "JOBS");
    for (phase, n) in &summary.by_phase {
        println!("{:<18} {:>6}", phase_info(*phase).label, n);
    }
    println!();
    println!("{:<28} {:>6}", "STATUS", "JOBS");
    for (status, n) in &summary.by_status {
        println!("{:<28} {:>6}", status, n);
    }
}

pub fn lots(page: &ListResponse<Lot>) {
    println!(
        "{:<10} {:<8} {:>10} {:>12}  {}",
        "LOT", "KIND", "PCS LEFT", "CT LEFT", "DESCRIPTION"
    );
    for l in &page.items {
        println!(
            "{:<10} {:<8} {:>10} {:>12.3}  {}",
            l.display_id,
            l.kind,
            format!("{}/{}", l.available_quantity, l.total_quantity),
            l.available_weight_ct,
            l.description
        );
    }
    footer(page);
}

pub fn manufacturers(rows: &[ManufacturerRow]) {
    println!(
        "{:<38} {:<22} {:>6} {:>9}",
        "ID", "NAME", "RATING", "LOAD"
    );
    for m in rows {
        println!(
            "{:<38} {:<22} {:>6.1} {:>9}",
            m.id,
            m.name,
            m.rating,
            format!("{}/{}", m.current_load, m.capacity)
        );
    }
}

pub fn skus(rows: &[SkuRow]) {
    println!(
        "{:<16} {:<28} {:<10} {:>6} {:>8}  {}",
        "CODE", "NAME", "CATEGORY", "STONES", "DIAMONDS", "IMAGE"
    );
    for s in rows {
        println!(
            "{:<16} {:<28} {:<10} {:>6} {:>8}  {}",
            s.code,
            s.name,
            s.category,
            s.stone_count,
            s.diamond_count,
            if s.has_image { "yes" } else { "no" }
        );
    }
}
