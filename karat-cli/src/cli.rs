use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use karat::{JobPhase, JobStatus, LotKind, OrderLine, OrderStatus};

#[derive(Parser)]
#[command(name = "karat")]
#[command(version, about = "Jewelry manufacturing ERP: orders, jobs, lots and manufacturers")]
pub struct Cli {
    /// Config file (default: ~/.karat/karat.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results and logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config file and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Fill an empty database with demo data
    Seed,
    /// Print the status to phase table
    StatusMap,
    #[command(subcommand)]
    Orders(OrderCommand),
    #[command(subcommand)]
    Jobs(JobCommand),
    #[command(subcommand)]
    Lots(LotCommand),
    #[command(subcommand)]
    Manufacturers(ManufacturerCommand),
    #[command(subcommand)]
    Skus(SkuCommand),
}

#[derive(Args)]
pub struct Page {
    #[arg(long)]
    pub limit: Option<u64>,
    #[arg(long)]
    pub offset: Option<u64>,
}

#[derive(Subcommand)]
pub enum OrderCommand {
    List {
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        customer: Option<String>,
        #[command(flatten)]
        page: Page,
    },
    /// Create an order; one job is opened per piece
    Create {
        #[arg(long)]
        customer: String,
        /// `SKU=QUANTITY`, repeatable
        #[arg(long = "line", required = true, value_parser = parse_line)]
        lines: Vec<OrderLine>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Show {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum JobCommand {
    List {
        /// Label ("QC Failed") or key (qc_failed)
        #[arg(long, value_parser = parse_status)]
        status: Option<JobStatus>,
        #[arg(long)]
        phase: Option<JobPhase>,
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        manufacturer: Option<String>,
        /// Hide completed jobs
        #[arg(long)]
        open: bool,
        #[command(flatten)]
        page: Page,
    },
    Show {
        id: String,
    },
    /// Move a job to its next status
    Advance {
        id: String,
        #[command(subcommand)]
        action: AdvanceAction,
    },
    /// Job counts per phase and status
    Summary,
}

#[derive(Subcommand)]
pub enum AdvanceAction {
    /// New -> Bag Created
    Bag,
    /// Allocate stones from a lot
    Stones(Allocation),
    /// Allocate diamonds from a lot
    Diamonds(Allocation),
    /// Hand the job to a manufacturer
    Send {
        #[arg(long)]
        manufacturer: String,
    },
    Start,
    Receive,
    /// Record the quality-check outcome
    Qc {
        #[arg(long, conflicts_with = "fail")]
        pass: bool,
        #[arg(long)]
        fail: bool,
        #[arg(long)]
        note: Option<String>,
    },
    Complete,
}

#[derive(Args)]
pub struct Allocation {
    #[arg(long)]
    pub lot: String,
    #[arg(long)]
    pub quantity: i64,
    /// Carats
    #[arg(long)]
    pub weight: f64,
}

#[derive(Subcommand)]
pub enum LotCommand {
    List {
        #[arg(long)]
        kind: Option<LotKind>,
        /// Only lots with pieces left
        #[arg(long)]
        available: bool,
        #[command(flatten)]
        page: Page,
    },
    Receive {
        #[arg(long)]
        kind: LotKind,
        #[arg(long)]
        quantity: i64,
        /// Carats
        #[arg(long)]
        weight: f64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        supplier: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ManufacturerCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long, default_value_t = 0.0)]
        rating: f64,
        #[arg(long)]
        capacity: i64,
    },
}

#[derive(Subcommand)]
pub enum SkuCommand {
    List,
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        metal: String,
        #[arg(long, default_value_t = 0)]
        stones: i64,
        #[arg(long, default_value_t = 0)]
        diamonds: i64,
        /// Product image, compressed before storing
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

fn parse_line(s: &str) -> Result<OrderLine, String> {
    let (sku, quantity) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SKU=QUANTITY, got '{}'", s))?;
    let quantity = quantity
        .trim()
        .parse()
        .map_err(|e| format!("invalid quantity in '{}': {}", s, e))?;
    Ok(OrderLine {
        sku_id: sku.trim().to_string(),
        quantity,
    })
}

fn parse_status(s: &str) -> Result<JobStatus, String> {
    match JobStatus::from_key(s.trim()) {
        Some(status) => Ok(status),
        None => s.parse().map_err(|e: karat::WorkflowError| e.to_string()),
    }
}
