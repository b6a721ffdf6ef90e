mod cli;
mod commands;
mod output;
mod telemetry;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(cli.json, cli.verbose)?;

    log::debug!("Starting karat v{}", env!("CARGO_PKG_VERSION"));

    commands::run(cli)
}
