//! nivesh collector - entry point.
//!
//! One subcommand per pipeline; each run is a single
//! fetch-normalize-merge-store cycle.

use anyhow::Result;
use clap::{Parser, Subcommand};
use nivesh_collector::{app, AppConfig};
use tracing::info;

/// Daily collector for Indian equity-market activity datasets
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via NIVESH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create any missing dataset files with their empty schemas
    Seed,
    /// Collect the daily FII/DII aggregate
    FiiDii,
    /// Merge promoter/insider trade disclosures
    Insider,
    /// Merge bulk/block deal disclosures
    BulkBlock,
    /// Ensure the derived-signals dataset exists
    Signals,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    nivesh_collector::init_logging()?;
    info!("Starting nivesh collector v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.config.or_else(|| std::env::var("NIVESH_CONFIG").ok()) {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            AppConfig::from_file(&path)?
        }
        None => AppConfig::load()?,
    };
    info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    match args.command {
        Command::Seed => app::run_seed(&config)?,
        Command::FiiDii => {
            app::run_fii_dii(&config).await?;
        }
        Command::Insider => {
            app::run_insider(&config)?;
        }
        Command::BulkBlock => {
            app::run_bulk_block(&config)?;
        }
        Command::Signals => app::run_signals(&config)?,
    }

    Ok(())
}
