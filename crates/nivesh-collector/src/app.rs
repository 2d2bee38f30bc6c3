//! Pipeline entry points.
//!
//! Each pipeline is one batch run: load the existing dataset (absent or
//! unreadable means start empty), compute new rows, merge, write the whole
//! file. A fetch failure aborts the run before any write, so the
//! last-known-good file always survives a bad day upstream.

use crate::config::AppConfig;
use crate::error::AppResult;
use nivesh_core::{BulkBlockDeal, FlowRecord, InsiderTrade, Signal};
use nivesh_ingest::FlowFetcher;
use nivesh_store::{union_dedup, upsert, Dataset, DatasetStore};
use tracing::{info, warn};

/// Create any missing dataset files with their empty schemas. Idempotent;
/// never touches an existing file.
pub fn run_seed(config: &AppConfig) -> AppResult<()> {
    let store = DatasetStore::new(&config.data_dir)?;
    seed_one::<InsiderTrade>(&store)?;
    seed_one::<BulkBlockDeal>(&store)?;
    seed_one::<FlowRecord>(&store)?;
    seed_one::<Signal>(&store)?;
    Ok(())
}

fn seed_one<T: Dataset>(store: &DatasetStore) -> AppResult<()> {
    if store.seed::<T>()? {
        info!(file = T::FILE_NAME, "Seeded empty dataset");
    } else {
        info!(file = T::FILE_NAME, "Dataset already present");
    }
    Ok(())
}

/// Collect the daily FII/DII aggregate and upsert it into the dataset.
///
/// Returns the merged row count.
pub async fn run_fii_dii(config: &AppConfig) -> AppResult<usize> {
    let store = DatasetStore::new(&config.data_dir)?;
    let existing = store.load_or_empty::<FlowRecord>();

    let fetcher = FlowFetcher::new(config.fii_dii.clone())?;
    let fetched = fetcher.fetch_daily_flows().await?;

    // Multiple segments can appear in one payload; this dataset tracks Cash.
    let cash: Vec<FlowRecord> = fetched
        .into_iter()
        .filter(|r| r.segment.to_lowercase().contains("cash"))
        .collect();
    if cash.is_empty() {
        warn!("Fetched payload had no Cash-segment rows");
    }

    let merged = upsert(existing, cash);
    store.write(&merged)?;
    info!(rows = merged.len(), "FII/DII dataset saved");
    Ok(merged.len())
}

/// Merge newly collected insider trades into the dataset.
///
/// Disclosure scraping is not wired up yet; the run still creates the file
/// on first use and preserves every existing row.
pub fn run_insider(config: &AppConfig) -> AppResult<usize> {
    let store = DatasetStore::new(&config.data_dir)?;
    let existing = store.load_or_empty::<InsiderTrade>();
    let incoming: Vec<InsiderTrade> = Vec::new();

    let merged = union_dedup(existing, incoming);
    store.write(&merged)?;
    info!(rows = merged.len(), "Insider trades dataset saved");
    Ok(merged.len())
}

/// Merge newly collected bulk/block deals into the dataset. Same placeholder
/// shape as [`run_insider`].
pub fn run_bulk_block(config: &AppConfig) -> AppResult<usize> {
    let store = DatasetStore::new(&config.data_dir)?;
    let existing = store.load_or_empty::<BulkBlockDeal>();
    let incoming: Vec<BulkBlockDeal> = Vec::new();

    let merged = union_dedup(existing, incoming);
    store.write(&merged)?;
    info!(rows = merged.len(), "Bulk/block dataset saved");
    Ok(merged.len())
}

/// Ensure the derived-signals dataset exists. Signal derivation runs outside
/// this core; rows arrive through the store, never through this pipeline.
pub fn run_signals(config: &AppConfig) -> AppResult<()> {
    let store = DatasetStore::new(&config.data_dir)?;
    seed_one::<Signal>(&store)
}
