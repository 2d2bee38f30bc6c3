//! Dataset file store.
//!
//! Each run rewrites a dataset file wholesale. Writes land in a `.tmp`
//! sibling first and are published by rename, so the previous file survives
//! any write failure intact.

use crate::dataset::Dataset;
use crate::error::{StoreError, StoreResult};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File-per-dataset Parquet store rooted at one data directory.
///
/// The data directory is an explicit value set once at construction; there
/// is no process-wide path.
pub struct DatasetStore {
    data_dir: PathBuf,
}

impl DatasetStore {
    /// Open a store, creating the data directory if needed.
    pub fn new(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// Path of the dataset file for `T`.
    pub fn path_for<T: Dataset>(&self) -> PathBuf {
        self.data_dir.join(T::FILE_NAME)
    }

    /// Load the full dataset.
    ///
    /// `Ok(None)` means the file does not exist (a fresh checkout, not an
    /// error). `Err` means the file exists but could not be read as the
    /// declared schema; the caller decides whether that is fatal.
    pub fn load<T: Dataset>(&self) -> StoreResult<Option<Vec<T>>> {
        let path = self.path_for::<T>();
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let mut rows = Vec::new();
        for batch in reader {
            rows.extend(T::from_batch(&batch?)?);
        }
        debug!(path = %path.display(), rows = rows.len(), "Loaded dataset");
        Ok(Some(rows))
    }

    /// Load, treating both an absent and an unreadable file as an empty
    /// dataset. Unreadable files are logged; the next successful write
    /// replaces them.
    pub fn load_or_empty<T: Dataset>(&self) -> Vec<T> {
        match self.load::<T>() {
            Ok(Some(rows)) => rows,
            Ok(None) => {
                debug!(file = T::FILE_NAME, "Dataset absent, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(file = T::FILE_NAME, error = %e, "Dataset unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Write the full dataset, replacing any previous file.
    ///
    /// Publishes via temp file + rename. On any failure the previous file
    /// is left untouched and the temp file is removed.
    pub fn write<T: Dataset>(&self, rows: &[T]) -> StoreResult<()> {
        let path = self.path_for::<T>();
        let tmp = path.with_extension("parquet.tmp");

        if let Err(e) = write_parquet(&tmp, T::to_batch(rows)?) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(StoreError::Io(e));
        }

        info!(path = %path.display(), rows = rows.len(), "Wrote dataset");
        Ok(())
    }

    /// Create the empty-schema dataset file for `T` if it does not exist.
    ///
    /// Returns true if a file was created. Existing files, readable or not,
    /// are never replaced by seeding.
    pub fn seed<T: Dataset>(&self) -> StoreResult<bool> {
        let path = self.path_for::<T>();
        if path.exists() {
            debug!(path = %path.display(), "Dataset already seeded");
            return Ok(false);
        }
        self.write::<T>(&[])?;
        Ok(true)
    }
}

fn write_parquet(path: &Path, batch: RecordBatch) -> StoreResult<()> {
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nivesh_core::{FlowRecord, Signal};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn flow(day: u32, fii: i64) -> FlowRecord {
        FlowRecord {
            date: NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
            segment: "Cash".to_string(),
            fii_net_value_cr: Some(rust_decimal::Decimal::from(fii)),
            dii_net_value_cr: Some(dec!(-1.5)),
            source: "test".to_string(),
        }
    }

    #[test]
    fn write_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();

        let rows = vec![flow(20, 10), flow(21, -3)];
        store.write(&rows).unwrap();

        let loaded = store.load::<FlowRecord>().unwrap().unwrap();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn absent_file_is_none_not_error() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();
        assert!(store.load::<FlowRecord>().unwrap().is_none());
        assert!(store.load_or_empty::<FlowRecord>().is_empty());
    }

    #[test]
    fn corrupt_file_is_error_but_load_or_empty_recovers() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();
        std::fs::write(store.path_for::<FlowRecord>(), b"not parquet").unwrap();

        assert!(store.load::<FlowRecord>().is_err());
        assert!(store.load_or_empty::<FlowRecord>().is_empty());
    }

    #[test]
    fn seed_creates_empty_table_once() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();

        assert!(store.seed::<Signal>().unwrap());
        assert!(!store.seed::<Signal>().unwrap());

        let rows = store.load::<Signal>().unwrap().unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn seed_never_replaces_existing_data() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();
        store.write(&[flow(20, 10)]).unwrap();

        assert!(!store.seed::<FlowRecord>().unwrap());
        assert_eq!(store.load_or_empty::<FlowRecord>().len(), 1);
    }

    #[test]
    fn write_leaves_no_temp_residue() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();
        store.write(&[flow(20, 1)]).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["fii_dii_agg.parquet".to_string()]);
    }

    #[test]
    fn overlapping_runs_keep_one_row_per_key() {
        let dir = TempDir::new().unwrap();
        let store = DatasetStore::new(dir.path()).unwrap();

        // Run 1
        let existing = store.load_or_empty::<FlowRecord>();
        let merged = crate::merge::upsert(existing, vec![flow(20, 1), flow(21, 2)]);
        store.write(&merged).unwrap();

        // Run 2, overlapping date range
        let existing = store.load_or_empty::<FlowRecord>();
        let merged = crate::merge::upsert(existing, vec![flow(21, 5), flow(22, 3)]);
        store.write(&merged).unwrap();

        let rows = store.load_or_empty::<FlowRecord>();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].fii_net_value_cr, Some(rust_decimal::Decimal::from(5)));
    }
}
