//! Columnar dataset persistence for nivesh.
//!
//! One Parquet file per logical dataset (insider trades, bulk/block deals,
//! FII/DII aggregate, signals). Files are always whole valid tables of the
//! declared schema: writes go to a temp file and are published by rename,
//! so a failed run never leaves a partial or schema-mismatched file behind.

pub mod dataset;
pub mod error;
pub mod merge;
pub mod store;

pub use dataset::Dataset;
pub use error::{StoreError, StoreResult};
pub use merge::{union_dedup, upsert, NaturalKey};
pub use store::DatasetStore;
