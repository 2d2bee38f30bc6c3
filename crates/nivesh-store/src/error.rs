//! Store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Schema mismatch: {0}")]
    Schema(String),

    #[error("Value conversion error: {0}")]
    Value(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
