//! Ingest error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unusable payload: {0}")]
    Payload(String),

    #[error("No suitable table found in page")]
    NoSuitableTable,

    #[error("All sources exhausted; last error: {last}")]
    SourceExhausted { last: String },
}

pub type IngestResult<T> = Result<T, IngestError>;
