//! Error types for nivesh-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid trade type: {0}")]
    InvalidTradeType(String),

    #[error("Invalid deal type: {0}")]
    InvalidDealType(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
