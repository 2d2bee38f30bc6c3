//! Core domain types for the nivesh market-activity tracker.
//!
//! This crate provides the canonical record types shared by the ingestion
//! and storage layers:
//! - `FlowRecord`: daily FII/DII net flow, keyed by (date, segment)
//! - `InsiderTrade`, `BulkBlockDeal`: append-only disclosure records
//! - `Signal`: derived analysis output
//!
//! plus the best-effort parsers every upstream feed needs (`dates`,
//! `numeric`). Both parsers return `Option` rather than an error: a parse
//! miss is expected feed noise, handled row by row at the call site.

pub mod dates;
pub mod error;
pub mod numeric;
pub mod types;

pub use dates::parse_date;
pub use error::{CoreError, Result};
pub use numeric::{looks_numeric, parse_decimal};
pub use types::{BulkBlockDeal, DealType, FlowRecord, InsiderTrade, Signal, TradeType};
