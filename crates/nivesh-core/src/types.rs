//! Canonical record types for the four datasets.
//!
//! Money values are `rust_decimal::Decimal` in crore units; a missing value
//! (upstream parse miss) is `None`, never zero. Dates are calendar dates
//! with no timezone attached — upstream reports are per trading day.

use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Direction of an insider trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "acquisition" => Ok(Self::Buy),
            "sell" | "disposal" => Ok(Self::Sell),
            other => Err(CoreError::InvalidTradeType(other.to_string())),
        }
    }
}

/// Reporting channel for a large single-counterparty deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealType {
    Bulk,
    Block,
}

impl DealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bulk => "bulk",
            Self::Block => "block",
        }
    }
}

impl std::fmt::Display for DealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulk" => Ok(Self::Bulk),
            "block" => Ok(Self::Block),
            other => Err(CoreError::InvalidDealType(other.to_string())),
        }
    }
}

/// One day's institutional net flow for one market segment.
///
/// Natural key: `(date, segment)`. After a merge, at most one row exists
/// per key. `segment` defaults to `"Cash"` when the upstream omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Trading day.
    pub date: NaiveDate,
    /// Market segment (e.g. "Cash").
    pub segment: String,
    /// FII net value in crore. `None` when the upstream value failed to parse.
    pub fii_net_value_cr: Option<Decimal>,
    /// DII net value in crore.
    pub dii_net_value_cr: Option<Decimal>,
    /// Endpoint or page the row came from.
    pub source: String,
}

impl FlowRecord {
    /// Natural key components, in declared sort order.
    pub fn key(&self) -> (NaiveDate, String) {
        (self.date, self.segment.clone())
    }
}

/// A promoter/insider trade disclosure.
///
/// The upstream feed declares no natural key, so these rows are append-only
/// with exact-row dedup: two rows are duplicates only if every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InsiderTrade {
    pub date: NaiveDate,
    pub isin: String,
    pub symbol: String,
    pub person_name: String,
    pub relation: String,
    pub trade_type: TradeType,
    pub qty: i64,
    pub avg_price: Option<Decimal>,
    pub value: Option<Decimal>,
    pub post_holding_pct: Option<Decimal>,
    pub source_url: String,
    /// Unmodified disclosure text, kept for auditability.
    pub raw_text: String,
}

/// A bulk or block deal disclosure. Append-only with exact-row dedup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BulkBlockDeal {
    pub date: NaiveDate,
    pub isin: String,
    pub symbol: String,
    pub deal_type: DealType,
    pub buyer_name: String,
    pub seller_name: String,
    pub qty: i64,
    pub avg_price: Option<Decimal>,
    pub value: Option<Decimal>,
    pub source_url: String,
}

/// A derived analysis signal. Produced outside this core; stored here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    pub signal_date: NaiveDate,
    pub symbol: String,
    /// Categorical label, e.g. "Promoter Buy >= 1cr".
    pub signal_type: String,
    pub score: Decimal,
    /// Opaque structured payload, serialized JSON.
    pub details_json: String,
}
