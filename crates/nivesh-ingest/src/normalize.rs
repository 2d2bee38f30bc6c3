//! Alias-based normalization of JSON flow payloads.
//!
//! The upstream API keeps the same semantic fields but changes their key
//! spellings between deployments. Each canonical field carries an ordered
//! alias list; the first alias present in a record wins. A record without
//! a parseable date is dropped silently — expected feed noise, not an error.

use nivesh_core::{parse_date, parse_decimal, FlowRecord};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::debug;

/// Known spellings for the trading-day field.
const DATE_ALIASES: &[&str] = &["date", "Date", "TradeDate", "TRADE_DATE", "trade_date"];

/// Known spellings for the market-segment field.
const SEGMENT_ALIASES: &[&str] = &["category", "Category", "Segment", "segment"];

const FII_NET_ALIASES: &[&str] = &["FII Net Value", "fii_net", "FII_NET", "fii_net_buy_value"];
const DII_NET_ALIASES: &[&str] = &["DII Net Value", "dii_net", "DII_NET", "dii_net_buy_value"];

const FII_BUY_ALIASES: &[&str] = &["fii_buy", "FII Buy Value", "FII_BUY"];
const FII_SELL_ALIASES: &[&str] = &["fii_sell", "FII Sell Value", "FII_SELL"];
const DII_BUY_ALIASES: &[&str] = &["dii_buy", "DII Buy Value", "DII_BUY"];
const DII_SELL_ALIASES: &[&str] = &["dii_sell", "DII Sell Value", "DII_SELL"];

fn first_alias<'a>(record: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|k| record.get(*k))
        .filter(|v| !v.is_null())
}

/// Parse a JSON scalar (string or number) into a `Decimal`, tolerating
/// comma separators. `None` on miss.
pub fn scalar_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Net value for one side: explicit net key first, else buy − sell when
/// both sides are present and parseable.
fn net_value(
    record: &Map<String, Value>,
    net_aliases: &[&str],
    buy_aliases: &[&str],
    sell_aliases: &[&str],
) -> Option<Decimal> {
    if let Some(v) = first_alias(record, net_aliases) {
        return scalar_to_decimal(v);
    }
    let buy = first_alias(record, buy_aliases).and_then(scalar_to_decimal)?;
    let sell = first_alias(record, sell_aliases).and_then(scalar_to_decimal)?;
    Some(buy - sell)
}

/// Normalize one raw record into a `FlowRecord`.
///
/// Returns `None` when no recognizable date key is present or the date
/// fails to parse; the caller drops the row.
pub fn normalize_flow_record(record: &Map<String, Value>, source: &str) -> Option<FlowRecord> {
    let date_raw = first_alias(record, DATE_ALIASES).and_then(Value::as_str)?;
    let Some(date) = parse_date(date_raw) else {
        debug!(date = date_raw, "Dropping record with unparseable date");
        return None;
    };

    let segment = first_alias(record, SEGMENT_ALIASES)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Cash")
        .to_string();

    Some(FlowRecord {
        date,
        segment,
        fii_net_value_cr: net_value(record, FII_NET_ALIASES, FII_BUY_ALIASES, FII_SELL_ALIASES),
        dii_net_value_cr: net_value(record, DII_NET_ALIASES, DII_BUY_ALIASES, DII_SELL_ALIASES),
        source: source.to_string(),
    })
}

/// Unwrap the record array from a payload.
///
/// The upstream wraps it as `{"data": [...]}`, occasionally with one extra
/// `"data"` level, or serves a bare array.
fn payload_records(payload: &Value) -> Option<&Vec<Value>> {
    let mut current = payload;
    for _ in 0..2 {
        if let Some(inner) = current.get("data") {
            current = inner;
        }
    }
    current.as_array()
}

/// Normalize a whole payload. Records that are not objects or lack a
/// parseable date are dropped; an unrecognizable payload shape yields an
/// empty batch (the fetch layer treats that as a failed candidate).
pub fn normalize_flow_payload(payload: &Value, source: &str) -> Vec<FlowRecord> {
    let Some(records) = payload_records(payload) else {
        debug!("Payload has no record array");
        return Vec::new();
    };
    records
        .iter()
        .filter_map(|v| v.as_object())
        .filter_map(|r| normalize_flow_record(r, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn first_present_alias_wins() {
        let r = obj(json!({
            "date": "20-Aug-2025",
            "fii_net": "10.0",
            "fii_net_buy_value": "99.0"
        }));
        let rec = normalize_flow_record(&r, "t").unwrap();
        assert_eq!(rec.fii_net_value_cr, Some(dec!(10.0)));
    }

    #[test]
    fn net_only_record_normalizes() {
        let r = obj(json!({"date": "20-Aug-2025", "fii_net_buy_value": "123.4"}));
        let rec = normalize_flow_record(&r, "t").unwrap();
        assert_eq!(rec.date.to_string(), "2025-08-20");
        assert_eq!(rec.segment, "Cash");
        assert_eq!(rec.fii_net_value_cr, Some(dec!(123.4)));
        assert_eq!(rec.dii_net_value_cr, None);
    }

    #[test]
    fn net_derived_from_buy_and_sell() {
        let r = obj(json!({
            "TradeDate": "2025-08-20",
            "fii_buy": 100.5,
            "fii_sell": "40.5",
            "dii_buy": "1,000",
            "dii_sell": 250
        }));
        let rec = normalize_flow_record(&r, "t").unwrap();
        assert_eq!(rec.fii_net_value_cr, Some(dec!(60.0)));
        assert_eq!(rec.dii_net_value_cr, Some(dec!(750)));
    }

    #[test]
    fn missing_date_drops_row() {
        let r = obj(json!({"fii_net": "10"}));
        assert!(normalize_flow_record(&r, "t").is_none());
        let r = obj(json!({"date": "not a date", "fii_net": "10"}));
        assert!(normalize_flow_record(&r, "t").is_none());
    }

    #[test]
    fn segment_defaults_to_cash_and_keeps_explicit_values() {
        let r = obj(json!({"date": "2025-08-20", "category": "Debt"}));
        assert_eq!(normalize_flow_record(&r, "t").unwrap().segment, "Debt");
        let r = obj(json!({"date": "2025-08-20", "category": "  "}));
        assert_eq!(normalize_flow_record(&r, "t").unwrap().segment, "Cash");
    }

    #[test]
    fn unparseable_values_become_missing_not_errors() {
        let r = obj(json!({"date": "2025-08-20", "fii_net": "n/a"}));
        let rec = normalize_flow_record(&r, "t").unwrap();
        assert_eq!(rec.fii_net_value_cr, None);
    }

    #[test]
    fn payload_unwraps_nested_data() {
        let payload = json!({"data": {"data": [
            {"date": "20-Aug-2025", "fii_net": "1"},
            {"no_date_here": true},
            {"date": "21-Aug-2025", "fii_net": "2"}
        ]}});
        let rows = normalize_flow_payload(&payload, "t");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn bare_array_payload_works() {
        let payload = json!([{"date": "20-Aug-2025", "dii_net": -5}]);
        let rows = normalize_flow_payload(&payload, "t");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dii_net_value_cr, Some(dec!(-5)));
    }

    #[test]
    fn non_array_payload_is_empty() {
        assert!(normalize_flow_payload(&json!({"message": "rate limited"}), "t").is_empty());
    }
}
