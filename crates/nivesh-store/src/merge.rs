//! Pure merge functions for dataset rows.
//!
//! No I/O, no partial state: `(old_rows, new_rows) -> merged_rows`.
//! Keyed datasets upsert (new wins on key collision, output sorted by key);
//! unkeyed datasets union with exact full-row-equality dedup.

use chrono::NaiveDate;
use nivesh_core::FlowRecord;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// A record type with a natural key that identifies the logical row across
/// repeated fetches.
pub trait NaturalKey {
    type Key: Ord;

    fn natural_key(&self) -> Self::Key;
}

impl NaturalKey for FlowRecord {
    type Key = (NaiveDate, String);

    fn natural_key(&self) -> Self::Key {
        self.key()
    }
}

/// Merge `incoming` into `existing` on the natural key.
///
/// Exactly one row survives per key; when a key appears on both sides the
/// incoming row wins (last write in merge order, not by timestamp). Output
/// is sorted ascending by the key components in declared order.
pub fn upsert<T: NaturalKey>(existing: Vec<T>, incoming: Vec<T>) -> Vec<T> {
    let mut by_key: BTreeMap<T::Key, T> = BTreeMap::new();
    for row in existing.into_iter().chain(incoming) {
        by_key.insert(row.natural_key(), row);
    }
    by_key.into_values().collect()
}

/// Set union with exact-row dedup for datasets without a natural key.
///
/// Two rows are duplicates only if every field matches. First occurrence is
/// kept; input order is otherwise preserved (existing rows first).
pub fn union_dedup<T: Eq + Hash + Clone>(existing: Vec<T>, incoming: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in existing.into_iter().chain(incoming) {
        if seen.insert(row.clone()) {
            out.push(row);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nivesh_core::{InsiderTrade, TradeType};
    use rust_decimal_macros::dec;

    fn flow(date: &str, segment: &str, fii: i64) -> FlowRecord {
        FlowRecord {
            date: date.parse().unwrap(),
            segment: segment.to_string(),
            fii_net_value_cr: Some(rust_decimal::Decimal::from(fii)),
            dii_net_value_cr: None,
            source: "test".to_string(),
        }
    }

    #[test]
    fn new_row_wins_on_key_collision() {
        let existing = vec![flow("2025-01-01", "Cash", 10)];
        let incoming = vec![flow("2025-01-01", "Cash", 20)];
        let merged = upsert(existing, incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].fii_net_value_cr, Some(dec!(20)));
    }

    #[test]
    fn distinct_keys_both_survive_sorted() {
        let existing = vec![flow("2025-01-02", "Cash", 1)];
        let incoming = vec![flow("2025-01-01", "Cash", 2)];
        let merged = upsert(existing, incoming);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].date < merged[1].date);
    }

    #[test]
    fn segment_is_part_of_the_key() {
        let existing = vec![flow("2025-01-01", "Cash", 1)];
        let incoming = vec![flow("2025-01-01", "F&O", 2)];
        assert_eq!(upsert(existing, incoming).len(), 2);
    }

    #[test]
    fn repeated_runs_converge_on_distinct_keys() {
        // Two overlapping fetches: final count equals distinct keys, not sum.
        let run1 = vec![flow("2025-01-01", "Cash", 1), flow("2025-01-02", "Cash", 2)];
        let run2 = vec![flow("2025-01-02", "Cash", 3), flow("2025-01-03", "Cash", 4)];
        let after1 = upsert(Vec::new(), run1);
        let after2 = upsert(after1, run2);
        assert_eq!(after2.len(), 3);
        let jan2 = after2.iter().find(|r| r.date.to_string() == "2025-01-02").unwrap();
        assert_eq!(jan2.fii_net_value_cr, Some(dec!(3)));
    }

    fn trade(symbol: &str, qty: i64) -> InsiderTrade {
        InsiderTrade {
            date: "2025-08-20".parse().unwrap(),
            isin: "INE000000001".to_string(),
            symbol: symbol.to_string(),
            person_name: "P".to_string(),
            relation: "Promoter".to_string(),
            trade_type: TradeType::Buy,
            qty,
            avg_price: Some(dec!(10)),
            value: None,
            post_holding_pct: None,
            source_url: "u".to_string(),
            raw_text: "r".to_string(),
        }
    }

    #[test]
    fn identical_rows_dedup_to_one() {
        let r = trade("TCS", 100);
        let merged = union_dedup(vec![r.clone()], vec![r]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn one_differing_field_keeps_both() {
        let merged = union_dedup(vec![trade("TCS", 100)], vec![trade("TCS", 101)]);
        assert_eq!(merged.len(), 2);
    }
}
