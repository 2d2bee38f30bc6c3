//! Separator-tolerant numeric parsing.
//!
//! Upstream values arrive as numbers or as strings like "1,234.50" or
//! "\u{a0}-95.2". A miss is a sentinel (`None`), propagated as a missing
//! value in the output row, never an error.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a scalar that may carry comma thousands-separators or
/// non-breaking-space artifacts into a `Decimal`. Returns `None` on any
/// failure.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// True if the scalar would parse as a signed decimal, optionally with
/// thousands separators. Used by the table-selector density heuristic.
pub fn looks_numeric(raw: &str) -> bool {
    parse_decimal(raw).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(parse_decimal("1,234.50"), Some(dec!(1234.50)));
        assert_eq!(parse_decimal("12,34,567"), Some(dec!(1234567)));
    }

    #[test]
    fn strips_surrounding_noise() {
        assert_eq!(parse_decimal("  1,000  "), Some(dec!(1000)));
        assert_eq!(parse_decimal("\u{a0}-95.2"), Some(dec!(-95.2)));
    }

    #[test]
    fn signed_values() {
        assert_eq!(parse_decimal("-1,234.5"), Some(dec!(-1234.5)));
        assert_eq!(parse_decimal("+12.0"), Some(dec!(12.0)));
    }

    #[test]
    fn misses_are_none() {
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("--"), None);
        assert_eq!(parse_decimal("12.3.4"), None);
    }

    #[test]
    fn numeric_flag_matches_parser() {
        assert!(looks_numeric("-1,234.50"));
        assert!(!looks_numeric("Total"));
    }
}
