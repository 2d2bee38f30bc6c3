//! Best-effort multi-format date parsing.
//!
//! Upstream feeds disagree on date formats, sometimes within one payload.
//! A miss is expected noise: callers drop the row, they do not fail the run.

use chrono::NaiveDate;

/// Accepted formats, in priority order. First successful parse wins.
const FORMATS: &[&str] = &["%d-%b-%Y", "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parse a raw date string into a calendar date.
///
/// Tolerates surrounding whitespace, non-breaking spaces and stray comma
/// separators. If no strict format matches but the string contains a
/// `DD-Mon-YYYY`-shaped substring (e.g. "as on 20-Aug-2025"), that
/// substring is extracted and parsed. Returns `None` for anything else.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && *c != '\u{a0}')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(date);
        }
    }

    extract_dd_mon_yyyy(cleaned).and_then(|s| NaiveDate::parse_from_str(&s, "%d-%b-%Y").ok())
}

/// Find the first `DD-Mon-YYYY`-shaped substring (1-2 digits, dash, 3 ASCII
/// letters, dash, 4 digits) and return it owned.
fn extract_dd_mon_yyyy(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            if let Some(end) = match_shape(&bytes[i..]) {
                return Some(s[i..i + end].to_string());
            }
        }
        i += 1;
    }
    None
}

/// Match the shape at the start of `b`; return the matched length.
fn match_shape(b: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 || i > 2 {
        return None;
    }
    if b.get(i) != Some(&b'-') {
        return None;
    }
    i += 1;
    let mon_start = i;
    while i < b.len() && b[i].is_ascii_alphabetic() {
        i += 1;
    }
    if i - mon_start != 3 {
        return None;
    }
    if b.get(i) != Some(&b'-') {
        return None;
    }
    i += 1;
    let year_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    if i - year_start != 4 {
        return None;
    }
    Some(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_all_supported_formats() {
        assert_eq!(parse_date("20-Aug-2025"), Some(date(2025, 8, 20)));
        assert_eq!(parse_date("2025-08-20"), Some(date(2025, 8, 20)));
        assert_eq!(parse_date("20-08-2025"), Some(date(2025, 8, 20)));
        assert_eq!(parse_date("20/08/2025"), Some(date(2025, 8, 20)));
    }

    #[test]
    fn tolerates_whitespace_and_nbsp() {
        assert_eq!(parse_date("  20-Aug-2025  "), Some(date(2025, 8, 20)));
        assert_eq!(parse_date("\u{a0}2025-08-20\u{a0}"), Some(date(2025, 8, 20)));
    }

    #[test]
    fn extracts_embedded_dd_mon_yyyy() {
        assert_eq!(parse_date("as on 5-Sep-2025 *"), Some(date(2025, 9, 5)));
        assert_eq!(parse_date("FII/DII 20-Aug-2025"), Some(date(2025, 8, 20)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("N/A"), None);
        assert_eq!(parse_date("2025/08/20"), None);
        assert_eq!(parse_date("32-Aug-2025"), None);
        assert_eq!(parse_date("20-August-2025"), None);
    }

    #[test]
    fn day_month_order_is_indian() {
        // 03-04-2025 is 3 April, not 4 March.
        assert_eq!(parse_date("03-04-2025"), Some(date(2025, 4, 3)));
    }
}
