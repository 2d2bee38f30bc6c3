//! Heuristic selection of the FII/DII flow table.
//!
//! Pure scoring over `RawTable`s, independent of any fetching concern, so
//! it can be unit-tested with synthetic tables. The page is assumed to hold
//! the daily Cash-segment figures somewhere; we make no assumption about
//! table position, column order, or exact header text.

use crate::html::RawTable;
use nivesh_core::{looks_numeric, parse_date, FlowRecord};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Minimum column count for a candidate table.
const MIN_COLUMNS: usize = 5;

/// How the FII/DII net values are read out of the chosen table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetColumns {
    /// Explicit per-side "net" columns.
    Direct { fii: usize, dii: usize },
    /// Explicit buy/sell pairs per side; net derived by subtraction.
    Derived {
        fii_buy: usize,
        fii_sell: usize,
        dii_buy: usize,
        dii_sell: usize,
    },
    /// Last resort: the first six numeric-flagged non-date columns taken as
    /// [fii_buy, fii_sell, fii_net, dii_buy, dii_sell, dii_net] by position.
    /// A guess, not a guarantee.
    Positional { fii: usize, dii: usize },
}

/// The chosen table and its column mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePick {
    /// Index into the scanned table list.
    pub index: usize,
    /// Column holding the trading day.
    pub date_col: usize,
    pub columns: NetColumns,
}

impl TablePick {
    /// True when the mapping fell back to the positional guess. Downstream
    /// consumers should treat rows extracted under it as low-confidence.
    pub fn is_low_confidence(&self) -> bool {
        matches!(self.columns, NetColumns::Positional { .. })
    }
}

fn date_hits(table: &RawTable, col: usize) -> usize {
    table
        .rows
        .iter()
        .filter(|row| parse_date(&row[col]).is_some())
        .count()
}

/// A column qualifies as the date column when at least `max(3, 30% of
/// rows)` of its cells parse as dates.
fn find_date_column(table: &RawTable) -> Option<usize> {
    let threshold = (table.rows.len() * 3).div_ceil(10).max(3);
    (0..table.width().min(2)).find(|&col| date_hits(table, col) >= threshold)
}

fn numeric_cell_count(table: &RawTable) -> usize {
    table
        .rows
        .iter()
        .flat_map(|row| row.iter())
        .filter(|cell| looks_numeric(cell))
        .count()
}

/// Columns where at least half the cells (and at least one) look numeric.
fn numeric_flagged_columns(table: &RawTable, date_col: usize) -> Vec<usize> {
    let threshold = (table.rows.len() / 2).max(1);
    (0..table.width())
        .filter(|&col| col != date_col)
        .filter(|&col| {
            table
                .rows
                .iter()
                .filter(|row| looks_numeric(&row[col]))
                .count()
                >= threshold
        })
        .collect()
}

fn header_matching(table: &RawTable, date_col: usize, needles: &[&str]) -> Option<usize> {
    table.headers.iter().enumerate().position(|(col, h)| {
        let h = h.to_lowercase();
        col != date_col && needles.iter().all(|n| h.contains(n))
    })
}

/// Map headers to net-value columns: explicit nets first, then buy/sell
/// pairs, then the positional fallback.
fn map_net_columns(table: &RawTable, date_col: usize) -> Option<NetColumns> {
    let fii_net = header_matching(table, date_col, &["fii", "net"]);
    let dii_net = header_matching(table, date_col, &["dii", "net"]);
    if let (Some(fii), Some(dii)) = (fii_net, dii_net) {
        return Some(NetColumns::Direct { fii, dii });
    }

    let fii_buy = header_matching(table, date_col, &["fii", "buy"]);
    let fii_sell = header_matching(table, date_col, &["fii", "sell"]);
    let dii_buy = header_matching(table, date_col, &["dii", "buy"]);
    let dii_sell = header_matching(table, date_col, &["dii", "sell"]);
    if let (Some(fii_buy), Some(fii_sell), Some(dii_buy), Some(dii_sell)) =
        (fii_buy, fii_sell, dii_buy, dii_sell)
    {
        return Some(NetColumns::Derived {
            fii_buy,
            fii_sell,
            dii_buy,
            dii_sell,
        });
    }

    let numeric = numeric_flagged_columns(table, date_col);
    if numeric.len() >= 6 {
        return Some(NetColumns::Positional {
            fii: numeric[2],
            dii: numeric[5],
        });
    }
    None
}

/// Pick the table most likely to hold the daily Cash-segment FII/DII
/// figures. First qualifying candidate in scan order wins; `None` means the
/// caller must abort the run rather than write garbage.
pub fn select_flow_table(tables: &[RawTable]) -> Option<TablePick> {
    for (index, table) in tables.iter().enumerate() {
        if table.width() < MIN_COLUMNS {
            debug!(index, width = table.width(), "Rejecting narrow table");
            continue;
        }
        let Some(date_col) = find_date_column(table) else {
            debug!(index, "Rejecting table without a date column");
            continue;
        };
        // At least 3 numeric-looking cells per row on average, consistent
        // with multiple buy/sell/net columns per side.
        if numeric_cell_count(table) < 3 * table.rows.len() {
            debug!(index, "Rejecting table below numeric density threshold");
            continue;
        }
        let Some(columns) = map_net_columns(table, date_col) else {
            debug!(index, "Rejecting table with unmappable columns");
            continue;
        };

        let pick = TablePick {
            index,
            date_col,
            columns,
        };
        if pick.is_low_confidence() {
            warn!(index, "Flow table columns mapped by position only");
        }
        return Some(pick);
    }
    None
}

fn cell_decimal(row: &[String], col: usize) -> Option<Decimal> {
    nivesh_core::parse_decimal(&row[col])
}

/// Extract flow rows from the chosen table. Rows without a parseable date
/// are dropped; numeric misses propagate as missing values. The segment is
/// always "Cash" — that is the table this selector targets.
pub fn extract_flow_rows(table: &RawTable, pick: &TablePick, source: &str) -> Vec<FlowRecord> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let date = parse_date(&row[pick.date_col])?;
            let (fii, dii) = match pick.columns {
                NetColumns::Direct { fii, dii } => (cell_decimal(row, fii), cell_decimal(row, dii)),
                NetColumns::Derived {
                    fii_buy,
                    fii_sell,
                    dii_buy,
                    dii_sell,
                } => {
                    let fii = match (cell_decimal(row, fii_buy), cell_decimal(row, fii_sell)) {
                        (Some(b), Some(s)) => Some(b - s),
                        _ => None,
                    };
                    let dii = match (cell_decimal(row, dii_buy), cell_decimal(row, dii_sell)) {
                        (Some(b), Some(s)) => Some(b - s),
                        _ => None,
                    };
                    (fii, dii)
                }
                NetColumns::Positional { fii, dii } => {
                    (cell_decimal(row, fii), cell_decimal(row, dii))
                }
            };
            Some(FlowRecord {
                date,
                segment: "Cash".to_string(),
                fii_net_value_cr: fii,
                dii_net_value_cr: dii,
                source: source.to_string(),
            })
        })
        .collect()
}
