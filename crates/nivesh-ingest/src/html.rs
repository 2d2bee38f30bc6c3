//! Minimal HTML table extraction.
//!
//! Tag-block scanning, not a DOM: find each `<table>` block, split it into
//! `<tr>` rows and `<th>`/`<td>` cells, strip tags, decode the handful of
//! entities these pages actually use, and collapse whitespace. Good enough
//! for the data tables we target; not a general HTML parser.

/// One rectangular table: named columns plus rows padded/truncated to the
/// header width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Find the next `<tag ...>...</tag>` block at or after `from`.
/// Returns (block_start, block_end) over the original string.
fn next_tag_block(s: &str, lower: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let start = lower.get(from..)?.find(&open)? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lower[open_end..].find(&close)?;
    Some((start, open_end + end_rel + close.len()))
}

/// Block content between the open tag's `>` and the closing tag.
fn inner(s: &str, block: (usize, usize), tag: &str) -> String {
    let body = &s[block.0..block.1];
    let content_start = body.find('>').map(|i| i + 1).unwrap_or(0);
    let content_end = body.len().saturating_sub(tag.len() + 3); // "</" + tag + ">"
    if content_start < content_end {
        body[content_start..content_end].to_string()
    } else {
        String::new()
    }
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

// `&amp;` must decode last: doing it first turns `&amp;lt;` into `&lt;`
// and then into `<` on the next pass.
fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() || ch == '\u{a0}' {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

fn clean_cell(raw: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(raw)))
}

/// Split a `<tr>` body into cleaned cell texts. `<th>` and `<td>` mix freely.
fn row_cells(row_html: &str) -> (Vec<String>, bool) {
    let lower = to_lower(row_html);
    let mut cells = Vec::new();
    let mut has_th = false;
    let mut pos = 0;
    loop {
        let th = next_tag_block(row_html, &lower, "th", pos);
        let td = next_tag_block(row_html, &lower, "td", pos);
        let (block, tag) = match (th, td) {
            (Some(a), Some(b)) if a.0 < b.0 => (a, "th"),
            (Some(a), None) => (a, "th"),
            (_, Some(b)) => (b, "td"),
            (None, None) => break,
        };
        if tag == "th" {
            has_th = true;
        }
        cells.push(clean_cell(&inner(row_html, block, tag)));
        pos = block.1;
    }
    (cells, has_th)
}

/// Extract every `<table>` on the page as a rectangular `RawTable`.
///
/// The first row containing a `<th>` cell (else the first row) becomes the
/// header; remaining rows are padded or truncated to the header width.
/// Tables with no rows are skipped.
pub fn extract_tables(html: &str) -> Vec<RawTable> {
    let lower = to_lower(html);
    let mut tables = Vec::new();
    let mut pos = 0;

    while let Some(table_block) = next_tag_block(html, &lower, "table", pos) {
        pos = table_block.1;
        let body = inner(html, table_block, "table");
        let body_lower = to_lower(&body);

        let mut raw_rows: Vec<(Vec<String>, bool)> = Vec::new();
        let mut row_pos = 0;
        while let Some(row_block) = next_tag_block(&body, &body_lower, "tr", row_pos) {
            row_pos = row_block.1;
            let (cells, has_th) = row_cells(&inner(&body, row_block, "tr"));
            if !cells.is_empty() {
                raw_rows.push((cells, has_th));
            }
        }
        if raw_rows.is_empty() {
            continue;
        }

        let header_idx = raw_rows.iter().position(|(_, th)| *th).unwrap_or(0);
        let headers = raw_rows[header_idx].0.clone();
        let width = headers.len();

        let rows = raw_rows
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != header_idx)
            .map(|(_, (mut cells, _))| {
                cells.resize(width, String::new());
                cells
            })
            .collect();

        tables.push(RawTable { headers, rows });
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table class="nav"><tr><td>Home</td><td>About</td></tr></table>
        <TABLE id="flows">
          <tr><th>Date</th><th>FII&nbsp;Buy</th><th>FII Sell</th></tr>
          <tr><td>20-Aug-2025</td><td><b>1,234.50</b></td><td>1,000.00</td></tr>
          <tr><td>21-Aug-2025</td><td>900.25</td></tr>
        </TABLE>
        </body></html>
    "#;

    #[test]
    fn extracts_all_tables_in_page_order() {
        let tables = extract_tables(PAGE);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].headers, vec!["Home", "About"]);
    }

    #[test]
    fn header_row_and_cell_cleaning() {
        let tables = extract_tables(PAGE);
        let flows = &tables[1];
        assert_eq!(flows.headers, vec!["Date", "FII Buy", "FII Sell"]);
        assert_eq!(flows.rows[0], vec!["20-Aug-2025", "1,234.50", "1,000.00"]);
    }

    #[test]
    fn short_rows_are_padded_to_width() {
        let tables = extract_tables(PAGE);
        let flows = &tables[1];
        assert_eq!(flows.rows[1], vec!["21-Aug-2025", "900.25", ""]);
    }

    #[test]
    fn headerless_table_uses_first_row() {
        let html = "<table><tr><td>a</td><td>b</td></tr><tr><td>1</td><td>2</td></tr></table>";
        let tables = extract_tables(html);
        assert_eq!(tables[0].headers, vec!["a", "b"]);
        assert_eq!(tables[0].rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn escaped_entities_decode_once_not_twice() {
        let html = "<table><tr><td>A &amp; B</td><td>&amp;lt;tag&amp;gt;</td></tr></table>";
        let tables = extract_tables(html);
        assert_eq!(tables[0].headers, vec!["A & B", "&lt;tag&gt;"]);
    }

    #[test]
    fn empty_page_has_no_tables() {
        assert!(extract_tables("<html><body><p>nothing</p></body></html>").is_empty());
    }
}
