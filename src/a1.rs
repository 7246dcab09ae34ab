// src/a1.rs

//! A1-notation helpers: column letters, grid ranges, and parsing of the
//! ranges the Sheets API echoes back.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `'Tab'!A12:Q14`, `Tab!A12`, or a bare `A12:Q14`.
static A1_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:'(?:[^']|'')*'|[^!]+)!)?([A-Z]+)(\d+)(?::([A-Z]+)(\d+))?$")
        .expect("A1 range regex should compile")
});

/// Convert column letters (`A`, `z`, `AA`) to a zero-based index.
/// Returns `None` for empty input or anything that is not ASCII letters.
pub fn column_index(letters: &str) -> Option<usize> {
    let letters = letters.trim();
    if letters.is_empty() {
        return None;
    }
    let mut col: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let v = (ch.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        col = col.checked_mul(26)?.checked_add(v)?;
    }
    Some(col - 1)
}

/// 0 -> A, 25 -> Z, 26 -> AA
pub fn column_letters(mut index: usize) -> String {
    let mut out = Vec::new();
    index += 1;
    while index > 0 {
        let rem = (index - 1) % 26;
        out.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Quote a tab title for use in a range: `My Tab` -> `'My Tab'`.
pub fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// A block of cells, zero-based and end-exclusive. `end_row: None` runs to
/// the bottom of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRange {
    pub start_row: usize,
    pub end_row: Option<usize>,
    pub start_col: usize,
    pub end_col: usize,
}

impl GridRange {
    /// A single cell.
    pub fn cell(row: usize, col: usize) -> Self {
        Self {
            start_row: row,
            end_row: Some(row + 1),
            start_col: col,
            end_col: col + 1,
        }
    }

    /// Columns `start_col..end_col` from `start_row` to the bottom.
    pub fn open_rows(start_row: usize, start_col: usize, end_col: usize) -> Self {
        Self {
            start_row,
            end_row: None,
            start_col,
            end_col,
        }
    }

    /// Number of rows covered, if bounded.
    pub fn rows(&self) -> Option<usize> {
        self.end_row.map(|end| end.saturating_sub(self.start_row))
    }

    /// Same rows, different columns.
    pub fn with_columns(self, start_col: usize, end_col: usize) -> Self {
        Self {
            start_col,
            end_col,
            ..self
        }
    }

    /// `A5:W`, `A12:Q14`, or `T1`.
    pub fn to_a1(&self) -> String {
        let first = format!("{}{}", column_letters(self.start_col), self.start_row + 1);
        let last_col = column_letters(self.end_col.saturating_sub(1).max(self.start_col));
        match self.end_row {
            Some(end) if end <= self.start_row + 1 && self.end_col <= self.start_col + 1 => first,
            Some(end) => format!("{}:{}{}", first, last_col, end.max(self.start_row + 1)),
            None => format!("{}:{}", first, last_col),
        }
    }

    /// `'tab'!<range>`
    pub fn on_tab(&self, tab: &str) -> String {
        format!("{}!{}", quote_tab(tab), self.to_a1())
    }
}

impl fmt::Display for GridRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Parse a bounded A1 range such as `'Destination'!A12:Q14`.
pub fn parse_range(range: &str) -> Option<GridRange> {
    let caps = A1_RANGE_RE.captures(range.trim())?;
    let start_col = column_index(caps.get(1)?.as_str())?;
    let start_row: usize = caps.get(2)?.as_str().parse().ok()?;
    let (end_col, end_row) = match (caps.get(3), caps.get(4)) {
        (Some(c), Some(r)) => (column_index(c.as_str())?, r.as_str().parse().ok()?),
        _ => (start_col, start_row),
    };
    if start_row == 0 || end_row < start_row || end_col < start_col {
        return None;
    }
    Some(GridRange {
        start_row: start_row - 1,
        end_row: Some(end_row),
        start_col,
        end_col: end_col + 1,
    })
}
