use super::{date_parser, CellValue};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Leading signed number once separators are normalised.
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([-+]?\d+(?:\.\d+)?)").expect("number regex should compile"));

/// Outcome of coercing a single column across all rows.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnCoercion {
    /// No column configured, or it was not in the selection.
    NotConfigured,
    /// `converted` cells changed type, `raw` were left as text.
    Applied { converted: usize, raw: usize },
    /// The whole column was left as text.
    Abandoned { reason: String },
}

/// `"1.234,56 kg"` -> `1234.56`. Dots are thousands separators, the comma is
/// the decimal point, and anything after the leading number is ignored.
pub fn parse_localised_number(raw: &str) -> Option<f64> {
    let normalised = raw.trim().replace('.', "").replace(',', ".");
    let caps = LEADING_NUMBER.captures(&normalised)?;
    caps.get(1)?.as_str().parse::<f64>().ok()
}

/// Rewrite day-first dates in column `idx` to ISO; unparseable cells keep
/// their text.
pub fn coerce_date_column(rows: &mut [Vec<CellValue>], idx: usize) -> ColumnCoercion {
    let mut converted = 0;
    let mut raw = 0;
    for row in rows.iter_mut() {
        let Some(CellValue::Text(s)) = row.get_mut(idx) else {
            continue;
        };
        if s.trim().is_empty() {
            continue;
        }
        match date_parser::parse_day_first(s) {
            Some(parsed) => {
                *s = parsed.to_iso();
                converted += 1;
            }
            None => {
                debug!(value = %s, "date left as text");
                raw += 1;
            }
        }
    }
    if raw > 0 {
        warn!(column = idx, raw, "some dates could not be parsed, kept original text");
    }
    ColumnCoercion::Applied { converted, raw }
}

/// Convert column `idx` to numbers, all or nothing: the first non-empty cell
/// that does not parse leaves the whole column untouched.
pub fn coerce_numeric_column(rows: &mut [Vec<CellValue>], idx: usize) -> ColumnCoercion {
    let mut parsed: Vec<Option<f64>> = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let text = match row.get(idx) {
            Some(CellValue::Text(s)) => s.as_str(),
            _ => "",
        };
        if text.trim().is_empty() {
            parsed.push(None);
            continue;
        }
        match parse_localised_number(text) {
            Some(v) => parsed.push(Some(v)),
            None => {
                let reason = format!("row {}: cannot read {:?} as a number", row_no + 1, text);
                warn!(column = idx, %reason, "numeric coercion abandoned for column");
                return ColumnCoercion::Abandoned { reason };
            }
        }
    }

    let mut converted = 0;
    for (row, value) in rows.iter_mut().zip(parsed) {
        if let (Some(cell), Some(v)) = (row.get_mut(idx), value) {
            *cell = CellValue::Number(v);
            converted += 1;
        }
    }
    ColumnCoercion::Applied { converted, raw: 0 }
}
