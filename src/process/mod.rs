// src/process/mod.rs
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

pub mod convert;
pub mod date_parser;
pub mod project;
pub mod utils;

pub use convert::ColumnCoercion;
pub use project::ColumnProjector;

/// A value written to the destination sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Text as written, numbers in their shortest form.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

/// Which output columns get typed.
#[derive(Debug, Clone, Default)]
pub struct Coercions {
    pub date: Option<usize>,
    pub numeric: Option<usize>,
}

impl Coercions {
    /// Resolve configured source letters to output positions.
    pub fn for_columns(
        projector: &ColumnProjector,
        date: Option<&str>,
        numeric: Option<&str>,
    ) -> Self {
        Self {
            date: date.and_then(|l| projector.position_of(l)),
            numeric: numeric.and_then(|l| projector.position_of(l)),
        }
    }
}

/// The filtered, typed rows ready to be written, plus what happened on the way.
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub stats: PrepareStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrepareStats {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub date: ColumnCoercion,
    pub numeric: ColumnCoercion,
    pub errors_blanked: usize,
}

/// Project, filter, coerce and scrub the source rows.
///
/// `source` is everything read from the header row down. `source[0]` names
/// the columns and is also a data candidate, kept when its identifier cell
/// is filled like any other row.
#[tracing::instrument(level = "info", skip_all, fields(rows = source.len()))]
pub fn prepare<S: AsRef<str>>(
    source: &[Vec<S>],
    projector: &ColumnProjector,
    coercions: &Coercions,
) -> Result<PreparedTable> {
    let header = match source.first() {
        Some(h) => projector.headers(h),
        None => projector.headers::<&str>(&[]),
    };
    let data = source;

    // 1) project + drop rows without an identifier
    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(data.len());
    for raw in data {
        let projected = projector.project(raw);
        if projected.first().map_or(true, |id| id.trim().is_empty()) {
            continue;
        }
        rows.push(projected.into_iter().map(CellValue::Text).collect());
    }
    let rows_dropped = data.len() - rows.len();
    debug!(kept = rows.len(), dropped = rows_dropped, "filtered rows");

    // 2) typed columns
    let date = match coercions.date {
        Some(idx) => convert::coerce_date_column(&mut rows, idx),
        None => ColumnCoercion::NotConfigured,
    };
    let numeric = match coercions.numeric {
        Some(idx) => convert::coerce_numeric_column(&mut rows, idx),
        None => ColumnCoercion::NotConfigured,
    };

    // 3) error literals, after coercion
    let errors_blanked = utils::scrub_error_literals(&mut rows);

    info!(
        read = data.len(),
        kept = rows.len(),
        errors_blanked,
        "prepared source rows"
    );

    Ok(PreparedTable {
        headers: header,
        stats: PrepareStats {
            rows_read: data.len(),
            rows_dropped,
            date,
            numeric,
            errors_blanked,
        },
        rows,
    })
}
