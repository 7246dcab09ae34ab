// src/reconcile.rs

//! Rows present in the cycle sheet but missing from the destination.

use crate::process::CellValue;
use std::collections::HashSet;

/// Destination layout of a synthesized row.
pub const IDENTIFIER_POS: usize = 0;
pub const LABEL_POS: usize = 1;
pub const CATEGORY_POS: usize = 7;

/// The three cycle-sheet values a destination row is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRow {
    pub identifier: String,
    pub label: String,
    pub category: String,
}

impl CycleRow {
    /// Pick the three positions out of a raw row, trimmed; short rows read
    /// as `""`.
    pub fn from_raw<S: AsRef<str>>(raw: &[S], id: usize, label: usize, category: usize) -> Self {
        let at = |i: usize| {
            raw.get(i)
                .map(|c| c.as_ref().trim().to_string())
                .unwrap_or_default()
        };
        Self {
            identifier: at(id),
            label: at(label),
            category: at(category),
        }
    }

    /// A destination row of `width` cells (never fewer than 8) with the
    /// values in place.
    pub fn to_destination_row(&self, width: usize) -> Vec<CellValue> {
        let width = width.max(CATEGORY_POS + 1);
        let mut row = vec![CellValue::empty(); width];
        row[IDENTIFIER_POS] = CellValue::text(self.identifier.trim());
        row[LABEL_POS] = CellValue::text(self.label.as_str());
        row[CATEGORY_POS] = CellValue::text(self.category.as_str());
        row
    }
}

/// Trimmed, non-empty identifiers from the first cell of each row.
pub fn membership<S: AsRef<str>>(rows: &[Vec<S>]) -> HashSet<String> {
    rows.iter()
        .filter_map(|r| r.first())
        .map(|c| c.as_ref().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Cycle rows whose identifier is not in `existing`, in input order.
///
/// `existing` is a snapshot: duplicates inside `candidates` all make it
/// through, only identifiers already in the destination are dropped.
pub fn missing_rows<'a>(
    candidates: &'a [CycleRow],
    existing: &HashSet<String>,
) -> Vec<&'a CycleRow> {
    candidates
        .iter()
        .filter(|c| {
            let id = c.identifier.trim();
            !id.is_empty() && !existing.contains(id)
        })
        .collect()
}
