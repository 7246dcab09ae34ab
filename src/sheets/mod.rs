//! Spreadsheet access
//!
//! [`SpreadsheetGateway`] is everything the sync job needs from the
//! spreadsheet service. [`SheetsClient`] implements it over the Sheets v4
//! REST API; ranges passed in are relative to the opened tab.

use crate::a1::GridRange;
use crate::config::{Rgb, SheetRef};
use crate::process::CellValue;

pub mod client;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod types;

pub use client::SheetsClient;
pub use error::{Result, SheetsError};

/// An opened tab: the title plus the numeric id formatting calls need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub spreadsheet_id: String,
    pub title: String,
    pub sheet_id: i64,
}

#[cfg_attr(test, mockall::automock)]
pub trait SpreadsheetGateway {
    /// Resolve a tab by title; fails if the spreadsheet has no such tab.
    fn open(&self, sheet: &SheetRef) -> Result<Worksheet>;

    /// Formatted cell values, row-major. Trailing empty cells and rows are
    /// omitted by the service, so rows may be ragged.
    fn read_rows(&self, ws: &Worksheet, range: GridRange) -> Result<Vec<Vec<String>>>;

    fn clear_range(&self, ws: &Worksheet, range: GridRange) -> Result<()>;

    /// Write `rows` with their top-left cell at `at`.
    fn write_rows(&self, ws: &Worksheet, at: GridRange, rows: &[Vec<CellValue>]) -> Result<()>;

    /// Append below the last non-empty row; returns the range written.
    fn append_rows(&self, ws: &Worksheet, rows: &[Vec<CellValue>]) -> Result<GridRange>;

    fn format_background(&self, ws: &Worksheet, range: GridRange, color: Rgb) -> Result<()>;

    fn write_cell(&self, ws: &Worksheet, cell: GridRange, value: &str) -> Result<()>;
}
