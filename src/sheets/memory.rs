//! In-memory spreadsheet used by the job tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use super::error::{Result, SheetsError};
use super::{SpreadsheetGateway, Worksheet};
use crate::a1::GridRange;
use crate::config::{Rgb, SheetRef};
use crate::process::CellValue;

#[derive(Default)]
struct Tab {
    sheet_id: i64,
    cells: Vec<Vec<String>>,
}

impl Tab {
    fn set(&mut self, row: usize, col: usize, value: String) {
        if self.cells.len() <= row {
            self.cells.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.cells[row];
        if r.len() <= col {
            r.resize(col + 1, String::new());
        }
        r[col] = value;
    }

    /// Rows after the last one holding any non-empty cell.
    fn used_rows(&self) -> usize {
        self.cells
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_empty()))
            .map_or(0, |i| i + 1)
    }
}

/// Tabs keyed by `(spreadsheet_id, title)`, plus a log of formatting calls.
#[derive(Default)]
pub struct MemoryWorkbook {
    tabs: RefCell<BTreeMap<(String, String), Tab>>,
    failing: RefCell<HashSet<&'static str>>,
    pub formats: RefCell<Vec<(String, GridRange, Rgb)>>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tab(&self, sheet: &SheetRef, rows: Vec<Vec<&str>>) {
        let mut tabs = self.tabs.borrow_mut();
        let sheet_id = tabs.len() as i64 + 100;
        tabs.insert(
            (sheet.spreadsheet_id.clone(), sheet.tab.clone()),
            Tab {
                sheet_id,
                cells: rows
                    .into_iter()
                    .map(|r| r.into_iter().map(String::from).collect())
                    .collect(),
            },
        );
    }

    /// Make every later call to `op` fail with a 500.
    pub fn fail(&self, op: &'static str) {
        self.failing.borrow_mut().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.borrow_mut().remove(op);
    }

    /// Tab contents with trailing blank rows removed.
    pub fn rows(&self, sheet: &SheetRef) -> Vec<Vec<String>> {
        let tabs = self.tabs.borrow();
        let tab = &tabs[&(sheet.spreadsheet_id.clone(), sheet.tab.clone())];
        tab.cells[..tab.used_rows()].to_vec()
    }

    pub fn cell(&self, sheet: &SheetRef, a1: &str) -> String {
        let Some(at) = crate::a1::parse_range(a1) else {
            return String::new();
        };
        let tabs = self.tabs.borrow();
        tabs.get(&(sheet.spreadsheet_id.clone(), sheet.tab.clone()))
            .and_then(|t| t.cells.get(at.start_row))
            .and_then(|r| r.get(at.start_col))
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.borrow().contains(op) {
            return Err(SheetsError::Api {
                status: 500,
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }

    fn with_tab<T>(&self, ws: &Worksheet, f: impl FnOnce(&mut Tab) -> T) -> Result<T> {
        let mut tabs = self.tabs.borrow_mut();
        let tab = tabs
            .get_mut(&(ws.spreadsheet_id.clone(), ws.title.clone()))
            .ok_or_else(|| SheetsError::TabNotFound {
                spreadsheet_id: ws.spreadsheet_id.clone(),
                tab: ws.title.clone(),
            })?;
        Ok(f(tab))
    }
}

impl SpreadsheetGateway for MemoryWorkbook {
    fn open(&self, sheet: &SheetRef) -> Result<Worksheet> {
        self.check("open")?;
        let tabs = self.tabs.borrow();
        let tab = tabs
            .get(&(sheet.spreadsheet_id.clone(), sheet.tab.clone()))
            .ok_or_else(|| SheetsError::TabNotFound {
                spreadsheet_id: sheet.spreadsheet_id.clone(),
                tab: sheet.tab.clone(),
            })?;
        Ok(Worksheet {
            spreadsheet_id: sheet.spreadsheet_id.clone(),
            title: sheet.tab.clone(),
            sheet_id: tab.sheet_id,
        })
    }

    fn read_rows(&self, ws: &Worksheet, range: GridRange) -> Result<Vec<Vec<String>>> {
        self.check("read_rows")?;
        self.with_tab(ws, |tab| {
            let end = range.end_row.unwrap_or(usize::MAX).min(tab.used_rows());
            let mut out: Vec<Vec<String>> = (range.start_row..end.max(range.start_row))
                .map(|r| {
                    let row = &tab.cells[r];
                    let mut vals: Vec<String> = (range.start_col..range.end_col)
                        .map(|c| row.get(c).cloned().unwrap_or_default())
                        .collect();
                    // the API drops trailing blanks
                    while vals.last().is_some_and(|v| v.is_empty()) {
                        vals.pop();
                    }
                    vals
                })
                .collect();
            while out.last().is_some_and(|r| r.is_empty()) {
                out.pop();
            }
            out
        })
    }

    fn clear_range(&self, ws: &Worksheet, range: GridRange) -> Result<()> {
        self.check("clear_range")?;
        self.with_tab(ws, |tab| {
            let end = range.end_row.unwrap_or(usize::MAX).min(tab.cells.len());
            for row in tab.cells.iter_mut().take(end).skip(range.start_row) {
                for c in range.start_col..range.end_col.min(row.len()) {
                    row[c].clear();
                }
            }
        })
    }

    fn write_rows(&self, ws: &Worksheet, at: GridRange, rows: &[Vec<CellValue>]) -> Result<()> {
        self.check("write_rows")?;
        self.with_tab(ws, |tab| {
            for (r, row) in rows.iter().enumerate() {
                for (c, v) in row.iter().enumerate() {
                    tab.set(at.start_row + r, at.start_col + c, v.as_text());
                }
            }
        })
    }

    fn append_rows(&self, ws: &Worksheet, rows: &[Vec<CellValue>]) -> Result<GridRange> {
        self.check("append_rows")?;
        self.with_tab(ws, |tab| {
            let start = tab.used_rows();
            let width = rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
            for (r, row) in rows.iter().enumerate() {
                for (c, v) in row.iter().enumerate() {
                    tab.set(start + r, c, v.as_text());
                }
            }
            GridRange {
                start_row: start,
                end_row: Some(start + rows.len()),
                start_col: 0,
                end_col: width,
            }
        })
    }

    fn format_background(&self, ws: &Worksheet, range: GridRange, color: Rgb) -> Result<()> {
        self.check("format_background")?;
        self.formats
            .borrow_mut()
            .push((ws.title.clone(), range, color));
        Ok(())
    }

    fn write_cell(&self, ws: &Worksheet, cell: GridRange, value: &str) -> Result<()> {
        self.check("write_cell")?;
        self.with_tab(ws, |tab| tab.set(cell.start_row, cell.start_col, value.to_string()))
    }
}
