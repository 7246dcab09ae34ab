// src/config.rs

use crate::a1;
use std::env;
use thiserror::Error;

/// Source columns copied to the destination, in output order.
/// The first one is the identifier and, unless overridden, the date column.
pub static DEFAULT_COLUMNS: &[&str] = &[
    "A", "Z", "B", "C", "D", "E", "U", "T", "N", "AA", "AB", "CN", "CQ", "CR", "CS", "BQ", "CE",
    "V",
];

pub const DEFAULT_SOURCE_TAB: &str = "Carteira";
pub const DEFAULT_DEST_TAB: &str = "Carteira";
pub const DEFAULT_CYCLE_TAB: &str = "CICLO";
pub const DEFAULT_SOURCE_HEADER_ROW: usize = 5;
pub const DEFAULT_ANNOTATION_CELL: &str = "T2";
pub const DEFAULT_ANNOTATION_LABEL: &str = "Atualizado em: ";
/// Light yellow.
pub const DEFAULT_HIGHLIGHT: Rgb = Rgb {
    red: 1.0,
    green: 1.0,
    blue: 0.6,
};

/// Width of a row synthesized from the cycle sheet (columns A..Q).
pub const RECONCILED_ROW_WIDTH: usize = 17;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("{key}: invalid column letter {value:?}")]
    BadColumn { key: &'static str, value: String },

    #[error("{key}: column {column} is not part of the selected columns")]
    NotSelected { key: &'static str, column: String },

    #[error("{key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// A tab inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub spreadsheet_id: String,
    pub tab: String,
}

/// Background colour, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

/// Positions read from each cycle-sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleColumns {
    pub identifier: String,
    pub label: String,
    pub category: String,
}

impl Default for CycleColumns {
    fn default() -> Self {
        Self {
            identifier: "E".into(),
            label: "F".into(),
            category: "C".into(),
        }
    }
}

/// Everything the job needs to know about where to read and write.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub source: SheetRef,
    pub destination: SheetRef,
    pub cycle: SheetRef,
    /// 1-based row holding the source headers. Data candidates start on
    /// the same row.
    pub source_header_row: usize,
    pub columns: Vec<String>,
    pub date_column: Option<String>,
    pub numeric_column: Option<String>,
    pub cycle_columns: CycleColumns,
    pub annotation_cell: String,
    pub annotation_label: String,
    pub highlight: Rgb,
}

impl JobConfig {
    /// Config with the built-in defaults for everything except the spreadsheets.
    pub fn new(source: SheetRef, destination: SheetRef, cycle: SheetRef) -> Self {
        let columns: Vec<String> = DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect();
        Self {
            source,
            destination,
            cycle,
            source_header_row: DEFAULT_SOURCE_HEADER_ROW,
            date_column: columns.first().cloned(),
            columns,
            numeric_column: None,
            cycle_columns: CycleColumns::default(),
            annotation_cell: DEFAULT_ANNOTATION_CELL.into(),
            annotation_label: DEFAULT_ANNOTATION_LABEL.into(),
            highlight: DEFAULT_HIGHLIGHT,
        }
    }

    /// Build from `SHEETSYNC_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` is this over the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let require = |key: &'static str| {
            get(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let source_id = require("SHEETSYNC_SOURCE_SPREADSHEET_ID")?;
        let dest_id = require("SHEETSYNC_DEST_SPREADSHEET_ID")?;
        let cycle_id = get("SHEETSYNC_CYCLE_SPREADSHEET_ID")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| dest_id.clone());

        let tab = |key: &str, default: &str| {
            get(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let mut cfg = Self::new(
            SheetRef {
                spreadsheet_id: source_id,
                tab: tab("SHEETSYNC_SOURCE_TAB", DEFAULT_SOURCE_TAB),
            },
            SheetRef {
                spreadsheet_id: dest_id,
                tab: tab("SHEETSYNC_DEST_TAB", DEFAULT_DEST_TAB),
            },
            SheetRef {
                spreadsheet_id: cycle_id,
                tab: tab("SHEETSYNC_CYCLE_TAB", DEFAULT_CYCLE_TAB),
            },
        );

        if let Some(v) = get("SHEETSYNC_SOURCE_HEADER_ROW") {
            cfg.source_header_row = v.parse().map_err(|_| ConfigError::Invalid {
                key: "SHEETSYNC_SOURCE_HEADER_ROW",
                message: format!("not a row number: {v:?}"),
            })?;
        }
        if let Some(v) = get("SHEETSYNC_COLUMNS") {
            cfg.columns = split_list(&v);
        }
        // Present but empty disables the coercion; absent follows the
        // first selected column.
        cfg.date_column = match get("SHEETSYNC_DATE_COLUMN") {
            Some(v) => Some(v).filter(|v| !v.is_empty()),
            None => cfg.columns.first().cloned(),
        };
        if let Some(v) = get("SHEETSYNC_NUMERIC_COLUMN") {
            cfg.numeric_column = Some(v).filter(|v| !v.is_empty());
        }
        if let Some(v) = get("SHEETSYNC_CYCLE_COLUMNS") {
            let parts = split_list(&v);
            let [identifier, label, category] = <[String; 3]>::try_from(parts).map_err(|_| {
                ConfigError::Invalid {
                    key: "SHEETSYNC_CYCLE_COLUMNS",
                    message: "expected identifier,label,category".into(),
                }
            })?;
            cfg.cycle_columns = CycleColumns {
                identifier,
                label,
                category,
            };
        }
        if let Some(v) = get("SHEETSYNC_ANNOTATION_CELL").filter(|v| !v.is_empty()) {
            cfg.annotation_cell = v;
        }
        // The label keeps its trailing space, so read it untrimmed.
        if let Some(v) = lookup("SHEETSYNC_ANNOTATION_LABEL") {
            cfg.annotation_label = v;
        }
        if let Some(v) = get("SHEETSYNC_HIGHLIGHT_RGB") {
            cfg.highlight = parse_rgb(&v)?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Normalise letters to upper case and check cross-field constraints.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::Invalid {
                key: "SHEETSYNC_COLUMNS",
                message: "at least one column is required".into(),
            });
        }
        for col in self.columns.iter_mut() {
            *col = normalise_column("SHEETSYNC_COLUMNS", col)?;
        }

        for (key, slot) in [
            ("SHEETSYNC_DATE_COLUMN", &mut self.date_column),
            ("SHEETSYNC_NUMERIC_COLUMN", &mut self.numeric_column),
        ] {
            if let Some(col) = slot.as_mut() {
                *col = normalise_column(key, col)?;
                if !self.columns.contains(col) {
                    return Err(ConfigError::NotSelected {
                        key,
                        column: col.clone(),
                    });
                }
            }
        }

        let cc = &mut self.cycle_columns;
        for col in [&mut cc.identifier, &mut cc.label, &mut cc.category] {
            *col = normalise_column("SHEETSYNC_CYCLE_COLUMNS", col)?;
        }

        if self.source_header_row == 0 {
            return Err(ConfigError::Invalid {
                key: "SHEETSYNC_SOURCE_HEADER_ROW",
                message: "rows are 1-based".into(),
            });
        }
        if a1::parse_range(&self.annotation_cell).is_none() {
            return Err(ConfigError::Invalid {
                key: "SHEETSYNC_ANNOTATION_CELL",
                message: format!("not an A1 cell: {:?}", self.annotation_cell),
            });
        }
        Ok(())
    }
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalise_column(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let upper = raw.trim().to_ascii_uppercase();
    match a1::column_index(&upper) {
        Some(_) => Ok(upper),
        None => Err(ConfigError::BadColumn {
            key,
            value: raw.to_string(),
        }),
    }
}

fn parse_rgb(v: &str) -> Result<Rgb, ConfigError> {
    let bad = || ConfigError::Invalid {
        key: "SHEETSYNC_HIGHLIGHT_RGB",
        message: format!("expected r,g,b in 0..1, got {v:?}"),
    };
    let parts: Vec<f32> = split_list(v)
        .iter()
        .map(|p| p.parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|_| bad())?;
    match parts.as_slice() {
        &[red, green, blue] if parts.iter().all(|c| (0.0..=1.0).contains(c)) => {
            Ok(Rgb { red, green, blue })
        }
        _ => Err(bad()),
    }
}
