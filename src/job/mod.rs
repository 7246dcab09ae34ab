// src/job/mod.rs

//! The sync pipeline: read → filter/coerce → clear+write → reconcile → annotate.
//!
//! Reading and writing the destination are fatal on error. Reconciliation,
//! highlighting and the timestamp each fail on their own and end up in the
//! [`JobReport`].

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use tracing::{error, info, instrument};

use crate::a1::{self, GridRange};
use crate::annotate;
use crate::config::{JobConfig, RECONCILED_ROW_WIDTH};
use crate::process::{self, CellValue, ColumnProjector, Coercions, PreparedTable};
use crate::reconcile::{self, CycleRow};
use crate::sheets::{SpreadsheetGateway, Worksheet};

mod report;

pub use report::{JobReport, ReconcileSummary, StageOutcome};

pub struct SheetSyncJob<G> {
    gateway: G,
    config: JobConfig,
    projector: ColumnProjector,
    coercions: Coercions,
    annotation_cell: GridRange,
}

impl<G: SpreadsheetGateway> SheetSyncJob<G> {
    pub fn new(gateway: G, mut config: JobConfig) -> Result<Self> {
        config.validate().context("invalid job configuration")?;
        let projector = ColumnProjector::new(&config.columns)?;
        let coercions = Coercions::for_columns(
            &projector,
            config.date_column.as_deref(),
            config.numeric_column.as_deref(),
        );
        let annotation_cell = a1::parse_range(&config.annotation_cell)
            .ok_or_else(|| anyhow!("invalid annotation cell {:?}", config.annotation_cell))?;
        Ok(Self {
            gateway,
            config,
            projector,
            coercions,
            annotation_cell,
        })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run once, stamping the local time.
    pub fn run(&self) -> Result<JobReport> {
        self.run_at(&Local::now())
    }

    pub fn run_at<Tz>(&self, now: &DateTime<Tz>) -> Result<JobReport>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        // ─── 1) read ──────────────────────────────────────────────────────
        let source_ws = self
            .gateway
            .open(&self.config.source)
            .with_context(|| format!("opening source tab {:?}", self.config.source.tab))?;
        let dest_ws = self
            .gateway
            .open(&self.config.destination)
            .with_context(|| format!("opening destination tab {:?}", self.config.destination.tab))?;
        let source = self.read_source(&source_ws)?;

        // ─── 2) filter + coerce ───────────────────────────────────────────
        let table = process::prepare(&source, &self.projector, &self.coercions)?;

        // ─── 3) clear + write ─────────────────────────────────────────────
        let rows_written = self.write_destination(&dest_ws, &table)?;

        // ─── 4) reconcile + highlight ─────────────────────────────────────
        let reconcile = match self.reconcile(&dest_ws) {
            Ok(summary) => StageOutcome::Completed(summary),
            Err(e) => {
                error!(error = %format!("{e:#}"), "reconciliation failed");
                StageOutcome::failed(&e)
            }
        };
        let highlight = match reconcile.completed().and_then(|s| s.appended) {
            Some(range) => match self.highlight(&dest_ws, range) {
                Ok(()) => StageOutcome::Completed(()),
                Err(e) => {
                    error!(error = %format!("{e:#}"), "highlighting appended rows failed");
                    StageOutcome::failed(&e)
                }
            },
            None => StageOutcome::Skipped("no rows appended"),
        };

        // ─── 5) annotate ──────────────────────────────────────────────────
        let annotation = match self.annotate(&dest_ws, now) {
            Ok(text) => StageOutcome::Completed(text),
            Err(e) => {
                error!(error = %format!("{e:#}"), "writing the update timestamp failed");
                StageOutcome::failed(&e)
            }
        };

        let report = JobReport {
            prepare: table.stats,
            rows_written,
            reconcile,
            highlight,
            annotation,
        };
        report.log();
        Ok(report)
    }

    /// Header row and everything below it, up to the last selected column.
    /// The header row is the first data candidate too.
    #[instrument(level = "info", skip_all, fields(tab = %ws.title))]
    fn read_source(&self, ws: &Worksheet) -> Result<Vec<Vec<String>>> {
        let last = self.projector.max_index().unwrap_or(0);
        let range = GridRange::open_rows(self.config.source_header_row - 1, 0, last + 1);
        let rows = self
            .gateway
            .read_rows(ws, range)
            .with_context(|| format!("reading source rows {}", range.on_tab(&ws.title)))?;
        info!(rows = rows.len(), "read source rows");
        Ok(rows)
    }

    /// Wipe the destination, then write headers and rows from `A1`.
    #[instrument(level = "info", skip_all, fields(tab = %ws.title))]
    fn write_destination(&self, ws: &Worksheet, table: &PreparedTable) -> Result<usize> {
        let width = self.projector.width().max(RECONCILED_ROW_WIDTH);
        let everything = GridRange::open_rows(0, 0, width);
        self.gateway
            .clear_range(ws, everything)
            .with_context(|| format!("clearing {}", everything.on_tab(&ws.title)))?;

        let mut out: Vec<Vec<CellValue>> = Vec::with_capacity(table.rows.len() + 1);
        out.push(table.headers.iter().map(CellValue::text).collect());
        out.extend(table.rows.iter().cloned());
        self.gateway
            .write_rows(ws, GridRange::cell(0, 0), &out)
            .context("writing destination rows")?;
        info!(rows = table.rows.len(), "destination rewritten");
        Ok(table.rows.len())
    }

    /// Append a row for each cycle identifier the destination lacks.
    #[instrument(level = "info", skip_all, fields(tab = %dest.title))]
    pub fn reconcile(&self, dest: &Worksheet) -> Result<ReconcileSummary> {
        let ids = self
            .gateway
            .read_rows(dest, GridRange::open_rows(1, 0, 1))
            .context("reading destination identifiers")?;
        let existing = reconcile::membership(&ids);

        let cc = &self.config.cycle_columns;
        let col = |l: &str| a1::column_index(l).ok_or_else(|| anyhow!("bad cycle column {l:?}"));
        let (id_col, label_col, cat_col) = (col(&cc.identifier)?, col(&cc.label)?, col(&cc.category)?);

        let cycle_ws = self
            .gateway
            .open(&self.config.cycle)
            .with_context(|| format!("opening cycle tab {:?}", self.config.cycle.tab))?;
        let last = id_col.max(label_col).max(cat_col);
        let raw = self
            .gateway
            .read_rows(&cycle_ws, GridRange::open_rows(1, 0, last + 1))
            .context("reading cycle rows")?;
        let candidates: Vec<CycleRow> = raw
            .iter()
            .map(|r| CycleRow::from_raw(r, id_col, label_col, cat_col))
            .collect();

        let missing = reconcile::missing_rows(&candidates, &existing);
        info!(
            existing = existing.len(),
            candidates = candidates.len(),
            missing = missing.len(),
            "reconciled against cycle sheet"
        );

        let appended = if missing.is_empty() {
            None
        } else {
            let width = self.projector.width().max(RECONCILED_ROW_WIDTH);
            let rows: Vec<Vec<CellValue>> = missing
                .iter()
                .map(|c| c.to_destination_row(width))
                .collect();
            let range = self
                .gateway
                .append_rows(dest, &rows)
                .context("appending reconciled rows")?;
            Some(range)
        };

        Ok(ReconcileSummary {
            existing: existing.len(),
            candidates: candidates.len(),
            appended,
        })
    }

    /// Fill the appended rows' A..Q background.
    fn highlight(&self, ws: &Worksheet, appended: GridRange) -> Result<()> {
        let range = appended.with_columns(0, RECONCILED_ROW_WIDTH);
        self.gateway
            .format_background(ws, range, self.config.highlight)
            .with_context(|| format!("highlighting {}", range.on_tab(&ws.title)))
    }

    fn annotate<Tz>(&self, ws: &Worksheet, now: &DateTime<Tz>) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let text = annotate::updated_at(&self.config.annotation_label, now);
        self.gateway
            .write_cell(ws, self.annotation_cell, &text)
            .with_context(|| format!("writing {}", self.annotation_cell.on_tab(&ws.title)))?;
        info!(cell = %self.annotation_cell, %text, "stamped update time");
        Ok(text)
    }
}
