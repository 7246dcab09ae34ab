use crate::a1::GridRange;
use crate::process::{ColumnCoercion, PrepareStats};
use std::fmt::Display;
use tracing::{info, warn};

/// How a recoverable stage ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T = ()> {
    Completed(T),
    Skipped(&'static str),
    Failed { reason: String },
}

impl<T> StageOutcome<T> {
    /// Record a failure with the error's full context chain.
    pub fn failed(err: impl Display) -> Self {
        StageOutcome::Failed {
            reason: format!("{:#}", err),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed { .. })
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            StageOutcome::Completed(v) => Some(v),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StageOutcome::Completed(_) => "completed",
            StageOutcome::Skipped(_) => "skipped",
            StageOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileSummary {
    /// Identifiers in the destination before appending.
    pub existing: usize,
    /// Cycle rows read, header excluded.
    pub candidates: usize,
    /// Where the synthesized rows landed; `None` when nothing was missing.
    pub appended: Option<GridRange>,
}

impl ReconcileSummary {
    pub fn appended_rows(&self) -> usize {
        self.appended.and_then(|r| r.rows()).unwrap_or(0)
    }
}

/// Everything one run did, including the stages that failed softly.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub prepare: PrepareStats,
    pub rows_written: usize,
    pub reconcile: StageOutcome<ReconcileSummary>,
    pub highlight: StageOutcome,
    /// The annotation text written.
    pub annotation: StageOutcome<String>,
}

impl JobReport {
    /// Data was written but a later stage failed.
    pub fn is_partial(&self) -> bool {
        self.reconcile.is_failed() || self.highlight.is_failed() || self.annotation.is_failed()
    }

    pub fn appended_rows(&self) -> usize {
        self.reconcile
            .completed()
            .map_or(0, ReconcileSummary::appended_rows)
    }

    pub fn log(&self) {
        let numeric = match &self.prepare.numeric {
            ColumnCoercion::NotConfigured => "off".to_string(),
            ColumnCoercion::Applied { converted, .. } => format!("{converted} converted"),
            ColumnCoercion::Abandoned { reason } => format!("abandoned ({reason})"),
        };
        info!(
            read = self.prepare.rows_read,
            dropped = self.prepare.rows_dropped,
            written = self.rows_written,
            appended = self.appended_rows(),
            errors_blanked = self.prepare.errors_blanked,
            %numeric,
            reconcile = self.reconcile.label(),
            highlight = self.highlight.label(),
            annotation = self.annotation.label(),
            "sync finished"
        );
        for (stage, outcome) in [
            ("reconcile", reason(&self.reconcile)),
            ("highlight", reason(&self.highlight)),
            ("annotation", reason(&self.annotation)),
        ] {
            if let Some(r) = outcome {
                warn!(stage, reason = %r, "stage failed, data already written");
            }
        }
    }
}

fn reason<T>(o: &StageOutcome<T>) -> Option<&str> {
    match o {
        StageOutcome::Failed { reason } => Some(reason),
        _ => None,
    }
}
