//! Copy a filtered, reshaped slice of one spreadsheet tab into another,
//! reconcile it against a third tab, and stamp the time of the run.

pub mod a1;
pub mod annotate;
pub mod auth;
pub mod config;
pub mod job;
pub mod process;
pub mod reconcile;
pub mod sheets;

pub use config::JobConfig;
pub use job::{JobReport, SheetSyncJob, StageOutcome};
