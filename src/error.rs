//! Error and diagnostic types
//!
//! Only `ScheduleError` aborts an operation. Skipped records and skipped
//! placements are reported as values (`LoadWarning`, `LayoutDiagnostic`)
//! next to the result, so one bad row never hides the rest of the calendar.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("No schedule records to process")]
    EmptyInput,

    #[error("Invalid configuration at line {line}: {message}")]
    InvalidConfig { line: usize, message: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Non-fatal problem found while loading records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    /// Record at `index` has no start date and was not placed
    MissingStartDate { index: usize, environment: String },
    /// Record at `index` ends before it starts; treated as a single day
    EndBeforeStart { index: usize, environment: String, start: NaiveDate, end: NaiveDate },
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadWarning::MissingStartDate { index, environment } => {
                write!(f, "record {} ({}) has no start date; skipped", index + 1, environment)
            }
            LoadWarning::EndBeforeStart { index, environment, start, end } => {
                write!(f, "record {} ({}) ends {} before it starts {}; using start day only", index + 1, environment, end, start)
            }
        }
    }
}

/// Non-fatal problem found while laying out one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutDiagnostic {
    /// A span endpoint has no cell in the month grid; the range was not drawn
    UnresolvableCellIndex { range_id: String, date: NaiveDate },
}

impl std::fmt::Display for LayoutDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutDiagnostic::UnresolvableCellIndex { range_id, date } => {
                write!(f, "range '{}': no grid cell for {}; placement skipped", range_id, date)
            }
        }
    }
}
