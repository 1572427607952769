//! Error types for the KPI and alert engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by dataset and threshold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// A mean was requested over zero records.
    #[error("cannot compute KPIs over an empty dataset")]
    EmptyDataset,

    /// Date range whose start falls after its end.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Threshold outside the range the operator may choose from.
    #[error("{name} threshold {value} is outside {min}..={max}")]
    ThresholdOutOfRange {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Rate column holding NaN, infinity, or a value outside `0.0..=1.0`.
    #[error("{metric} must be between 0 and 1, got {value}")]
    RateOutOfRange { metric: &'static str, value: f64 },

    /// Department name that matches none of the known departments.
    #[error("unknown department: {0}")]
    UnknownDepartment(String),
}
