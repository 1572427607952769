//! Data models and the KPI/alert engine.
//!
//! This module turns raw operational records into the KPIs, alerts, trends
//! and tables the dashboard displays.
//!
//! ## Submodules
//!
//! - [`record`]: [`Record`], [`Department`] and inclusive [`DateRange`]s
//! - [`metric`]: the nine numeric [`Metric`]s carried by each record
//! - [`dataset`]: [`Dataset`] filtering and top-N selection
//! - [`kpi`]: [`compute_kpis`] and the [`KpiSummary`] it produces
//! - [`alert`]: [`Thresholds`] and [`evaluate_alerts`]
//! - [`trend`]: daily means for the trend charts
//! - [`dashboard`]: [`DashboardData`], computed from a dataset and a [`DashboardQuery`]
//!
//! ## Data Flow
//!
//! ```text
//! Vec<Record> (from a DataProvider)
//!        │
//!        ▼
//! DashboardData::compute(&dataset, &query)
//!        │
//!        ├──▶ filter_by_date_range ∩ filter_by_department
//!        ├──▶ compute_kpis ──▶ evaluate_alerts
//!        ├──▶ Trend::daily
//!        └──▶ owners, delayed, low_quality
//! ```

pub mod alert;
pub mod dashboard;
pub mod dataset;
pub mod kpi;
pub mod metric;
pub mod record;
pub mod trend;

#[cfg(test)]
pub(crate) mod fixtures;

pub use alert::{evaluate_alerts, Alert, AlertKind, Severity, Thresholds};
pub use dashboard::{DashboardData, DashboardQuery, OwnerSummary, OFFENDER_ROWS, OWNER_DETAIL_ROWS};
pub use dataset::{Dataset, DepartmentFilter};
pub use kpi::{compute_kpis, Kpi, KpiSummary};
pub use metric::Metric;
pub use record::{DateRange, Department, Record};
pub use trend::{Trend, TrendPoint};
