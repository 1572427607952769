//! # riskwatch
//!
//! A KPI and alert engine with a terminal dashboard for monitoring the
//! operational risk of a cross-border e-commerce business.
//!
//! Records are fetched from a data provider for a date range, filtered by
//! department, reduced to seven headline KPIs, and checked against three
//! operator-adjustable thresholds. The results drive an interactive
//! terminal UI, or can be exported as CSV and JSON.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (KPIs,   │    │(rendering)   │         │ │
//! │  └────┬────┘    │  alerts) │    └─────────┘    └─────────┘ │
//! │       │         └────┬─────┘                               │
//! │       ▼              ▼                                     │
//! │  ┌─────────┐    ┌──────────┐                               │
//! │  │ source  │    │  export  │──▶ CSV / JSON report          │
//! │  │ (input) │    └──────────┘                               │
//! │  └─────────┘◀── MockProvider | CsvProvider | StaticProvider│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: records, datasets, KPIs, alerts, trends, and the
//!   [`DashboardData`] computed from a [`DashboardQuery`]
//! - **[`source`]**: the [`DataProvider`] trait with seeded mock, CSV and
//!   in-memory implementations
//! - **[`export`]**: CSV export and the JSON KPI/alert report
//! - **[`config`]**: layered [`Settings`] (defaults, TOML file, environment)
//! - **[`app`]**, **[`events`]**, **[`ui`]**: the terminal dashboard
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Dashboard over generated records
//! riskwatch --seed 42
//!
//! # Dashboard over a CSV file, quality department only
//! riskwatch --csv records.csv --department 品质部
//!
//! # Print the KPI/alert report and exit
//! riskwatch --report --start 2025-01-01 --end 2025-06-30
//! ```
//!
//! ### As a library
//!
//! ```
//! use chrono::NaiveDate;
//! use riskwatch::{
//!     compute_kpis, evaluate_alerts, DataProvider, Dataset, DateRange, Kpi, MockProvider,
//!     Thresholds,
//! };
//!
//! let end = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
//! let mut provider = MockProvider::new(42);
//! let dataset = Dataset::new(provider.fetch(&DateRange::months_ending(end, 6)).unwrap());
//!
//! let kpis = compute_kpis(&dataset).unwrap();
//! assert!(kpis.get(Kpi::AvgDevDelayDays) < 60.0);
//!
//! for alert in evaluate_alerts(&kpis, &Thresholds::default()) {
//!     println!("{}", alert);
//! }
//! ```
//!
//! ### Driving the dashboard state
//!
//! ```
//! use chrono::NaiveDate;
//! use riskwatch::{App, DashboardQuery, DateRange, DepartmentFilter, MockProvider, Theme, Thresholds};
//!
//! let end = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
//! let query = DashboardQuery::new(
//!     DepartmentFilter::All,
//!     DateRange::months_ending(end, 6),
//!     Thresholds::default(),
//! );
//! let mut app = App::with_theme(Box::new(MockProvider::new(42)), query, Theme::dark());
//! app.reload_data().unwrap();
//! app.adjust_delay_threshold(5);
//! assert_eq!(app.query.thresholds.delay_days, 20);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::Settings;
pub use data::{
    compute_kpis, evaluate_alerts, Alert, AlertKind, DashboardData, DashboardQuery, Dataset,
    DateRange, Department, DepartmentFilter, Kpi, KpiSummary, Metric, Record, Severity,
    Thresholds, Trend,
};
pub use error::DashboardError;
pub use source::{CsvProvider, DataProvider, MockProvider, StaticProvider};
pub use ui::Theme;
