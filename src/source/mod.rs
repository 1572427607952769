//! Data provider abstraction for obtaining operational records.
//!
//! This module provides a trait-based abstraction for fetching records for a
//! date range from various backends (a seeded generator, CSV files, or
//! in-memory collections).

mod csv_file;
mod memory;
mod mock;

pub use csv_file::{read_records, CsvProvider};
pub use memory::StaticProvider;
pub use mock::{MockProvider, DEFAULT_OWNERS, DEFAULT_RECORD_COUNT};

use std::fmt::Debug;

use anyhow::Result;

use crate::data::{DateRange, Record};

/// Trait for fetching records from various sources.
///
/// Implementations return the records dated within the requested range.
/// The dashboard calls `fetch` when the date range changes or a reload is
/// requested, and recomputes everything else from the returned records.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use riskwatch::{DataProvider, DateRange, MockProvider};
///
/// let end = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
/// let mut provider = MockProvider::new(42);
/// let records = provider.fetch(&DateRange::months_ending(end, 6)).unwrap();
/// assert_eq!(records.len(), 500);
/// ```
pub trait DataProvider: Debug {
    /// Fetch every record dated within `range`.
    fn fetch(&mut self, range: &DateRange) -> Result<Vec<Record>>;

    /// Returns a human-readable description of the provider.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
