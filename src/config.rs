//! Layered settings.
//!
//! Values are resolved in order, later sources winning:
//!
//! 1. struct defaults
//! 2. an optional TOML file (`--config`)
//! 3. `RISKWATCH_*` environment variables, nested keys separated by `__`
//!    (e.g. `RISKWATCH_THRESHOLDS__DELAY_DAYS=20`)
//!
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::data::{DashboardQuery, DateRange, DepartmentFilter, Thresholds};
use crate::source::DEFAULT_RECORD_COUNT;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "RISKWATCH";

/// Mock generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockSettings {
    pub seed: u64,
    pub records: usize,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            records: DEFAULT_RECORD_COUNT,
        }
    }
}

/// Dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Department name, or `ALL`.
    pub department: String,
    /// First day of the range. Defaults to `period_months` before `end`.
    pub start: Option<NaiveDate>,
    /// Last day of the range. Defaults to today.
    pub end: Option<NaiveDate>,
    pub period_months: u32,
    pub thresholds: Thresholds,
    pub mock: MockSettings,
    /// Read records from this CSV file instead of generating them.
    pub csv_path: Option<PathBuf>,
    /// Re-fetch interval in the TUI; 0 disables periodic re-fetching.
    pub refresh_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            department: "ALL".to_string(),
            start: None,
            end: None,
            period_months: 6,
            thresholds: Thresholds::default(),
            mock: MockSettings::default(),
            csv_path: None,
            refresh_secs: 0,
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load settings, reading environment variables from `env` instead of the
    /// process environment when it is given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings: Settings = builder
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        settings.thresholds.validate()?;
        Ok(settings)
    }

    pub fn department_filter(&self) -> Result<DepartmentFilter> {
        Ok(self.department.parse()?)
    }

    /// The configured range, with missing ends filled in relative to `today`.
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange> {
        let end = self.end.unwrap_or(today);
        let start = self
            .start
            .unwrap_or_else(|| DateRange::months_ending(end, self.period_months).start());
        Ok(DateRange::new(start, end)?)
    }

    /// The initial dashboard query these settings describe.
    pub fn query(&self, today: NaiveDate) -> Result<DashboardQuery> {
        Ok(DashboardQuery::new(
            self.department_filter()?,
            self.date_range(today)?,
            self.thresholds,
        ))
    }
}
