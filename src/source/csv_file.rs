//! CSV file data provider.
//!
//! Reads records from a CSV file in the same layout the dashboard exports.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::DataProvider;
use crate::data::{DateRange, Record};

/// Parse records from CSV with a header row.
///
/// Rates must be finite and within `0.0..=1.0`. Errors name the offending
/// line (counting the header as line 1).
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let line = line_num + 2;
        let record: Record =
            result.with_context(|| format!("CSV parse error at line {}", line))?;
        record
            .check_rates()
            .with_context(|| format!("Invalid value at line {}", line))?;
        records.push(record);
    }
    Ok(records)
}

/// A provider that reads records from a CSV file.
///
/// The file is parsed on first fetch and re-read only when its modification
/// time changes; each fetch returns the cached records within the range.
#[derive(Debug)]
pub struct CsvProvider {
    path: PathBuf,
    description: String,
    last_modified: Option<SystemTime>,
    cached: Option<Vec<Record>>,
}

impl CsvProvider {
    /// Create a new CSV provider for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("csv: {}", path.display());
        Self {
            path,
            description,
            last_modified: None,
            cached: None,
        }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file's modification time.
    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&self) -> Result<Vec<Record>> {
        let file = fs::File::open(&self.path)
            .with_context(|| format!("Failed to open '{}'", self.path.display()))?;
        read_records(file).with_context(|| format!("Failed to read '{}'", self.path.display()))
    }
}

impl DataProvider for CsvProvider {
    fn fetch(&mut self, range: &DateRange) -> Result<Vec<Record>> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(last), Some(current)) => current > last,
        };

        if file_changed || self.cached.is_none() {
            let records = self.read_file()?;
            info!(path = %self.path.display(), records = records.len(), "loaded CSV records");
            self.last_modified = current_modified;
            self.cached = Some(records);
        }

        let records: Vec<Record> = self
            .cached
            .iter()
            .flatten()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect();
        debug!(%range, records = records.len(), "fetched CSV records");
        Ok(records)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Department;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "日期,部门,项目负责人,新品开发延迟天数,新品开发成功率,寻源周期达标率,交期达标率,一验合格率,二验合格率,库存周转天数,滞销库存率,物流延迟天数";

    fn sample_csv() -> String {
        format!(
            "{}\n\
             2025-06-01,项目部,张明,12,0.81,0.7,0.9,0.88,0.93,45,0.12,3\n\
             2025-06-05,品质部,李燕燕,40,0.66,0.8,0.75,0.72,0.8,120,0.3,9\n\
             2025-07-01,物流部,刘伟,0,0.99,0.9,0.95,0.96,0.98,30,0.05,0\n",
            HEADER
        )
    }

    fn june() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_read_records() {
        let records = read_records(sample_csv().as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].owner, "张明");
        assert_eq!(records[1].department, Department::Quality);
        assert_eq!(records[1].dev_delay_days, 40);
        assert!((records[1].dead_stock_rate - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_parse_error_names_line() {
        let csv = format!("{}\n2025-06-01,销售部,张明,1,0.8,0.8,0.8,0.8,0.8,40,0.1,1\n", HEADER);
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"), "{:#}", err);
    }

    #[test]
    fn test_invalid_rate_names_line() {
        for bad in ["NaN", "inf", "1.2", "-0.1"] {
            let csv = format!(
                "{}\n2025-06-01,品质部,赵华,1,0.8,0.8,0.8,0.8,0.8,40,0.1,1\n2025-06-02,品质部,赵华,1,0.8,0.8,0.8,{},0.8,40,0.1,1\n",
                HEADER, bad
            );
            let err = read_records(csv.as_bytes()).unwrap_err();
            let msg = format!("{:#}", err);
            assert!(msg.contains("line 3"), "{}", msg);
            assert!(msg.contains("一验合格率"), "{}", msg);
        }
    }

    #[test]
    fn test_csv_provider_new() {
        let provider = CsvProvider::new("/tmp/records.csv");
        assert_eq!(provider.path(), Path::new("/tmp/records.csv"));
        assert_eq!(provider.description(), "csv: /tmp/records.csv");
    }

    #[test]
    fn test_csv_provider_filters_by_range() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", sample_csv()).unwrap();

        let mut provider = CsvProvider::new(file.path());
        let records = provider.fetch(&june()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| june().contains(r.date)));

        // Served from cache on the second fetch
        assert_eq!(provider.fetch(&june()).unwrap(), records);
    }

    #[test]
    fn test_csv_provider_missing_file() {
        let mut provider = CsvProvider::new("/nonexistent/path/records.csv");
        let err = provider.fetch(&june()).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
