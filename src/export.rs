//! CSV and JSON exports of the current dashboard state.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::data::{
    Alert, DashboardData, DashboardQuery, Dataset, DateRange, KpiSummary, Metric, Thresholds,
};

/// CSV column headers, in record field order.
pub fn csv_columns() -> Vec<&'static str> {
    ["日期", "部门", "项目负责人"]
        .into_iter()
        .chain(Metric::ALL.iter().map(|m| m.label()))
        .collect()
}

/// Write `dataset` as UTF-8 CSV with a header row.
///
/// The header is written even when there are no records.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if dataset.is_empty() {
        csv_writer.write_record(csv_columns())?;
    }
    for record in dataset {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export filename encoding the department and date range,
/// e.g. `风控数据_全部_2024-12-11_2025-06-11.csv`.
pub fn csv_filename(query: &DashboardQuery) -> String {
    format!(
        "风控数据_{}_{}_{}.csv",
        query.department.label(),
        query.range.start(),
        query.range.end()
    )
}

/// Report filename for the same selection, e.g. `风控报告_全部_2024-12-11_2025-06-11.json`.
pub fn report_filename(query: &DashboardQuery) -> String {
    format!(
        "风控报告_{}_{}_{}.json",
        query.department.label(),
        query.range.start(),
        query.range.end()
    )
}

/// Resolve an export target: directories get [`csv_filename`] appended.
pub fn resolve_csv_path(target: &Path, query: &DashboardQuery) -> PathBuf {
    if target.is_dir() {
        target.join(csv_filename(query))
    } else {
        target.to_path_buf()
    }
}

/// Write the filtered dataset to `path` as CSV.
pub fn export_csv(data: &DashboardData, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    write_csv(&data.dataset, std::io::BufWriter::new(file))?;
    info!(path = %path.display(), records = data.dataset.len(), "exported CSV");
    Ok(())
}

/// One alert in a [`Report`].
#[derive(Debug, Serialize)]
pub struct ReportAlert {
    #[serde(flatten)]
    pub alert: Alert,
    pub message: String,
}

/// Snapshot of KPIs and alerts for one query.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub department: &'static str,
    pub range: DateRange,
    pub thresholds: Thresholds,
    pub records: usize,
    /// `None` (serialized as `null`) when no records matched.
    pub kpis: Option<&'a KpiSummary>,
    pub alerts: Vec<ReportAlert>,
}

impl<'a> Report<'a> {
    pub fn new(data: &'a DashboardData, query: &DashboardQuery) -> Self {
        Self {
            department: query.department.label(),
            range: query.range,
            thresholds: query.thresholds,
            records: data.dataset.len(),
            kpis: data.kpis.as_ref(),
            alerts: data
                .alerts
                .iter()
                .map(|a| ReportAlert {
                    alert: a.clone(),
                    message: a.to_string(),
                })
                .collect(),
        }
    }
}

/// Write the KPI/alert report as pretty JSON.
pub fn write_report<W: Write>(data: &DashboardData, query: &DashboardQuery, mut writer: W) -> Result<()> {
    let json = serde_json::to_string_pretty(&Report::new(data, query))?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write the KPI/alert report to `path`.
pub fn export_report(data: &DashboardData, query: &DashboardQuery, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    write_report(data, query, file)?;
    info!(path = %path.display(), alerts = data.alerts.len(), "exported report");
    Ok(())
}
