//! Everything a dashboard view needs, derived from a dataset and a query.

use std::time::Instant;

use tracing::debug;

use super::alert::{evaluate_alerts, Alert, Severity, Thresholds};
use super::dataset::{Dataset, DepartmentFilter};
use super::kpi::{compute_kpis, Kpi, KpiSummary};
use super::metric::Metric;
use super::record::DateRange;
use super::trend::Trend;

/// Rows shown in each high-risk table.
pub const OFFENDER_ROWS: usize = 10;

/// Records shown in an owner's detail view.
pub const OWNER_DETAIL_ROWS: usize = 10;

/// The operator's current selections.
///
/// Immutable: changing a selection produces a new query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardQuery {
    pub department: DepartmentFilter,
    pub range: DateRange,
    pub thresholds: Thresholds,
}

impl DashboardQuery {
    pub fn new(department: DepartmentFilter, range: DateRange, thresholds: Thresholds) -> Self {
        Self {
            department,
            range,
            thresholds,
        }
    }

    pub fn with_department(self, department: DepartmentFilter) -> Self {
        Self { department, ..self }
    }

    pub fn with_range(self, range: DateRange) -> Self {
        Self { range, ..self }
    }

    pub fn with_thresholds(self, thresholds: Thresholds) -> Self {
        Self { thresholds, ..self }
    }
}

/// KPIs for one owner.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerSummary {
    pub name: String,
    pub records: usize,
    pub kpis: Option<KpiSummary>,
}

/// Computed dashboard state for one query.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Records after date range and department filtering.
    pub dataset: Dataset,
    /// `None` when the filtered dataset is empty.
    pub kpis: Option<KpiSummary>,
    pub alerts: Vec<Alert>,
    pub trend: Trend,
    pub owners: Vec<OwnerSummary>,
    /// Records over the delay threshold, most delayed first.
    pub delayed: Dataset,
    /// Records under the quality threshold, lowest first-pass rate first.
    pub low_quality: Dataset,
    pub last_updated: Instant,
}

impl DashboardData {
    /// Filter `source` by the query (date range AND department) and derive every view.
    pub fn compute(source: &Dataset, query: &DashboardQuery) -> Self {
        let dataset = source.filter_by_date_range(&query.range).filter_by_department(&query.department);

        let kpis = compute_kpis(&dataset).ok();
        let alerts = kpis
            .as_ref()
            .map(|k| evaluate_alerts(k, &query.thresholds))
            .unwrap_or_default();

        let owners = dataset
            .owners()
            .into_iter()
            .map(|name| {
                let owned = dataset.filter_by_owner(&name);
                OwnerSummary {
                    records: owned.len(),
                    kpis: compute_kpis(&owned).ok(),
                    name,
                }
            })
            .collect();

        let delay_threshold = f64::from(query.thresholds.delay_days);
        let delayed = dataset
            .filter_where(Metric::DevDelayDays, |v| v > delay_threshold)
            .top_n_by_metric(Metric::DevDelayDays, OFFENDER_ROWS, false);

        let quality_threshold = f64::from(query.thresholds.quality_pct) / 100.0;
        let low_quality = dataset
            .filter_where(Metric::FirstInspectionPassRate, |v| v < quality_threshold)
            .top_n_by_metric(Metric::FirstInspectionPassRate, OFFENDER_ROWS, true);

        debug!(
            department = %query.department,
            range = %query.range,
            records = dataset.len(),
            alerts = alerts.len(),
            "recomputed dashboard"
        );

        Self {
            trend: Trend::daily(&dataset),
            dataset,
            kpis,
            alerts,
            owners,
            delayed,
            low_quality,
            last_updated: Instant::now(),
        }
    }

    /// An owner's most recent records, newest first.
    pub fn owner_detail(&self, owner: &str) -> Dataset {
        self.dataset.filter_by_owner(owner).most_recent(OWNER_DETAIL_ROWS)
    }

    /// Worst alert severity, or `Ok` when nothing fired.
    pub fn overall_severity(&self) -> Severity {
        self.alerts.iter().map(|a| a.severity).max().unwrap_or(Severity::Ok)
    }

    /// Severity of the alert raised for `kpi`, or `Ok` if none was.
    pub fn kpi_severity(&self, kpi: Kpi) -> Severity {
        self.alerts
            .iter()
            .find(|a| a.kind.kpi() == kpi)
            .map(|a| a.severity)
            .unwrap_or(Severity::Ok)
    }

    /// Count of alerts at the given severity.
    pub fn alert_count(&self, severity: Severity) -> usize {
        self.alerts.iter().filter(|a| a.severity == severity).count()
    }
}
