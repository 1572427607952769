//! Mean-valued KPIs over a dataset.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::dataset::Dataset;
use super::metric::Metric;
use crate::error::DashboardError;

/// The seven headline KPIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kpi {
    AvgDevDelayDays,
    DevSuccessRate,
    SourcingComplianceRate,
    FirstInspectionPassRate,
    InventoryTurnoverDays,
    DeadStockRate,
    LogisticsDelayDays,
}

impl Kpi {
    pub const ALL: [Kpi; 7] = [
        Kpi::AvgDevDelayDays,
        Kpi::DevSuccessRate,
        Kpi::SourcingComplianceRate,
        Kpi::FirstInspectionPassRate,
        Kpi::InventoryTurnoverDays,
        Kpi::DeadStockRate,
        Kpi::LogisticsDelayDays,
    ];

    /// The record metric this KPI averages.
    pub fn metric(&self) -> Metric {
        match self {
            Kpi::AvgDevDelayDays => Metric::DevDelayDays,
            Kpi::DevSuccessRate => Metric::DevSuccessRate,
            Kpi::SourcingComplianceRate => Metric::SourcingComplianceRate,
            Kpi::FirstInspectionPassRate => Metric::FirstInspectionPassRate,
            Kpi::InventoryTurnoverDays => Metric::InventoryTurnoverDays,
            Kpi::DeadStockRate => Metric::DeadStockRate,
            Kpi::LogisticsDelayDays => Metric::LogisticsDelayDays,
        }
    }

    /// KPI name. Differs from the metric label only for the delay average.
    pub fn label(&self) -> &'static str {
        match self {
            Kpi::AvgDevDelayDays => "新品平均延迟天数",
            other => other.metric().label(),
        }
    }

    /// Format a value of this KPI for a tile: percentages for rates, days otherwise.
    pub fn format(&self, value: f64) -> String {
        self.metric().format(value)
    }
}

/// Mean of each [`Kpi`] over a non-empty dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    values: BTreeMap<Kpi, f64>,
    sample_size: usize,
}

impl KpiSummary {
    /// Mean value of `kpi`.
    pub fn get(&self, kpi: Kpi) -> f64 {
        self.values.get(&kpi).copied().unwrap_or(f64::NAN)
    }

    /// Look up a KPI by its label, e.g. `"新品平均延迟天数"`.
    pub fn by_label(&self, label: &str) -> Option<f64> {
        Kpi::ALL.iter().find(|k| k.label() == label).map(|k| self.get(*k))
    }

    /// Number of records the means were taken over.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn iter(&self) -> impl Iterator<Item = (Kpi, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

/// Serialized as a `label -> mean` map.
impl Serialize for KpiSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (kpi, value) in &self.values {
            map.serialize_entry(kpi.label(), value)?;
        }
        map.end()
    }
}

/// Compute the unweighted mean of every KPI over `dataset`.
///
/// Returns [`DashboardError::EmptyDataset`] when there are no records.
pub fn compute_kpis(dataset: &Dataset) -> Result<KpiSummary, DashboardError> {
    if dataset.is_empty() {
        return Err(DashboardError::EmptyDataset);
    }

    let values = Kpi::ALL
        .iter()
        .filter_map(|kpi| dataset.metric_mean(kpi.metric()).map(|mean| (*kpi, mean)))
        .collect();

    Ok(KpiSummary {
        values,
        sample_size: dataset.len(),
    })
}
