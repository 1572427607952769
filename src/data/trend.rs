//! Daily trend aggregation for the trend charts.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::dataset::Dataset;
use super::metric::Metric;

/// Mean of every trend metric on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Number of records that fell on this day.
    pub count: usize,
    values: BTreeMap<Metric, f64>,
}

impl TrendPoint {
    /// Daily mean of `metric`, or `None` if it is not a trend metric.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }
}

/// Per-day means of [`Metric::TREND`], ordered by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trend {
    pub points: Vec<TrendPoint>,
}

impl Trend {
    /// Group records by date and average each trend metric.
    pub fn daily(dataset: &Dataset) -> Self {
        let mut sums: BTreeMap<NaiveDate, (usize, [f64; Metric::TREND.len()])> = BTreeMap::new();

        for record in dataset {
            let (count, totals) = sums.entry(record.date).or_insert((0, [0.0; Metric::TREND.len()]));
            *count += 1;
            for (total, metric) in totals.iter_mut().zip(Metric::TREND) {
                *total += metric.value(record);
            }
        }

        let points = sums
            .into_iter()
            .map(|(date, (count, totals))| TrendPoint {
                date,
                count,
                values: Metric::TREND
                    .into_iter()
                    .zip(totals)
                    .map(|(metric, total)| (metric, total / count as f64))
                    .collect(),
            })
            .collect();

        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(date, value)` series for one metric, in date order.
    pub fn series(&self, metric: Metric) -> Vec<(NaiveDate, f64)> {
        self.points.iter().filter_map(|p| p.get(metric).map(|v| (p.date, v))).collect()
    }

    /// Smallest and largest daily mean across `metrics`.
    pub fn bounds(&self, metrics: &[Metric]) -> Option<(f64, f64)> {
        self.points
            .iter()
            .flat_map(|p| metrics.iter().filter_map(|m| p.get(*m)))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{date, record};
    use crate::data::Department;

    #[test]
    fn test_empty_dataset_has_no_points() {
        let trend = Trend::daily(&Dataset::default());
        assert!(trend.is_empty());
        assert!(trend.bounds(&Metric::TREND).is_none());
    }

    #[test]
    fn test_groups_by_date_in_order() {
        let dataset = Dataset::new(vec![
            record(date(2025, 6, 3), Department::Project, "张明").delay(30),
            record(date(2025, 6, 1), Department::Project, "张明").delay(10),
            record(date(2025, 6, 3), Department::Product, "赵华").delay(20),
        ]);
        let trend = Trend::daily(&dataset);

        assert_eq!(trend.points.len(), 2);
        assert_eq!(trend.points[0].date, date(2025, 6, 1));
        assert_eq!(trend.points[1].count, 2);
        assert_eq!(
            trend.series(Metric::DevDelayDays),
            vec![(date(2025, 6, 1), 10.0), (date(2025, 6, 3), 25.0)]
        );
        assert!(trend.points[0].get(Metric::DeliveryComplianceRate).is_none());
        assert_eq!(trend.bounds(&[Metric::DevDelayDays]), Some((10.0, 25.0)));
    }
}
