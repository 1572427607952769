//! Ordered record collections and the filters applied to them.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::metric::Metric;
use super::record::{DateRange, Department, Record};
use crate::error::DashboardError;

/// Department selection, with a sentinel meaning "every department".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepartmentFilter {
    #[default]
    All,
    Only(Department),
}

impl DepartmentFilter {
    /// Selector order: `All` first, then each department.
    pub fn options() -> impl Iterator<Item = DepartmentFilter> {
        std::iter::once(DepartmentFilter::All).chain(Department::ALL.map(DepartmentFilter::Only))
    }

    /// Display label; `全部` for the sentinel.
    pub fn label(&self) -> &'static str {
        match self {
            DepartmentFilter::All => "全部",
            DepartmentFilter::Only(d) => d.name(),
        }
    }

    /// Cycle to the next selector option.
    pub fn next(self) -> Self {
        let options: Vec<_> = Self::options().collect();
        let idx = options.iter().position(|o| *o == self).unwrap_or(0);
        options[(idx + 1) % options.len()]
    }

    /// Cycle to the previous selector option.
    pub fn prev(self) -> Self {
        let options: Vec<_> = Self::options().collect();
        let idx = options.iter().position(|o| *o == self).unwrap_or(0);
        options[(idx + options.len() - 1) % options.len()]
    }

    /// Whether a record's department passes this filter.
    pub fn matches(&self, department: Department) -> bool {
        match self {
            DepartmentFilter::All => true,
            DepartmentFilter::Only(d) => *d == department,
        }
    }
}

impl fmt::Display for DepartmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DepartmentFilter {
    type Err = DashboardError;

    /// `ALL` or `全部` select everything; anything else must name a department exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" | "全部" => Ok(DepartmentFilter::All),
            other => other.parse().map(DepartmentFilter::Only),
        }
    }
}

/// An ordered collection of records.
///
/// Duplicates are allowed. Every filter keeps the relative order of the
/// records it retains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    fn filtered(&self, keep: impl Fn(&Record) -> bool) -> Dataset {
        self.records.iter().filter(|r| keep(r)).cloned().collect()
    }

    /// Restrict to one department; identity for [`DepartmentFilter::All`].
    pub fn filter_by_department(&self, filter: &DepartmentFilter) -> Dataset {
        match filter {
            DepartmentFilter::All => self.clone(),
            DepartmentFilter::Only(_) => self.filtered(|r| filter.matches(r.department)),
        }
    }

    /// Restrict to records whose owner matches exactly.
    pub fn filter_by_owner(&self, owner: &str) -> Dataset {
        self.filtered(|r| r.owner == owner)
    }

    /// Restrict to records dated within the range (inclusive).
    pub fn filter_by_date_range(&self, range: &DateRange) -> Dataset {
        self.filtered(|r| range.contains(r.date))
    }

    /// Keep records whose value for `metric` satisfies `predicate`.
    pub fn filter_where(&self, metric: Metric, predicate: impl Fn(f64) -> bool) -> Dataset {
        self.filtered(|r| predicate(metric.value(r)))
    }

    /// Stable sort by `metric` and keep the first `n` records.
    ///
    /// Records with equal values keep their original relative order in
    /// both directions.
    pub fn top_n_by_metric(&self, metric: Metric, n: usize, ascending: bool) -> Dataset {
        let mut sorted = self.records.clone();
        sorted.sort_by(|a, b| {
            let ord = metric.value(a).partial_cmp(&metric.value(b)).unwrap_or(Ordering::Equal);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        sorted.truncate(n);
        Dataset::new(sorted)
    }

    /// The `n` most recent records, newest first; same-day records keep their order.
    pub fn most_recent(&self, n: usize) -> Dataset {
        let mut sorted = self.records.clone();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.truncate(n);
        Dataset::new(sorted)
    }

    /// Distinct owners in order of first appearance.
    pub fn owners(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.owner.as_str()))
            .map(|r| r.owner.clone())
            .collect()
    }

    /// Arithmetic mean of `metric`, or `None` when there are no records.
    pub fn metric_mean(&self, metric: Metric) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(|r| metric.value(r)).sum();
        Some(sum / self.records.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{date, record};

    fn sample() -> Dataset {
        Dataset::new(vec![
            record(date(2025, 6, 1), Department::Project, "张明").delay(5),
            record(date(2025, 6, 2), Department::Quality, "李燕燕").delay(10),
            record(date(2025, 6, 3), Department::Project, "赵华").delay(40),
            record(date(2025, 6, 3), Department::Logistics, "张明").delay(10),
            record(date(2025, 6, 5), Department::Quality, "张明").delay(10),
        ])
    }

    #[test]
    fn test_all_is_identity() {
        let data = sample();
        assert_eq!(data.filter_by_department(&DepartmentFilter::All), data);
    }

    #[test]
    fn test_department_filter_matches_exactly_and_is_idempotent() {
        let data = sample();
        let filter = DepartmentFilter::Only(Department::Quality);
        let once = data.filter_by_department(&filter);
        assert_eq!(once.len(), 2);
        assert!(once.iter().all(|r| r.department == Department::Quality));
        assert_eq!(once.filter_by_department(&filter), once);
    }

    #[test]
    fn test_department_filter_parse() {
        assert_eq!("ALL".parse::<DepartmentFilter>().unwrap(), DepartmentFilter::All);
        assert_eq!("全部".parse::<DepartmentFilter>().unwrap(), DepartmentFilter::All);
        assert_eq!(
            "品质部".parse::<DepartmentFilter>().unwrap(),
            DepartmentFilter::Only(Department::Quality)
        );
        assert!("all".parse::<DepartmentFilter>().is_err());
    }

    #[test]
    fn test_department_filter_cycles_through_all_options() {
        let mut filter = DepartmentFilter::All;
        for _ in 0..8 {
            filter = filter.next();
        }
        assert_eq!(filter, DepartmentFilter::All);
        assert_eq!(DepartmentFilter::All.prev(), DepartmentFilter::Only(Department::Logistics));
    }

    #[test]
    fn test_filter_by_owner() {
        let data = sample();
        let owned = data.filter_by_owner("张明");
        assert_eq!(owned.len(), 3);
        assert!(data.filter_by_owner("张").is_empty());
    }

    #[test]
    fn test_filter_by_date_range() {
        let data = sample();
        let range = DateRange::new(date(2025, 6, 2), date(2025, 6, 3)).unwrap();
        let within = data.filter_by_date_range(&range);
        assert_eq!(within.len(), 3);
        assert!(within.iter().all(|r| range.contains(r.date)));
    }

    #[test]
    fn test_top_n_descending_is_stable() {
        let data = sample();
        let top = data.top_n_by_metric(Metric::DevDelayDays, 3, false);
        let owners: Vec<_> = top.iter().map(|r| (r.dev_delay_days, r.owner.as_str())).collect();
        // Three records tie at 10; the first two in original order follow the 40
        assert_eq!(owners, vec![(40, "赵华"), (10, "李燕燕"), (10, "张明")]);
        assert_eq!(top.records()[2].department, Department::Logistics);
    }

    #[test]
    fn test_top_n_ascending_and_length() {
        let data = sample();
        let top = data.top_n_by_metric(Metric::DevDelayDays, 10, true);
        assert_eq!(top.len(), data.len());
        let values: Vec<_> = top.iter().map(|r| r.dev_delay_days).collect();
        assert_eq!(values, vec![5, 10, 10, 10, 40]);

        assert!(data.top_n_by_metric(Metric::DevDelayDays, 0, true).is_empty());
        assert!(Dataset::default().top_n_by_metric(Metric::DevDelayDays, 3, true).is_empty());
    }

    #[test]
    fn test_most_recent() {
        let data = sample();
        let recent = data.most_recent(3);
        let dates: Vec<_> = recent.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2025, 6, 5), date(2025, 6, 3), date(2025, 6, 3)]);
        assert_eq!(recent.records()[1].owner, "赵华");
    }

    #[test]
    fn test_owners_first_appearance_order() {
        assert_eq!(sample().owners(), vec!["张明", "李燕燕", "赵华"]);
    }

    #[test]
    fn test_metric_mean() {
        let data = sample();
        assert_eq!(data.metric_mean(Metric::DevDelayDays), Some(15.0));
        assert_eq!(Dataset::default().metric_mean(Metric::DevDelayDays), None);
    }
}
