//! Operational records and the calendar ranges they are fetched for.

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::metric::Metric;
use crate::error::DashboardError;

/// Department that owns a record.
///
/// Serialized and displayed with the department's own name, which is also
/// the value found in exported CSV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "项目部")]
    Project,
    #[serde(rename = "产品部")]
    Product,
    #[serde(rename = "采购部")]
    Purchasing,
    #[serde(rename = "品质部")]
    Quality,
    #[serde(rename = "数据部")]
    Data,
    #[serde(rename = "仓库部")]
    Warehouse,
    #[serde(rename = "物流部")]
    Logistics,
}

impl Department {
    /// All departments in selector order.
    pub const ALL: [Department; 7] = [
        Department::Project,
        Department::Product,
        Department::Purchasing,
        Department::Quality,
        Department::Data,
        Department::Warehouse,
        Department::Logistics,
    ];

    /// Returns the department's display name.
    pub fn name(&self) -> &'static str {
        match self {
            Department::Project => "项目部",
            Department::Product => "产品部",
            Department::Purchasing => "采购部",
            Department::Quality => "品质部",
            Department::Data => "数据部",
            Department::Warehouse => "仓库部",
            Department::Logistics => "物流部",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Department {
    type Err = DashboardError;

    /// Exact, case-sensitive match on the department name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| DashboardError::UnknownDepartment(s.to_string()))
    }
}

/// One observation of a project's operational metrics.
///
/// Field names on the wire are the column headers used in CSV exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "日期")]
    pub date: NaiveDate,
    #[serde(rename = "部门")]
    pub department: Department,
    #[serde(rename = "项目负责人")]
    pub owner: String,
    #[serde(rename = "新品开发延迟天数")]
    pub dev_delay_days: u32,
    #[serde(rename = "新品开发成功率")]
    pub dev_success_rate: f64,
    #[serde(rename = "寻源周期达标率")]
    pub sourcing_compliance_rate: f64,
    #[serde(rename = "交期达标率")]
    pub delivery_compliance_rate: f64,
    #[serde(rename = "一验合格率")]
    pub first_inspection_pass_rate: f64,
    #[serde(rename = "二验合格率")]
    pub second_inspection_pass_rate: f64,
    #[serde(rename = "库存周转天数")]
    pub inventory_turnover_days: u32,
    #[serde(rename = "滞销库存率")]
    pub dead_stock_rate: f64,
    #[serde(rename = "物流延迟天数")]
    pub logistics_delay_days: u32,
}

impl Record {
    /// Reject rate fields that are not finite fractions.
    pub fn check_rates(&self) -> Result<(), DashboardError> {
        for metric in Metric::ALL.into_iter().filter(Metric::is_rate) {
            let value = metric.value(self);
            if !(0.0..=1.0).contains(&value) {
                return Err(DashboardError::RateOutOfRange {
                    metric: metric.label(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Inclusive calendar range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting one whose start is after its end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DashboardError> {
        if start > end {
            return Err(DashboardError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `months`-long range that ends on `end`.
    ///
    /// Month arithmetic clamps to the last day of shorter months.
    pub fn months_ending(end: NaiveDate, months: u32) -> Self {
        let start = end.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` lies within the range, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    /// Iterate over every day of the range in order.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_department_round_trips_its_name() {
        for dept in Department::ALL {
            assert_eq!(dept.name().parse::<Department>().unwrap(), dept);
        }
    }

    #[test]
    fn test_department_parse_is_exact() {
        assert!("项目".parse::<Department>().is_err());
        assert!(" 项目部".parse::<Department>().is_err());
        assert_eq!(
            "sales".parse::<Department>(),
            Err(DashboardError::UnknownDepartment("sales".to_string()))
        );
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        let err = DateRange::new(date(2025, 6, 2), date(2025, 6, 1)).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_date_range_contains_is_inclusive() {
        let range = DateRange::new(date(2025, 6, 1), date(2025, 6, 3)).unwrap();
        assert!(range.contains(date(2025, 6, 1)));
        assert!(range.contains(date(2025, 6, 3)));
        assert!(!range.contains(date(2025, 5, 31)));
        assert!(!range.contains(date(2025, 6, 4)));
        assert_eq!(range.days(), 3);
        assert_eq!(range.iter_days().count(), 3);
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(date(2025, 6, 11), date(2025, 6, 11)).unwrap();
        assert_eq!(range.days(), 1);
        assert_eq!(range.iter_days().collect::<Vec<_>>(), vec![date(2025, 6, 11)]);
    }

    #[test]
    fn test_months_ending() {
        let range = DateRange::months_ending(date(2025, 6, 11), 6);
        assert_eq!(range.start(), date(2024, 12, 11));
        assert_eq!(range.end(), date(2025, 6, 11));

        // Clamped to the end of February
        let range = DateRange::months_ending(date(2025, 3, 31), 1);
        assert_eq!(range.start(), date(2025, 2, 28));
    }

    #[test]
    fn test_check_rates() {
        let mut record = Record {
            date: date(2025, 6, 1),
            department: Department::Quality,
            owner: "赵华".to_string(),
            dev_delay_days: 3,
            dev_success_rate: 1.0,
            sourcing_compliance_rate: 0.8,
            delivery_compliance_rate: 0.9,
            first_inspection_pass_rate: 0.0,
            second_inspection_pass_rate: 0.95,
            inventory_turnover_days: 60,
            dead_stock_rate: 0.1,
            logistics_delay_days: 2,
        };
        assert!(record.check_rates().is_ok());

        record.first_inspection_pass_rate = f64::NAN;
        assert!(matches!(
            record.check_rates(),
            Err(DashboardError::RateOutOfRange { metric: "一验合格率", .. })
        ));

        record.first_inspection_pass_rate = 0.9;
        record.dead_stock_rate = 1.5;
        assert!(record.check_rates().is_err());
    }
}
