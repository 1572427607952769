//! Threshold configuration and alert evaluation.
//!
//! Alerts are produced fresh from a [`KpiSummary`] every time the dashboard
//! recomputes; nothing here holds state between evaluations.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::kpi::{Kpi, KpiSummary};
use crate::error::DashboardError;

/// Operator-chosen alert thresholds.
///
/// Each threshold has a fixed range the operator may choose from. Values
/// built through [`Thresholds::new`] are validated; the `adjust_*` methods
/// clamp instead, like a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Average development delay, in days, above which an alert fires.
    pub delay_days: u32,
    /// Pass/success rate percentage below which an alert fires.
    pub quality_pct: u32,
    /// Dead-stock rate percentage above which an alert fires.
    pub inventory_pct: u32,
}

impl Thresholds {
    pub const DELAY_DAYS_RANGE: RangeInclusive<u32> = 7..=30;
    pub const QUALITY_PCT_RANGE: RangeInclusive<u32> = 70..=95;
    pub const INVENTORY_PCT_RANGE: RangeInclusive<u32> = 5..=30;

    /// Create validated thresholds.
    pub fn new(delay_days: u32, quality_pct: u32, inventory_pct: u32) -> Result<Self, DashboardError> {
        let thresholds = Self {
            delay_days,
            quality_pct,
            inventory_pct,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check every threshold against its allowed range.
    pub fn validate(&self) -> Result<(), DashboardError> {
        check_range("delay days", self.delay_days, Self::DELAY_DAYS_RANGE)?;
        check_range("quality", self.quality_pct, Self::QUALITY_PCT_RANGE)?;
        check_range("inventory", self.inventory_pct, Self::INVENTORY_PCT_RANGE)?;
        Ok(())
    }

    /// Thresholds with the delay moved by `delta` days, clamped to its range.
    pub fn adjust_delay(self, delta: i32) -> Self {
        Self {
            delay_days: step(self.delay_days, delta, Self::DELAY_DAYS_RANGE),
            ..self
        }
    }

    /// Thresholds with the quality percentage moved by `delta`, clamped.
    pub fn adjust_quality(self, delta: i32) -> Self {
        Self {
            quality_pct: step(self.quality_pct, delta, Self::QUALITY_PCT_RANGE),
            ..self
        }
    }

    /// Thresholds with the inventory percentage moved by `delta`, clamped.
    pub fn adjust_inventory(self, delta: i32) -> Self {
        Self {
            inventory_pct: step(self.inventory_pct, delta, Self::INVENTORY_PCT_RANGE),
            ..self
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            delay_days: 15,
            quality_pct: 85,
            inventory_pct: 15,
        }
    }
}

fn check_range(name: &'static str, value: u32, range: RangeInclusive<u32>) -> Result<(), DashboardError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(DashboardError::ThresholdOutOfRange {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

fn step(value: u32, delta: i32, range: RangeInclusive<u32>) -> u32 {
    let moved = i64::from(value) + i64::from(delta);
    moved.clamp(i64::from(*range.start()), i64::from(*range.end())) as u32
}

/// Alert severity, also used for KPI tile colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl Severity {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARN",
            Severity::Critical => "CRIT",
        }
    }

    /// Message prefix used in rendered alert text.
    pub fn marker(&self) -> &'static str {
        match self {
            Severity::Ok => "✅",
            Severity::Warning => "⚠️",
            Severity::Critical => "🚨",
        }
    }
}

/// Which of the four threshold checks an alert came from.
///
/// Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AlertKind {
    DelayOverThreshold,
    SuccessRateBelowThreshold,
    FirstPassRateBelowThreshold,
    DeadStockOverThreshold,
}

impl AlertKind {
    pub fn kpi(&self) -> Kpi {
        match self {
            AlertKind::DelayOverThreshold => Kpi::AvgDevDelayDays,
            AlertKind::SuccessRateBelowThreshold => Kpi::DevSuccessRate,
            AlertKind::FirstPassRateBelowThreshold => Kpi::FirstInspectionPassRate,
            AlertKind::DeadStockOverThreshold => Kpi::DeadStockRate,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AlertKind::DelayOverThreshold | AlertKind::DeadStockOverThreshold => Severity::Critical,
            AlertKind::SuccessRateBelowThreshold | AlertKind::FirstPassRateBelowThreshold => {
                Severity::Warning
            }
        }
    }
}

/// A threshold breach.
///
/// `value` is in display units: days for the delay check, percent for the
/// rate checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub value: f64,
    pub threshold: u32,
}

impl Alert {
    fn new(kind: AlertKind, value: f64, threshold: u32) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            value,
            threshold,
        }
    }

    /// Alert text without the severity marker.
    pub fn message(&self) -> String {
        let label = self.kind.kpi().label();
        match self.kind {
            AlertKind::DelayOverThreshold => {
                format!("{}({:.1}天)超过阈值({}天)", label, self.value, self.threshold)
            }
            AlertKind::SuccessRateBelowThreshold | AlertKind::FirstPassRateBelowThreshold => {
                format!("{}({:.1}%)低于阈值({}%)", label, self.value, self.threshold)
            }
            AlertKind::DeadStockOverThreshold => {
                format!("{}({:.1}%)超过阈值({}%)", label, self.value, self.threshold)
            }
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.marker(), self.message())
    }
}

/// Evaluate the four threshold checks in their fixed order.
///
/// Each check yields at most one alert. Comparisons are strict, so a KPI
/// exactly at its threshold never alerts.
pub fn evaluate_alerts(kpis: &KpiSummary, thresholds: &Thresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let delay = kpis.get(Kpi::AvgDevDelayDays);
    if delay > f64::from(thresholds.delay_days) {
        alerts.push(Alert::new(AlertKind::DelayOverThreshold, delay, thresholds.delay_days));
    }

    let success_pct = kpis.get(Kpi::DevSuccessRate) * 100.0;
    if success_pct < f64::from(thresholds.quality_pct) {
        alerts.push(Alert::new(
            AlertKind::SuccessRateBelowThreshold,
            success_pct,
            thresholds.quality_pct,
        ));
    }

    let first_pass_pct = kpis.get(Kpi::FirstInspectionPassRate) * 100.0;
    if first_pass_pct < f64::from(thresholds.quality_pct) {
        alerts.push(Alert::new(
            AlertKind::FirstPassRateBelowThreshold,
            first_pass_pct,
            thresholds.quality_pct,
        ));
    }

    let dead_stock_pct = kpis.get(Kpi::DeadStockRate) * 100.0;
    if dead_stock_pct > f64::from(thresholds.inventory_pct) {
        alerts.push(Alert::new(
            AlertKind::DeadStockOverThreshold,
            dead_stock_pct,
            thresholds.inventory_pct,
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{date, record};
    use crate::data::{compute_kpis, Dataset, Department};

    fn kpis_for(records: Vec<crate::data::Record>) -> KpiSummary {
        compute_kpis(&Dataset::new(records)).unwrap()
    }

    fn thresholds(delay: u32, quality: u32, inventory: u32) -> Thresholds {
        Thresholds::new(delay, quality, inventory).unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let t = Thresholds::default();
        assert_eq!((t.delay_days, t.quality_pct, t.inventory_pct), (15, 85, 15));
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_thresholds_are_rejected() {
        assert!(Thresholds::new(6, 85, 15).is_err());
        assert!(Thresholds::new(31, 85, 15).is_err());
        assert!(Thresholds::new(15, 69, 15).is_err());
        assert!(Thresholds::new(15, 96, 15).is_err());
        assert!(Thresholds::new(15, 85, 4).is_err());
        assert_eq!(
            Thresholds::new(15, 85, 31),
            Err(DashboardError::ThresholdOutOfRange {
                name: "inventory",
                value: 31,
                min: 5,
                max: 30,
            })
        );
        assert!(Thresholds::new(7, 95, 30).is_ok());
    }

    #[test]
    fn test_adjust_clamps() {
        let t = Thresholds::default();
        assert_eq!(t.adjust_delay(100).delay_days, 30);
        assert_eq!(t.adjust_delay(-100).delay_days, 7);
        assert_eq!(t.adjust_quality(1).quality_pct, 86);
        assert_eq!(t.adjust_inventory(-20).inventory_pct, 5);
    }

    #[test]
    fn test_delay_scenario() {
        let kpis = kpis_for(vec![
            record(date(2025, 6, 1), Department::Project, "张明").delay(5),
            record(date(2025, 6, 2), Department::Project, "张明").delay(10),
            record(date(2025, 6, 3), Department::Project, "张明").delay(40),
        ]);
        let alerts = evaluate_alerts(&kpis, &thresholds(15, 85, 15));
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.kind, AlertKind::DelayOverThreshold);
        assert_eq!(alert.severity, Severity::Critical);
        let message = alert.message();
        assert!(message.contains("18.3"), "{}", message);
        assert!(message.contains("15"), "{}", message);
        assert_eq!(message, "新品平均延迟天数(18.3天)超过阈值(15天)");
        assert_eq!(alert.to_string(), "🚨 新品平均延迟天数(18.3天)超过阈值(15天)");
    }

    #[test]
    fn test_first_pass_scenario() {
        let kpis = kpis_for(vec![
            record(date(2025, 6, 1), Department::Quality, "赵华").first_pass(0.75),
            record(date(2025, 6, 1), Department::Quality, "赵华").first_pass(0.85),
        ]);

        let alerts = evaluate_alerts(&kpis, &thresholds(15, 85, 15));
        let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::FirstPassRateBelowThreshold]);
        assert_eq!(alerts[0].message(), "一验合格率(80.0%)低于阈值(85%)");

        assert!(evaluate_alerts(&kpis, &thresholds(15, 75, 15)).is_empty());
    }

    #[test]
    fn test_equal_to_threshold_never_alerts() {
        // 0.75 and 0.25 scale to exactly 75.0 and 25.0
        let exact = kpis_for(vec![record(date(2025, 6, 1), Department::Data, "刘伟")
            .delay(20)
            .success(0.75)
            .first_pass(0.75)
            .dead_stock(0.25)]);
        let t = Thresholds {
            delay_days: 20,
            quality_pct: 75,
            inventory_pct: 25,
        };
        assert!(evaluate_alerts(&exact, &t).is_empty());
    }

    #[test]
    fn test_all_alerts_in_fixed_order() {
        let kpis = kpis_for(vec![record(date(2025, 6, 1), Department::Warehouse, "啊飞")
            .delay(30)
            .success(0.5)
            .first_pass(0.6)
            .dead_stock(0.3)]);
        let t = Thresholds::default();

        let first = evaluate_alerts(&kpis, &t);
        let kinds: Vec<_> = first.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::DelayOverThreshold,
                AlertKind::SuccessRateBelowThreshold,
                AlertKind::FirstPassRateBelowThreshold,
                AlertKind::DeadStockOverThreshold,
            ]
        );
        assert_eq!(first, evaluate_alerts(&kpis, &t));
        assert_eq!(first[1].message(), "新品开发成功率(50.0%)低于阈值(85%)");
        assert_eq!(first[3].message(), "滞销库存率(30.0%)超过阈值(15%)");
        assert_eq!(first[1].to_string(), "⚠️ 新品开发成功率(50.0%)低于阈值(85%)");
    }
}
