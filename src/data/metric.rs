//! The numeric metrics carried by every record.

use serde::Serialize;

use super::record::Record;

/// One of the nine numeric fields of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Metric {
    DevDelayDays,
    DevSuccessRate,
    SourcingComplianceRate,
    DeliveryComplianceRate,
    FirstInspectionPassRate,
    SecondInspectionPassRate,
    InventoryTurnoverDays,
    DeadStockRate,
    LogisticsDelayDays,
}

impl Metric {
    /// All metrics in column order.
    pub const ALL: [Metric; 9] = [
        Metric::DevDelayDays,
        Metric::DevSuccessRate,
        Metric::SourcingComplianceRate,
        Metric::DeliveryComplianceRate,
        Metric::FirstInspectionPassRate,
        Metric::SecondInspectionPassRate,
        Metric::InventoryTurnoverDays,
        Metric::DeadStockRate,
        Metric::LogisticsDelayDays,
    ];

    /// Metrics plotted over time (everything except delivery compliance).
    pub const TREND: [Metric; 8] = [
        Metric::DevDelayDays,
        Metric::DevSuccessRate,
        Metric::SourcingComplianceRate,
        Metric::FirstInspectionPassRate,
        Metric::SecondInspectionPassRate,
        Metric::InventoryTurnoverDays,
        Metric::DeadStockRate,
        Metric::LogisticsDelayDays,
    ];

    /// Read this metric from a record.
    pub fn value(&self, record: &Record) -> f64 {
        match self {
            Metric::DevDelayDays => f64::from(record.dev_delay_days),
            Metric::DevSuccessRate => record.dev_success_rate,
            Metric::SourcingComplianceRate => record.sourcing_compliance_rate,
            Metric::DeliveryComplianceRate => record.delivery_compliance_rate,
            Metric::FirstInspectionPassRate => record.first_inspection_pass_rate,
            Metric::SecondInspectionPassRate => record.second_inspection_pass_rate,
            Metric::InventoryTurnoverDays => f64::from(record.inventory_turnover_days),
            Metric::DeadStockRate => record.dead_stock_rate,
            Metric::LogisticsDelayDays => f64::from(record.logistics_delay_days),
        }
    }

    /// Column label, as used in exports and chart legends.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::DevDelayDays => "新品开发延迟天数",
            Metric::DevSuccessRate => "新品开发成功率",
            Metric::SourcingComplianceRate => "寻源周期达标率",
            Metric::DeliveryComplianceRate => "交期达标率",
            Metric::FirstInspectionPassRate => "一验合格率",
            Metric::SecondInspectionPassRate => "二验合格率",
            Metric::InventoryTurnoverDays => "库存周转天数",
            Metric::DeadStockRate => "滞销库存率",
            Metric::LogisticsDelayDays => "物流延迟天数",
        }
    }

    /// Whether the metric is a fraction in `0.0..=1.0` (shown as a percentage).
    pub fn is_rate(&self) -> bool {
        !matches!(
            self,
            Metric::DevDelayDays | Metric::InventoryTurnoverDays | Metric::LogisticsDelayDays
        )
    }

    /// Format a value of this metric for display: percentages for rates, days otherwise.
    pub fn format(&self, value: f64) -> String {
        if self.is_rate() {
            format!("{:.1}%", value * 100.0)
        } else {
            format!("{:.1}天", value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_metrics_exclude_delivery() {
        assert!(!Metric::TREND.contains(&Metric::DeliveryComplianceRate));
        assert_eq!(Metric::TREND.len(), 8);
    }

    #[test]
    fn test_format() {
        assert_eq!(Metric::DeadStockRate.format(0.2), "20.0%");
        assert_eq!(Metric::DevDelayDays.format(18.333), "18.3天");
    }

    #[test]
    fn test_rate_classification() {
        let days: Vec<_> = Metric::ALL.iter().filter(|m| !m.is_rate()).collect();
        assert_eq!(
            days,
            vec![
                &Metric::DevDelayDays,
                &Metric::InventoryTurnoverDays,
                &Metric::LogisticsDelayDays
            ]
        );
    }
}
