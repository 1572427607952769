//! Record builders shared by unit tests.

use chrono::NaiveDate;

use super::record::{Department, Record};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A record with unremarkable metric values that trip no default threshold.
pub fn record(date: NaiveDate, department: Department, owner: &str) -> Record {
    Record {
        date,
        department,
        owner: owner.to_string(),
        dev_delay_days: 0,
        dev_success_rate: 0.9,
        sourcing_compliance_rate: 0.9,
        delivery_compliance_rate: 0.9,
        first_inspection_pass_rate: 0.9,
        second_inspection_pass_rate: 0.9,
        inventory_turnover_days: 60,
        dead_stock_rate: 0.1,
        logistics_delay_days: 0,
    }
}

impl Record {
    pub fn delay(mut self, days: u32) -> Self {
        self.dev_delay_days = days;
        self
    }

    pub fn success(mut self, rate: f64) -> Self {
        self.dev_success_rate = rate;
        self
    }

    pub fn first_pass(mut self, rate: f64) -> Self {
        self.first_inspection_pass_rate = rate;
        self
    }

    pub fn dead_stock(mut self, rate: f64) -> Self {
        self.dead_stock_rate = rate;
        self
    }

    pub fn logistics(mut self, days: u32) -> Self {
        self.logistics_delay_days = days;
        self
    }
}
