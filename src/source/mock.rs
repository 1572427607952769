//! Seeded synthetic record generator.
//!
//! Stands in for a real data feed. Values are drawn from fixed per-metric
//! distributions so that dashboards look plausible and alerts fire at
//! realistic rates under the default thresholds.

use anyhow::Result;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::DataProvider;
use crate::data::{DateRange, Department, Record};

/// Records generated per fetch unless configured otherwise.
pub const DEFAULT_RECORD_COUNT: usize = 500;

/// Owners records are assigned to.
pub const DEFAULT_OWNERS: [&str; 5] = ["张明", "李燕燕", "啊飞", "赵华", "刘伟"];

/// A provider that generates random records for any requested range.
///
/// Every fetch reseeds from the configured seed, so the same seed and range
/// always yield the same records.
#[derive(Debug, Clone)]
pub struct MockProvider {
    seed: u64,
    count: usize,
    description: String,
}

impl MockProvider {
    /// Create a generator producing [`DEFAULT_RECORD_COUNT`] records per fetch.
    pub fn new(seed: u64) -> Self {
        Self::with_count(seed, DEFAULT_RECORD_COUNT)
    }

    /// Create a generator producing `count` records per fetch.
    pub fn with_count(seed: u64, count: usize) -> Self {
        Self {
            seed,
            count,
            description: format!("mock: seed {} ({} records)", seed, count),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn generate_record(rng: &mut ChaCha8Rng, days: &[chrono::NaiveDate]) -> Record {
        Record {
            date: days[rng.gen_range(0..days.len())],
            department: Department::ALL[rng.gen_range(0..Department::ALL.len())],
            owner: DEFAULT_OWNERS[rng.gen_range(0..DEFAULT_OWNERS.len())].to_string(),
            dev_delay_days: rng.gen_range(0..60),
            dev_success_rate: rng.gen_range(0.5..1.0),
            sourcing_compliance_rate: rng.gen_range(0.6..0.95),
            delivery_compliance_rate: rng.gen_range(0.7..0.98),
            first_inspection_pass_rate: rng.gen_range(0.7..0.97),
            second_inspection_pass_rate: rng.gen_range(0.75..0.99),
            inventory_turnover_days: rng.gen_range(30..180),
            dead_stock_rate: rng.gen_range(0.05..0.35),
            logistics_delay_days: rng.gen_range(0..15),
        }
    }
}

impl DataProvider for MockProvider {
    fn fetch(&mut self, range: &DateRange) -> Result<Vec<Record>> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let days: Vec<_> = range.iter_days().collect();

        let records: Vec<Record> =
            (0..self.count).map(|_| Self::generate_record(&mut rng, &days)).collect();

        debug!(seed = self.seed, %range, records = records.len(), "generated mock records");
        Ok(records)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::months_ending(NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(), 6)
    }

    #[test]
    fn test_mock_provider_description() {
        let provider = MockProvider::with_count(7, 20);
        assert_eq!(provider.description(), "mock: seed 7 (20 records)");
        assert_eq!(provider.seed(), 7);
    }

    #[test]
    fn test_same_seed_same_records() {
        let a = MockProvider::new(42).fetch(&range()).unwrap();
        let b = MockProvider::new(42).fetch(&range()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_RECORD_COUNT);

        let c = MockProvider::new(43).fetch(&range()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_repeated_fetch_is_stable() {
        let mut provider = MockProvider::with_count(1, 50);
        assert_eq!(provider.fetch(&range()).unwrap(), provider.fetch(&range()).unwrap());
    }

    #[test]
    fn test_records_respect_range_and_distributions() {
        let range = range();
        let records = MockProvider::with_count(9, 1000).fetch(&range).unwrap();

        for r in &records {
            assert!(range.contains(r.date));
            assert!(DEFAULT_OWNERS.contains(&r.owner.as_str()));
            assert!(r.dev_delay_days < 60);
            assert!((0.5..1.0).contains(&r.dev_success_rate));
            assert!((0.6..0.95).contains(&r.sourcing_compliance_rate));
            assert!((0.7..0.98).contains(&r.delivery_compliance_rate));
            assert!((0.7..0.97).contains(&r.first_inspection_pass_rate));
            assert!((0.75..0.99).contains(&r.second_inspection_pass_rate));
            assert!((30..180).contains(&r.inventory_turnover_days));
            assert!((0.05..0.35).contains(&r.dead_stock_rate));
            assert!(r.logistics_delay_days < 15);
        }
    }

    #[test]
    fn test_single_day_range() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let range = DateRange::new(day, day).unwrap();
        let records = MockProvider::with_count(3, 10).fetch(&range).unwrap();
        assert!(records.iter().all(|r| r.date == day));
    }
}
