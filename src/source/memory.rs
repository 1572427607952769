//! In-memory data provider.

use anyhow::Result;

use super::DataProvider;
use crate::data::{DateRange, Record};

/// A provider over a fixed set of records held in memory.
///
/// Useful for embedding the dashboard in another program, or for feeding
/// known records into the KPI engine.
///
/// # Example
///
/// ```
/// use riskwatch::{DataProvider, StaticProvider};
///
/// let provider = StaticProvider::new(Vec::new(), "empty");
/// assert_eq!(provider.description(), "memory: empty");
/// ```
#[derive(Debug, Clone)]
pub struct StaticProvider {
    records: Vec<Record>,
    description: String,
}

impl StaticProvider {
    pub fn new(records: Vec<Record>, source_description: &str) -> Self {
        Self {
            records,
            description: format!("memory: {}", source_description),
        }
    }

    /// Replace the records served by later fetches.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
    }
}

impl DataProvider for StaticProvider {
    fn fetch(&mut self, range: &DateRange) -> Result<Vec<Record>> {
        Ok(self.records.iter().filter(|r| range.contains(r.date)).cloned().collect())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{date, record};
    use crate::data::Department;

    #[test]
    fn test_static_provider_fetch() {
        let mut provider = StaticProvider::new(
            vec![
                record(date(2025, 6, 1), Department::Data, "刘伟"),
                record(date(2025, 7, 1), Department::Data, "刘伟"),
            ],
            "test",
        );
        let range = DateRange::new(date(2025, 6, 1), date(2025, 6, 30)).unwrap();
        assert_eq!(provider.fetch(&range).unwrap().len(), 1);

        provider.replace(Vec::new());
        assert!(provider.fetch(&range).unwrap().is_empty());
    }
}
