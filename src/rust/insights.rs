//! Life-expectancy statistics from WHO "life expectancy at birth" records.

use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed life expectancy data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sex {
    Male,
    Female,
    Total,
}

/// One row of the WHO export, keyed by its column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeExpectancyRecord {
    #[serde(rename = "GEO_NAME_SHORT")]
    pub country: String,
    #[serde(rename = "DIM_TIME")]
    pub year: i32,
    #[serde(rename = "DIM_SEX")]
    pub sex: Sex,
    #[serde(rename = "AMOUNT_N")]
    pub years: f64,
}

/// Latest-year figures for one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifeExpectancySummary {
    pub country: String,
    pub latest_year: i32,
    pub female: f64,
    pub male: f64,
}

impl LifeExpectancySummary {
    pub fn to_text(&self) -> String {
        format!(
            "Based on data from {}, life expectancy for females in {} is {} years and for males is {} years.",
            self.latest_year, self.country, self.female, self.male
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct LifeExpectancyTable {
    records: Vec<LifeExpectancyRecord>,
}

impl LifeExpectancyTable {
    pub fn new(records: Vec<LifeExpectancyRecord>) -> Self {
        Self { records }
    }

    /// Reads a JSON array of records
    pub fn from_json_path(path: &Path) -> Result<Self, InsightError> {
        let bytes = fs::read(path)?;
        let records: Vec<LifeExpectancyRecord> = serde_json::from_slice(&bytes)?;
        log::info!("Loaded {} life expectancy records from {:?}", records.len(), path);
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Female and male life expectancy for the most recent year on record,
    /// rounded to two decimals.
    ///
    /// Returns `None` if the country has no rows, or if the latest year lacks
    /// either sex.
    pub fn summarize(&self, country: &str) -> Option<LifeExpectancySummary> {
        let rows: Vec<&LifeExpectancyRecord> = self
            .records
            .iter()
            .filter(|r| r.country == country)
            .collect();

        let latest_year = rows.iter().map(|r| r.year).max()?;
        let value_for = |sex: Sex| {
            rows.iter()
                .find(|r| r.year == latest_year && r.sex == sex)
                .map(|r| round2(r.years))
        };

        let female = value_for(Sex::Female);
        let male = value_for(Sex::Male);
        match (female, male) {
            (Some(female), Some(male)) => Some(LifeExpectancySummary {
                country: country.to_string(),
                latest_year,
                female,
                male,
            }),
            _ => {
                log::warn!("No male/female split for {} in {}", country, latest_year);
                None
            }
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, year: i32, sex: Sex, years: f64) -> LifeExpectancyRecord {
        LifeExpectancyRecord { country: country.into(), year, sex, years }
    }

    fn table() -> LifeExpectancyTable {
        LifeExpectancyTable::new(vec![
            record("India", 2019, Sex::Female, 71.8),
            record("India", 2019, Sex::Male, 69.5),
            record("India", 2021, Sex::Female, 68.98765),
            record("India", 2021, Sex::Male, 66.0421),
            record("India", 2021, Sex::Total, 67.3),
            record("Nepal", 2021, Sex::Total, 68.4),
        ])
    }

    #[test]
    fn test_summarize_latest_year() {
        let summary = table().summarize("India").unwrap();
        assert_eq!(summary.latest_year, 2021);
        assert_eq!(summary.female, 68.99);
        assert_eq!(summary.male, 66.04);
        assert_eq!(
            summary.to_text(),
            "Based on data from 2021, life expectancy for females in India is 68.99 years and for males is 66.04 years."
        );
    }

    #[test]
    fn test_missing_country_or_split() {
        assert!(table().summarize("Chile").is_none());
        assert!(table().summarize("Nepal").is_none());
    }

    #[test]
    fn test_parse_who_columns() {
        let records: Vec<LifeExpectancyRecord> = serde_json::from_str(
            r#"[{"GEO_NAME_SHORT": "India", "DIM_TIME": 2000, "DIM_SEX": "FEMALE", "AMOUNT_N": 63.4}]"#,
        )
        .unwrap();
        assert_eq!(records[0], record("India", 2000, Sex::Female, 63.4));
    }
}
