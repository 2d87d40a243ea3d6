use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Description used when a disease has no metadata or no description text
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

/// Number of precaution slots a record carries
pub const PRECAUTION_SLOTS: usize = 4;

/// Metadata for one disease as stored in the artifact table.
///
/// Field names follow the table columns the classifier was trained alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Precaution_1", default)]
    pub precaution_1: Option<String>,
    #[serde(rename = "Precaution_2", default)]
    pub precaution_2: Option<String>,
    #[serde(rename = "Precaution_3", default)]
    pub precaution_3: Option<String>,
    #[serde(rename = "Precaution_4", default)]
    pub precaution_4: Option<String>,
}

impl DiseaseRecord {
    pub fn from_slots(description: Option<String>, slots: [Option<String>; PRECAUTION_SLOTS]) -> Self {
        let [precaution_1, precaution_2, precaution_3, precaution_4] = slots;
        Self {
            description,
            precaution_1,
            precaution_2,
            precaution_3,
            precaution_4,
        }
    }

    /// The precaution slots in order, including missing ones
    pub fn slots(&self) -> [Option<&str>; PRECAUTION_SLOTS] {
        [
            self.precaution_1.as_deref(),
            self.precaution_2.as_deref(),
            self.precaution_3.as_deref(),
            self.precaution_4.as_deref(),
        ]
    }
}

/// Description and precautions resolved for one disease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseInfo {
    pub description: String,
    pub precautions: Vec<String>,
}

impl Default for DiseaseInfo {
    fn default() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            precautions: Vec::new(),
        }
    }
}

/// Read-only table of disease metadata keyed by disease name.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    records: HashMap<String, DiseaseRecord>,
}

impl MetadataTable {
    pub fn new(records: HashMap<String, DiseaseRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn record(&self, name: &str) -> Option<&DiseaseRecord> {
        self.records.get(name)
    }

    /// Resolves the description and precautions for a disease.
    ///
    /// A disease missing from the table is not an error: it gets the default
    /// description and no precautions. Missing or blank slots are skipped and
    /// the remaining precautions keep their slot order.
    pub fn lookup(&self, name: &str) -> DiseaseInfo {
        let Some(record) = self.records.get(name) else {
            return DiseaseInfo::default();
        };

        let description = record
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string();

        let precautions = record
            .slots()
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        DiseaseInfo { description, precautions }
    }
}
