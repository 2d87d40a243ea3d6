use std::collections::HashMap;
use ndarray::Array1;

use super::error::SchemaError;

const SECTION: &str = "vocabulary";

/// Normalizes a raw symptom token for vocabulary matching.
///
/// Trims, turns underscores into spaces, collapses runs of whitespace and
/// lowercases. Vocabulary entries go through the same function, so
/// `"  Skin_Rash "` and `"skin rash"` land on the same position.
pub fn normalize_symptom(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The ordered set of symptom names the encoder recognizes.
///
/// Position `i` of every [`FeatureVector`] corresponds to `names()[i]`.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary from raw names, keeping their order.
    ///
    /// Fails if the list is empty, an entry is blank, or two entries collide
    /// after normalization.
    pub(crate) fn new(raw_names: &[impl AsRef<str>]) -> Result<Self, SchemaError> {
        if raw_names.is_empty() {
            return Err(SchemaError::Empty { section: SECTION });
        }
        let mut names = Vec::with_capacity(raw_names.len());
        let mut positions = HashMap::with_capacity(raw_names.len());

        for raw in raw_names {
            let name = normalize_symptom(raw.as_ref());
            if name.is_empty() {
                return Err(SchemaError::BlankEntry { section: SECTION, position: names.len() });
            }
            if positions.insert(name.clone(), names.len()).is_some() {
                return Err(SchemaError::DuplicateEntry { section: SECTION, name });
            }
            names.push(name);
        }

        Ok(Self { names, positions })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Normalized names in vector order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a symptom after normalization, if known
    pub fn position(&self, symptom: &str) -> Option<usize> {
        self.positions.get(&normalize_symptom(symptom)).copied()
    }

    /// Turns raw symptom tokens into a multi-hot vector.
    ///
    /// Blank and unrecognized tokens are dropped. The result always has
    /// `self.len()` positions, even when every token was dropped.
    pub fn encode(&self, raw_symptoms: &[impl AsRef<str>]) -> FeatureVector {
        let mut values = Array1::<f32>::zeros(self.names.len());
        let mut unrecognized = Vec::new();

        for raw in raw_symptoms {
            let token = normalize_symptom(raw.as_ref());
            if token.is_empty() {
                continue;
            }
            match self.positions.get(&token) {
                Some(&position) => values[position] = 1.0,
                None => unrecognized.push(token),
            }
        }

        FeatureVector { values, unrecognized }
    }
}

/// Fixed-width multi-hot encoding of a symptom list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Array1<f32>,
    unrecognized: Vec<String>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Array1<f32> {
        &self.values
    }

    /// Number of positions set to 1
    pub fn active_count(&self) -> usize {
        self.values.iter().filter(|&&v| v > 0.0).count()
    }

    /// True when no vocabulary symptom was recognized
    pub fn is_all_zero(&self) -> bool {
        self.active_count() == 0
    }

    /// Indices of the positions set to 1, ascending
    pub fn active_positions(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Normalized tokens that were dropped because the vocabulary lacks them
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }
}
