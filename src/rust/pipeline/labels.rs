use std::collections::HashSet;

use super::error::{PredictionError, SchemaError};

const SECTION: &str = "labels";

/// Integer id emitted by the classifier. Matches the int64 label output of
/// sklearn-exported ONNX models.
pub type LabelId = i64;

/// The disease names the classifier was trained to emit, indexed by label id.
#[derive(Debug, Clone)]
pub struct LabelSpace {
    names: Vec<String>,
}

impl LabelSpace {
    pub(crate) fn new(names: Vec<String>) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::Empty { section: SECTION });
        }
        let mut seen = HashSet::with_capacity(names.len());
        for (id, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SchemaError::BlankEntry { section: SECTION, position: id });
            }
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateEntry { section: SECTION, name: name.clone() });
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Maps a label id back to its disease name.
    ///
    /// Ids outside `0..len()` fail with `UnknownLabel`; no placeholder name is
    /// ever returned.
    pub fn decode(&self, id: LabelId) -> Result<&str, PredictionError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.names.get(index))
            .map(String::as_str)
            .ok_or_else(|| PredictionError::unknown_label(id, self.names.len()))
    }

    /// Reverse lookup, used when wiring test classifiers
    pub fn id_of(&self, name: &str) -> Option<LabelId> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|index| LabelId::try_from(index).ok())
    }
}
