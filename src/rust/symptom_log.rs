use std::collections::HashMap;
use std::sync::RwLock;

use crate::knowledge::recommendation_for;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SymptomLogError {
    #[error("No symptoms found for user '{0}'")]
    NoSymptoms(String),
    #[error("User id cannot be empty")]
    EmptyUserId,
}

/// In-memory record of the latest symptoms each user reported.
///
/// Nothing survives a restart.
#[derive(Debug, Default)]
pub struct SymptomLog {
    entries: RwLock<HashMap<String, Vec<String>>>,
}

impl SymptomLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `symptoms` for `user_id`, replacing any earlier log.
    pub fn log(&self, user_id: &str, symptoms: Vec<String>) -> Result<(), SymptomLogError> {
        if user_id.trim().is_empty() {
            return Err(SymptomLogError::EmptyUserId);
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(user_id.to_string(), symptoms);
        log::debug!("Logged symptoms for user '{}'", user_id);
        Ok(())
    }

    pub fn symptoms(&self, user_id: &str) -> Option<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(user_id).cloned()
    }

    /// One `"{symptom}: {recommendation}"` line per logged symptom, in the
    /// order they were logged.
    pub fn recommendations(&self, user_id: &str) -> Result<Vec<String>, SymptomLogError> {
        let symptoms = self
            .symptoms(user_id)
            .ok_or_else(|| SymptomLogError::NoSymptoms(user_id.to_string()))?;

        Ok(symptoms
            .iter()
            .map(|symptom| format!("{}: {}", symptom, recommendation_for(symptom)))
            .collect())
    }
}
