use std::fmt;
use serde::Serialize;

use super::labels::LabelId;

/// Errors raised by a [`SymptomClassifier`](super::SymptomClassifier) implementation.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The feature vector width does not match the width the model was loaded for
    #[error("Feature vector has {actual} positions, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    /// The runtime failed while preparing inputs or running the model
    #[error("Inference error: {0}")]
    Inference(String),
    /// The model ran but produced no label
    #[error("Model produced no label output")]
    EmptyOutput,
}

impl From<ort::Error> for ClassifierError {
    fn from(err: ort::Error) -> Self {
        ClassifierError::Inference(err.to_string())
    }
}

/// Structural problems in a vocabulary or label space.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{section} is empty")]
    Empty { section: &'static str },
    #[error("{section} entry at position {position} is blank")]
    BlankEntry { section: &'static str, position: usize },
    #[error("{section} entry '{name}' appears more than once")]
    DuplicateEntry { section: &'static str, name: String },
}

/// The three ways a prediction request can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PredictionErrorKind {
    /// No artifact is loaded; the encoder and classifier are never reached
    ModelUnavailable,
    /// The classifier emitted an id outside the label space
    UnknownLabel,
    /// Vector transform or classification failed
    PredictionFailed,
}

impl PredictionErrorKind {
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable)
    }

    /// The fixed user-facing message for this kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ModelUnavailable => "Machine learning model is not available.",
            Self::UnknownLabel => "The model returned a result that could not be interpreted.",
            Self::PredictionFailed => "Prediction failed. Some symptoms may not be recognized.",
        }
    }
}

impl fmt::Display for PredictionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ModelUnavailable => "ModelUnavailable",
            Self::UnknownLabel => "UnknownLabel",
            Self::PredictionFailed => "PredictionFailed",
        };
        f.write_str(name)
    }
}

/// Structured error returned by the assembler.
///
/// `detail` is the user-facing text and is what gets serialized. The underlying
/// cause is kept in `cause` for logs and is never sent to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct PredictionError {
    pub kind: PredictionErrorKind,
    pub detail: String,
    #[serde(skip)]
    pub cause: Option<String>,
}

impl PredictionError {
    pub fn new(kind: PredictionErrorKind, cause: Option<String>) -> Self {
        Self {
            kind,
            detail: kind.user_message().to_string(),
            cause,
        }
    }

    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        Self::new(PredictionErrorKind::ModelUnavailable, Some(reason.into()))
    }

    pub fn unknown_label(id: LabelId, label_count: usize) -> Self {
        Self::new(
            PredictionErrorKind::UnknownLabel,
            Some(format!("label id {} is outside the trained label space 0..{}", id, label_count)),
        )
    }

    pub fn prediction_failed(cause: impl Into<String>) -> Self {
        Self::new(PredictionErrorKind::PredictionFailed, Some(cause.into()))
    }
}

impl From<ClassifierError> for PredictionError {
    fn from(err: ClassifierError) -> Self {
        PredictionError::prediction_failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_is_not_serialized() {
        let err = PredictionError::prediction_failed("shape (1, 3) vs (1, 132)");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "PredictionFailed");
        assert_eq!(json["detail"], PredictionErrorKind::PredictionFailed.user_message());
        assert!(json.get("cause").is_none());
        assert_eq!(err.cause.as_deref(), Some("shape (1, 3) vs (1, 132)"));
    }

    #[test]
    fn test_schema_error_messages() {
        let err = SchemaError::DuplicateEntry { section: "vocabulary", name: "skin rash".into() };
        assert_eq!(err.to_string(), "vocabulary entry 'skin rash' appears more than once");
        let err = SchemaError::BlankEntry { section: "labels", position: 2 };
        assert_eq!(err.to_string(), "labels entry at position 2 is blank");
    }

    #[test]
    fn test_classifier_error_maps_to_prediction_failed() {
        let err: PredictionError = ClassifierError::ShapeMismatch { expected: 4, actual: 2 }.into();
        assert_eq!(err.kind, PredictionErrorKind::PredictionFailed);
        assert!(err.cause.unwrap().contains("expects 4"));
    }
}
