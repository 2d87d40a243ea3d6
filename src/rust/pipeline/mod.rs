//! Symptom-to-disease prediction: encode, classify, decode, join metadata.

use std::path::PathBuf;

mod error;
mod encoder;
mod labels;
mod metadata;
mod model;
mod assembler;
pub mod builder;

pub use error::{ClassifierError, PredictionError, PredictionErrorKind, SchemaError};
pub use encoder::{FeatureVector, Vocabulary, normalize_symptom};
pub use labels::{LabelId, LabelSpace};
pub use metadata::{DiseaseInfo, DiseaseRecord, MetadataTable, DEFAULT_DESCRIPTION, PRECAUTION_SLOTS};
pub use model::{OnnxClassifier, SymptomClassifier};
pub use assembler::{DiagnosisPipeline, ModelState, PipelineContext, Prediction};
pub use builder::{DiseaseDefinition, PipelineBuilder};

/// Dimensions of a loaded pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInfo {
    /// Artifact directory, if the pipeline was loaded from disk
    pub source: Option<PathBuf>,
    /// Number of symptoms the encoder recognizes
    pub vocabulary_size: usize,
    /// Number of diseases the classifier can emit
    pub label_count: usize,
    /// Number of diseases with a metadata record
    pub metadata_records: usize,
}
