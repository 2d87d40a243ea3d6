//! Symptom-based disease prediction backed by a pre-trained ONNX classifier.
//!
//! A free-form symptom list is normalized and encoded into a multi-hot
//! vector over the training vocabulary, classified, decoded to a disease
//! name, and joined with that disease's description and precautions.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use symptom_dx::{
//!     ClassifierError, DiagnosisPipeline, DiseaseDefinition, FeatureVector, LabelId,
//!     PipelineBuilder, SymptomClassifier,
//! };
//!
//! #[derive(Debug)]
//! struct AlwaysFungal;
//!
//! impl SymptomClassifier for AlwaysFungal {
//!     fn predict(&self, _features: &FeatureVector) -> Result<LabelId, ClassifierError> {
//!         Ok(0)
//!     }
//! }
//!
//! let context = PipelineBuilder::new()
//!     .with_vocabulary(vec!["itching", "skin_rash"])?
//!     .with_labels(vec!["Fungal infection"])?
//!     .with_classifier(AlwaysFungal)
//!     .add_disease(
//!         DiseaseDefinition::new("Fungal infection")
//!             .with_description("A fungal infection is...")
//!             .with_precautions(vec![Some("bath twice a day"), Some("use dettol")])
//!     )?
//!     .build()?;
//!
//! let pipeline = DiagnosisPipeline::new(context);
//! let prediction = pipeline.assemble(&["Itching", "skin rash"])?;
//! assert_eq!(prediction.disease, "Fungal infection");
//! # Ok(())
//! # }
//! ```
//!
//! # Loading an artifact
//!
//! ```no_run
//! use symptom_dx::{DiagnosisPipeline, RuntimeConfig};
//!
//! // Never fails: a broken bundle gives an unavailable pipeline
//! let pipeline = DiagnosisPipeline::load("artifacts/sih", RuntimeConfig::from_env());
//! match pipeline.assemble(&["fever", "cough"]) {
//!     Ok(prediction) => println!("{}", prediction.disease),
//!     Err(err) => println!("{}", err.detail),
//! }
//! ```

pub mod pipeline;
pub mod artifact;
pub mod artifact_store;
mod runtime;
pub mod knowledge;
pub mod insights;
pub mod symptom_log;
pub mod chat;

pub use pipeline::{
    ClassifierError, DiagnosisPipeline, DiseaseDefinition, DiseaseInfo, DiseaseRecord,
    FeatureVector, LabelId, LabelSpace, MetadataTable, ModelState, OnnxClassifier,
    PipelineBuilder, PipelineContext, PipelineInfo, Prediction, PredictionError,
    PredictionErrorKind, SchemaError, SymptomClassifier, Vocabulary, normalize_symptom,
};
pub use artifact::{ArtifactError, ArtifactManifest};
pub use artifact_store::{ArtifactSource, ArtifactStore, StoreError};
pub use runtime::{RuntimeConfig, create_session_builder};
pub use chat::{ChatBot, ChatError, ChatErrorKind, ChatResponse, Intent};

pub fn init_logger() {
    env_logger::init();
}
