use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::Serialize;
use log::{debug, error, info, warn};

use super::encoder::Vocabulary;
use super::error::PredictionError;
use super::labels::LabelSpace;
use super::metadata::MetadataTable;
use super::model::SymptomClassifier;
use super::builder::PipelineBuilder;
use super::PipelineInfo;
use crate::runtime::RuntimeConfig;

/// A successful prediction, joined with the disease metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    #[serde(rename = "predicted_disease")]
    pub disease: String,
    pub description: String,
    pub precautions: Vec<String>,
}

/// Everything loaded from an artifact, frozen after construction.
///
/// # Thread Safety
///
/// All fields are read-only after [`PipelineBuilder::build`], so one context
/// can be shared across request handlers behind an `Arc` without locking.
#[derive(Debug)]
pub struct PipelineContext {
    pub(crate) source: Option<PathBuf>,
    pub(crate) vocabulary: Vocabulary,
    pub(crate) labels: LabelSpace,
    pub(crate) metadata: MetadataTable,
    pub(crate) classifier: Box<dyn SymptomClassifier>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<PipelineContext>();
        assert_send_sync::<DiagnosisPipeline>();
    }
};

impl PipelineContext {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn labels(&self) -> &LabelSpace {
        &self.labels
    }

    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    /// Runs encode, classify, decode and lookup for one request.
    pub fn assemble(&self, raw_symptoms: &[impl AsRef<str>]) -> Result<Prediction, PredictionError> {
        let features = self.vocabulary.encode(raw_symptoms);
        if features.is_all_zero() {
            warn!(
                "No recognized symptoms in request (dropped: {:?}); prediction will be made on an all-zero vector",
                features.unrecognized()
            );
        } else if !features.unrecognized().is_empty() {
            debug!("Dropped unrecognized symptoms: {:?}", features.unrecognized());
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.classifier.predict(&features)));
        let id = match outcome {
            Ok(Ok(id)) => id,
            Ok(Err(e)) => {
                warn!("Prediction failed: {}", e);
                return Err(e.into());
            }
            Err(payload) => {
                let cause = panic_message(payload.as_ref());
                warn!("Classifier panicked: {}", cause);
                return Err(PredictionError::prediction_failed(cause));
            }
        };

        let disease = self.labels.decode(id).map_err(|e| {
            error!(
                "Classifier emitted label {} outside the trained label space ({} labels); the artifact may be corrupt or mismatched",
                id,
                self.labels.len()
            );
            e
        })?;

        let info = self.metadata.lookup(disease);
        Ok(Prediction {
            disease: disease.to_string(),
            description: info.description,
            precautions: info.precautions,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "classifier panicked".to_string()
    }
}

/// Whether the prediction path can serve requests.
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(Arc<PipelineContext>),
    /// The artifact failed to load or was never loaded
    Unavailable { reason: String },
}

/// The prediction path as seen by request handlers.
///
/// Constructed once at startup. An artifact that fails to load produces an
/// unavailable pipeline instead of an error, so the host keeps running and
/// each request gets a `ModelUnavailable` result.
#[derive(Debug, Clone)]
pub struct DiagnosisPipeline {
    state: ModelState,
}

impl DiagnosisPipeline {
    pub fn new(context: PipelineContext) -> Self {
        Self::from_shared(Arc::new(context))
    }

    pub fn from_shared(context: Arc<PipelineContext>) -> Self {
        Self { state: ModelState::Ready(context) }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::Unavailable { reason: reason.into() },
        }
    }

    /// Loads an artifact bundle, turning any failure into the unavailable state.
    pub fn load(dir: impl AsRef<Path>, config: RuntimeConfig) -> Self {
        let dir = dir.as_ref();
        let built = PipelineBuilder::new()
            .with_runtime_config(config)
            .with_artifact(dir)
            .and_then(PipelineBuilder::build);

        match built {
            Ok(context) => {
                info!("Symptom prediction pipeline ready");
                Self::new(context)
            }
            Err(e) => {
                warn!("Could not load artifact from {:?}: {}. Symptom prediction will not work.", dir, e);
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    pub fn context(&self) -> Option<&Arc<PipelineContext>> {
        match &self.state {
            ModelState::Ready(context) => Some(context),
            ModelState::Unavailable { .. } => None,
        }
    }

    /// Predicts a disease from raw symptom tokens.
    ///
    /// When unavailable this returns `ModelUnavailable` straight away; the
    /// vocabulary lives in the context, so nothing is encoded.
    pub fn assemble(&self, raw_symptoms: &[impl AsRef<str>]) -> Result<Prediction, PredictionError> {
        match &self.state {
            ModelState::Ready(context) => context.assemble(raw_symptoms),
            ModelState::Unavailable { reason } => {
                debug!("Prediction requested while model unavailable: {}", reason);
                Err(PredictionError::model_unavailable(reason.clone()))
            }
        }
    }

    /// Reports the loaded artifact's dimensions, or `None` when unavailable
    pub fn info(&self) -> Option<PipelineInfo> {
        self.context().map(|context| PipelineInfo {
            source: context.source.clone(),
            vocabulary_size: context.vocabulary.len(),
            label_count: context.labels.len(),
            metadata_records: context.metadata.len(),
        })
    }
}

impl From<PipelineContext> for DiagnosisPipeline {
    fn from(context: PipelineContext) -> Self {
        Self::new(context)
    }
}
