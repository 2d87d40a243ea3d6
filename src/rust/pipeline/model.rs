use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use log::{info, error};

use super::encoder::FeatureVector;
use super::error::ClassifierError;
use super::labels::LabelId;
use crate::artifact::ArtifactError;
use crate::runtime::{RuntimeConfig, create_session_builder};

/// A pre-trained model mapping a multi-hot symptom vector to a label id.
///
/// Implementations must be deterministic and free of per-call state so a
/// single instance can serve concurrent requests.
pub trait SymptomClassifier: Send + Sync + fmt::Debug {
    fn predict(&self, features: &FeatureVector) -> Result<LabelId, ClassifierError>;
}

/// Classifier backed by an ONNX model exported from a trained estimator.
///
/// The model is expected to:
/// - Accept one float32 input of shape [1, feature_count]
/// - Emit the predicted label as an int64 tensor in its first output
#[derive(Debug)]
pub struct OnnxClassifier {
    model_path: PathBuf,
    session: Session,
    input_name: String,
    feature_count: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxClassifier>();
    }
};

impl OnnxClassifier {
    /// Loads the model file and checks its input/output structure.
    ///
    /// # Arguments
    /// * `model_path` - Path to the `.onnx` file
    /// * `feature_count` - Vocabulary size the model was trained on
    /// * `config` - ONNX Runtime session settings
    pub fn load(
        model_path: &Path,
        feature_count: usize,
        config: &RuntimeConfig,
    ) -> Result<Self, ArtifactError> {
        if !model_path.exists() {
            return Err(ArtifactError::Invalid(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        let session = create_session_builder(config)?
            .commit_from_file(model_path)
            .map_err(|e| {
                error!("Failed to load ONNX model from {:?}: {}", model_path, e);
                ArtifactError::Runtime(e)
            })?;

        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        let input_name = session.inputs[0].name.clone();
        Ok(Self {
            model_path: model_path.to_path_buf(),
            session,
            input_name,
            feature_count,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn validate_model(session: &Session) -> Result<(), ArtifactError> {
        if session.inputs.is_empty() {
            return Err(ArtifactError::Invalid(
                "Model must have 1 input for the symptom vector, found none".to_string(),
            ));
        }
        if session.outputs.is_empty() {
            return Err(ArtifactError::Invalid(
                "Model must have at least 1 output for the predicted label".to_string(),
            ));
        }
        Ok(())
    }
}

impl SymptomClassifier for OnnxClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<LabelId, ClassifierError> {
        if features.len() != self.feature_count {
            return Err(ClassifierError::ShapeMismatch {
                expected: self.feature_count,
                actual: features.len(),
            });
        }

        let input_array = Array2::from_shape_vec((1, features.len()), features.values().to_vec())
            .map_err(|e| ClassifierError::Inference(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(self.input_name.as_str(), Tensor::from_array(&input)
            .map_err(|e| ClassifierError::Inference(format!("Failed to create input tensor: {}", e)))?);

        let outputs = self.session.run(input_tensors)
            .map_err(|e| ClassifierError::Inference(format!("Failed to run model: {}", e)))?;
        let labels = outputs[0].try_extract_tensor::<i64>()
            .map_err(|e| ClassifierError::Inference(format!("Failed to extract label tensor: {}", e)))?;

        labels.iter().next().copied().ok_or(ClassifierError::EmptyOutput)
    }
}
