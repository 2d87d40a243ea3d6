use std::collections::HashMap;
use std::path::{Path, PathBuf};
use log::{info, warn};

use super::assembler::PipelineContext;
use super::encoder::Vocabulary;
use super::labels::LabelSpace;
use super::metadata::{DiseaseRecord, MetadataTable, PRECAUTION_SLOTS};
use super::model::{OnnxClassifier, SymptomClassifier};
use crate::artifact::{self, ArtifactError, ArtifactManifest};
use crate::runtime::RuntimeConfig;

/// Metadata for one disease, added to a builder by hand
#[derive(Debug, Clone)]
pub struct DiseaseDefinition {
    /// The disease name as the label space spells it
    pub name: String,
    pub description: Option<String>,
    /// Up to four precaution slots; `None` marks an empty slot
    pub precautions: Vec<Option<String>>,
}

impl DiseaseDefinition {
    /// # Example
    /// ```
    /// use symptom_dx::DiseaseDefinition;
    ///
    /// let disease = DiseaseDefinition::new("Fungal infection")
    ///     .with_description("A fungal infection is...")
    ///     .with_precautions(vec![Some("bath twice a day"), Some("use dettol")]);
    /// assert_eq!(disease.precautions.len(), 2);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            precautions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_precautions(mut self, precautions: Vec<Option<impl Into<String>>>) -> Self {
        self.precautions = precautions.into_iter().map(|p| p.map(Into::into)).collect();
        self
    }
}

/// A builder for a [`PipelineContext`], either from an artifact bundle on
/// disk or piece by piece.
#[derive(Default, Debug)]
pub struct PipelineBuilder {
    source: Option<PathBuf>,
    vocabulary: Option<Vec<String>>,
    labels: Option<Vec<String>>,
    metadata: HashMap<String, DiseaseRecord>,
    classifier: Option<Box<dyn SymptomClassifier>>,
    runtime_config: RuntimeConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ONNX Runtime configuration used by [`with_artifact`](Self::with_artifact)
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Loads vocabulary, label space, metadata table and ONNX classifier from
    /// an artifact bundle directory.
    ///
    /// # Returns
    /// An error if:
    /// - The vocabulary or labels are already set
    /// - The manifest is missing or malformed
    /// - The model file is missing, fails its hash check, or fails to load
    /// - The metadata table is malformed
    pub fn with_artifact(mut self, dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        if self.vocabulary.is_some() || self.labels.is_some() {
            return Err(ArtifactError::Invalid("Vocabulary and labels already set".to_string()));
        }

        info!("Loading artifact bundle from {:?}", dir);
        let manifest = ArtifactManifest::load(dir)?;

        let model_path = manifest.model_path(dir);
        if let Some(expected) = &manifest.model_sha256 {
            artifact::verify_file(&model_path, expected)?;
            info!("Model file hash verified");
        }

        let metadata = artifact::load_metadata(&manifest.metadata_path(dir))?;
        let classifier = OnnxClassifier::load(&model_path, manifest.vocabulary.len(), &self.runtime_config)?;

        info!(
            "Artifact '{}' {} loaded: {} symptoms, {} labels, {} metadata records",
            manifest.name,
            manifest.version,
            manifest.vocabulary.len(),
            manifest.labels.len(),
            metadata.len()
        );

        self.source = Some(dir.to_path_buf());
        self.vocabulary = Some(manifest.vocabulary);
        self.labels = Some(manifest.labels);
        self.metadata.extend(metadata);
        self.classifier = Some(Box::new(classifier));
        Ok(self)
    }

    /// Sets the symptom vocabulary in feature-vector order
    pub fn with_vocabulary(mut self, symptoms: Vec<impl Into<String>>) -> Result<Self, ArtifactError> {
        if self.vocabulary.is_some() {
            return Err(ArtifactError::Invalid("Vocabulary already set".to_string()));
        }
        self.vocabulary = Some(symptoms.into_iter().map(Into::into).collect());
        Ok(self)
    }

    /// Sets the label space; the position of each name is its label id
    pub fn with_labels(mut self, labels: Vec<impl Into<String>>) -> Result<Self, ArtifactError> {
        if self.labels.is_some() {
            return Err(ArtifactError::Invalid("Labels already set".to_string()));
        }
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        Ok(self)
    }

    /// Sets the classifier, replacing one loaded from an artifact
    pub fn with_classifier(mut self, classifier: impl SymptomClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Adds a metadata record.
    ///
    /// Fails if the name is empty, already present, or more than four
    /// precaution slots are given.
    pub fn add_disease(mut self, disease: DiseaseDefinition) -> Result<Self, ArtifactError> {
        if disease.name.trim().is_empty() {
            return Err(ArtifactError::Invalid("Disease name cannot be empty".into()));
        }
        if disease.precautions.len() > PRECAUTION_SLOTS {
            return Err(ArtifactError::Invalid(format!(
                "Disease '{}' has {} precautions (max is {})",
                disease.name,
                disease.precautions.len(),
                PRECAUTION_SLOTS
            )));
        }
        if self.metadata.contains_key(&disease.name) {
            return Err(ArtifactError::Invalid(format!(
                "Disease '{}' already has metadata",
                disease.name
            )));
        }

        let mut slots: [Option<String>; PRECAUTION_SLOTS] = Default::default();
        for (slot, precaution) in slots.iter_mut().zip(disease.precautions) {
            *slot = precaution;
        }
        self.metadata.insert(
            disease.name,
            DiseaseRecord::from_slots(disease.description, slots),
        );
        Ok(self)
    }

    /// Validates the pieces and freezes them into a context.
    ///
    /// # Returns
    /// An error if the vocabulary or label space is missing, empty, or has
    /// duplicates, or if no classifier is set.
    pub fn build(self) -> Result<PipelineContext, ArtifactError> {
        let raw_vocabulary = self.vocabulary
            .ok_or_else(|| ArtifactError::Invalid("Vocabulary must be set".to_string()))?;
        let vocabulary = Vocabulary::new(&raw_vocabulary)?;

        let raw_labels = self.labels
            .ok_or_else(|| ArtifactError::Invalid("Labels must be set".to_string()))?;
        let labels = LabelSpace::new(raw_labels)?;

        let classifier = self.classifier
            .ok_or_else(|| ArtifactError::Invalid("No classifier loaded".to_string()))?;

        let missing = labels.names().iter().filter(|name| !self.metadata.contains_key(*name)).count();
        if missing > 0 {
            warn!("{} of {} labels have no metadata record", missing, labels.len());
        }

        Ok(PipelineContext {
            source: self.source,
            vocabulary,
            labels,
            metadata: MetadataTable::new(self.metadata),
            classifier,
        })
    }
}
