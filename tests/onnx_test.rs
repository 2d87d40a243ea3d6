//! Runs the real ONNX classifier against `tests/fixtures/argmax_5.onnx`.
//!
//! The fixture is a single `ArgMax(axis=1, keepdims=0)` node: float32
//! `features [1, 5]` in, int64 `label [1]` out. The predicted label is the
//! first active symptom position, or 0 for an all-zero vector.

use std::fs;
use std::path::{Path, PathBuf};
use symptom_dx::artifact::{sha256_hex, MANIFEST_FILE};
use symptom_dx::{
    ArtifactManifest, ClassifierError, DiagnosisPipeline, FeatureVector, LabelId, OnnxClassifier,
    PipelineBuilder, PredictionErrorKind, RuntimeConfig, SymptomClassifier,
};

const VOCABULARY: [&str; 5] = ["itching", "skin_rash", "nodal_skin_eruptions", "continuous_sneezing", "shivering"];
const LABELS: [&str; 5] = ["Fungal infection", "Allergy", "GERD", "Chronic cholestasis", "Drug Reaction"];

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/argmax_5.onnx")
}

fn write_bundle(dir: &Path, vocabulary: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
    let model = fs::read(fixture_path())?;
    let manifest = ArtifactManifest {
        name: "argmax".to_string(),
        version: "test".to_string(),
        vocabulary: vocabulary.iter().map(|s| s.to_string()).collect(),
        labels: LABELS.iter().map(|s| s.to_string()).collect(),
        model_file: "model.onnx".to_string(),
        model_sha256: Some(sha256_hex(&model)),
        metadata_file: "disease_info.json".to_string(),
    };
    fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?)?;
    fs::write(dir.join("model.onnx"), model)?;
    fs::write(
        dir.join("disease_info.json"),
        r#"{
            "Fungal infection": {"Description": "A fungal infection is...", "Precaution_1": "bath twice a day"},
            "Chronic cholestasis": {"Description": "Reduced bile flow.", "Precaution_1": "cold baths", "Precaution_3": "consult doctor"}
        }"#,
    )?;
    Ok(())
}

/// Stand-in used only to obtain feature vectors of a chosen width
#[derive(Debug)]
struct Unused;

impl SymptomClassifier for Unused {
    fn predict(&self, _features: &FeatureVector) -> Result<LabelId, ClassifierError> {
        Ok(0)
    }
}

fn encode(vocabulary: &[&str], symptoms: &[&str]) -> FeatureVector {
    let context = PipelineBuilder::new()
        .with_vocabulary(vocabulary.to_vec())
        .unwrap()
        .with_labels(LABELS.to_vec())
        .unwrap()
        .with_classifier(Unused)
        .build()
        .expect("Failed to build pipeline");
    context.vocabulary().encode(symptoms)
}

#[test]
fn test_onnx_classifier_predicts_label() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = OnnxClassifier::load(&fixture_path(), VOCABULARY.len(), &RuntimeConfig::default())?;
    assert_eq!(classifier.feature_count(), 5);

    assert_eq!(classifier.predict(&encode(&VOCABULARY, &["nodal skin eruptions"]))?, 2);
    assert_eq!(classifier.predict(&encode(&VOCABULARY, &["shivering", "continuous_sneezing"]))?, 3);
    assert_eq!(classifier.predict(&encode(&VOCABULARY, &[]))?, 0);
    Ok(())
}

#[test]
fn test_onnx_classifier_rejects_wrong_width() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = OnnxClassifier::load(&fixture_path(), VOCABULARY.len(), &RuntimeConfig::default())?;
    let narrow = encode(&VOCABULARY[..3], &["itching"]);

    let err = classifier.predict(&narrow).unwrap_err();
    assert!(matches!(err, ClassifierError::ShapeMismatch { expected: 5, actual: 3 }));
    Ok(())
}

#[test]
fn test_load_bundle_and_assemble() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_bundle(dir.path(), &VOCABULARY)?;

    let pipeline = DiagnosisPipeline::load(dir.path(), RuntimeConfig::default());
    assert!(pipeline.is_available());

    let prediction = pipeline.assemble(&["Continuous_Sneezing", " shivering "])?;
    assert_eq!(prediction.disease, "Chronic cholestasis");
    assert_eq!(prediction.description, "Reduced bile flow.");
    assert_eq!(prediction.precautions, vec!["cold baths", "consult doctor"]);

    let prediction = pipeline.assemble(&["itching", "skin rash"])?;
    assert_eq!(prediction.disease, "Fungal infection");
    assert_eq!(prediction.precautions, vec!["bath twice a day"]);

    let prediction = pipeline.assemble(&["skin_rash"])?;
    assert_eq!(prediction.disease, "Allergy");
    assert_eq!(prediction.description, "No description available.");
    assert!(prediction.precautions.is_empty());

    let info = pipeline.info().unwrap();
    assert_eq!(info.source.as_deref(), Some(dir.path()));
    assert_eq!(info.vocabulary_size, 5);
    assert_eq!(info.metadata_records, 2);
    Ok(())
}

#[test]
fn test_vocabulary_narrower_than_model_fails_prediction() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_bundle(dir.path(), &VOCABULARY[..4])?;

    let pipeline = DiagnosisPipeline::load(dir.path(), RuntimeConfig::default());
    assert!(pipeline.is_available());

    let err = pipeline.assemble(&["itching"]).unwrap_err();
    assert_eq!(err.kind, PredictionErrorKind::PredictionFailed);
    assert!(err.cause.is_some());
    Ok(())
}
