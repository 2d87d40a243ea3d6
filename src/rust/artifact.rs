//! On-disk artifact bundle produced by training.
//!
//! A bundle is a directory holding:
//! - `manifest.json` - vocabulary, label space and file names
//! - the ONNX classifier (default `model.onnx`)
//! - the disease metadata table (default `disease_info.json`)

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::pipeline::{DiseaseRecord, SchemaError};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const DEFAULT_MODEL_FILE: &str = "model.onnx";
pub const DEFAULT_METADATA_FILE: &str = "disease_info.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed artifact file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid artifact: {0}")]
    Invalid(String),
    #[error("Invalid artifact schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("Manifest {field} '{value}' must be a plain file name inside the bundle")]
    UnsafeFileName { field: &'static str, value: String },
    #[error("Hash mismatch: expected {expected}, got {actual} for {path:?}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("ONNX Runtime error: {0}")]
    Runtime(#[from] ort::Error),
}

fn default_model_file() -> String {
    DEFAULT_MODEL_FILE.to_string()
}

fn default_metadata_file() -> String {
    DEFAULT_METADATA_FILE.to_string()
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Symptom names in feature-vector order
    pub vocabulary: Vec<String>,
    /// Disease names; the position is the label id
    pub labels: Vec<String>,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    /// Lowercase hex SHA-256 of the model file, checked before loading when set
    #[serde(default)]
    pub model_sha256: Option<String>,
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
}

impl ArtifactManifest {
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let path = dir.join(MANIFEST_FILE);
        let bytes = fs::read(&path).map_err(|e| {
            log::error!("Failed to read manifest {:?}: {}", path, e);
            ArtifactError::Io(e)
        })?;
        Self::from_slice(&bytes)
    }

    /// Parses and validates manifest bytes, as read from disk or a download.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let manifest: Self = serde_json::from_slice(bytes)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Checks that the referenced files stay inside the bundle directory.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        check_file_name("model_file", &self.model_file)?;
        check_file_name("metadata_file", &self.metadata_file)?;
        let files = [MANIFEST_FILE, self.model_file.as_str(), self.metadata_file.as_str()];
        if files[0] == files[1] || files[0] == files[2] || files[1] == files[2] {
            return Err(ArtifactError::Invalid(
                "Manifest, model and metadata must be distinct files".to_string(),
            ));
        }
        Ok(())
    }

    pub fn model_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.model_file)
    }

    pub fn metadata_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.metadata_file)
    }
}

// Exactly one normal component: no separators, no `..`, no root or prefix.
fn check_file_name(field: &'static str, value: &str) -> Result<(), ArtifactError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ArtifactError::UnsafeFileName {
            field,
            value: value.to_string(),
        }),
    }
}

/// Reads the disease metadata table.
///
/// A missing table file yields an empty table: every disease then resolves to
/// the default description.
pub fn load_metadata(path: &Path) -> Result<HashMap<String, DiseaseRecord>, ArtifactError> {
    if !path.exists() {
        log::warn!("Metadata table {:?} not found, descriptions will use the default", path);
        return Ok(HashMap::new());
    }
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Checks a file against an expected lowercase hex SHA-256.
pub fn verify_file(path: &Path, expected_hash: &str) -> Result<(), ArtifactError> {
    let bytes = fs::read(path)?;
    let actual = sha256_hex(&bytes);
    log::debug!("Verifying {:?}: read {} bytes, hash {}", path, bytes.len(), actual);
    if !actual.eq_ignore_ascii_case(expected_hash) {
        return Err(ArtifactError::HashMismatch {
            path: path.to_path_buf(),
            expected: expected_hash.to_string(),
            actual,
        });
    }
    Ok(())
}
