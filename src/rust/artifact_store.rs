use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;

use crate::artifact::{self, ArtifactError, ArtifactManifest, MANIFEST_FILE};

/// Environment variable overriding the cache root
pub const CACHE_ENV: &str = "SYMPTOM_DX_CACHE";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Artifact not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

/// Where to fetch an artifact bundle from.
#[derive(Debug, Clone)]
pub struct ArtifactSource {
    /// Local directory name under the store
    pub name: String,
    /// URL prefix; files are fetched as `{base_url}/{file}`
    pub base_url: String,
    /// Optional pin for the manifest itself
    pub manifest_sha256: Option<String>,
}

impl ArtifactSource {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            manifest_sha256: None,
        }
    }

    pub fn with_manifest_hash(mut self, hash: impl Into<String>) -> Self {
        self.manifest_sha256 = Some(hash.into());
        self
    }

    fn url_for(&self, file: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file)
    }
}

/// Local cache of artifact bundles, one directory per bundle name.
#[derive(Clone)]
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ArtifactStore {
    /// Creates a store in the default artifacts directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_artifacts_dir())
    }

    /// Returns the default artifacts directory path
    pub fn get_default_artifacts_dir() -> PathBuf {
        if let Ok(path) = env::var(CACHE_ENV) {
            return PathBuf::from(path).join("artifacts");
        }

        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("symptom-dx").join("artifacts");
        }

        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("symptom-dx").join("artifacts");
        }

        env::temp_dir().join("symptom-dx").join("artifacts")
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> io::Result<Self> {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        fs::create_dir_all(&artifacts_dir)?;
        Ok(Self {
            artifacts_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn artifact_dir(&self, name: &str) -> PathBuf {
        self.artifacts_dir.join(name)
    }

    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.artifact_dir(name).join(MANIFEST_FILE)
    }

    /// True when the manifest and the model file it names are present
    pub fn is_downloaded(&self, name: &str) -> bool {
        let dir = self.artifact_dir(name);
        match ArtifactManifest::load(&dir) {
            Ok(manifest) => {
                let model_path = manifest.model_path(&dir);
                log::debug!("Model path: {:?} (exists: {})", model_path, model_path.exists());
                model_path.exists()
            }
            Err(_) => false,
        }
    }

    /// Checks the stored model against the manifest hash.
    ///
    /// Returns `Ok(false)` when files are missing or the hash differs. A
    /// manifest without a hash only requires the model file to exist.
    pub fn verify(&self, name: &str) -> Result<bool, StoreError> {
        let dir = self.artifact_dir(name);
        if !self.manifest_path(name).exists() {
            log::info!("No manifest for artifact '{}'", name);
            return Ok(false);
        }
        let manifest = ArtifactManifest::load(&dir)?;
        let model_path = manifest.model_path(&dir);
        if !model_path.exists() {
            log::info!("Model file {:?} is missing", model_path);
            return Ok(false);
        }

        match &manifest.model_sha256 {
            Some(expected) => match artifact::verify_file(&model_path, expected) {
                Ok(()) => Ok(true),
                Err(ArtifactError::HashMismatch { actual, .. }) => {
                    log::warn!("Model hash mismatch for '{}': expected {}, got {}", name, expected, actual);
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            },
            None => {
                log::warn!("Artifact '{}' has no model hash; skipping verification", name);
                Ok(true)
            }
        }
    }

    /// Downloads manifest, metadata table and model into the store.
    ///
    /// Files land in a staging directory inside the store and replace the
    /// bundle only once every file has arrived, so a failed download leaves
    /// any existing bundle of the same name untouched. Concurrent downloads
    /// through clones of one store are serialized.
    pub async fn download(&self, source: &ArtifactSource) -> Result<(), StoreError> {
        let _lock = self.download_lock.lock().await;

        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}-", source.name))
            .tempdir_in(&self.artifacts_dir)?;
        log::info!("Staging artifact '{}' at {:?}", source.name, staging.path());

        let result = self
            .download_bundle(source, staging.path())
            .await
            .and_then(|()| self.install(staging.path(), &source.name));

        match &result {
            Ok(()) => log::info!("Artifact '{}' ready to use", source.name),
            Err(e) => {
                log::error!("Failed to download artifact '{}': {}", source.name, e);
                let staging_path = staging.path().to_path_buf();
                if let Err(cleanup) = staging.close() {
                    log::warn!("Failed to remove staging directory {:?}: {}", staging_path, cleanup);
                }
            }
        }
        result
    }

    // Swaps a fully downloaded staging directory into place.
    fn install(&self, staging: &Path, name: &str) -> Result<(), StoreError> {
        let dir = self.artifact_dir(name);
        if dir.exists() {
            log::info!("Replacing existing artifact at {:?}", dir);
            fs::remove_dir_all(&dir)?;
        }
        fs::rename(staging, &dir)?;
        Ok(())
    }

    async fn download_bundle(&self, source: &ArtifactSource, dir: &Path) -> Result<(), StoreError> {
        let manifest_bytes = self
            .fetch(&source.url_for(MANIFEST_FILE), source.manifest_sha256.as_deref(), "manifest")
            .await?;
        let manifest = ArtifactManifest::from_slice(&manifest_bytes)?;

        let metadata_bytes = self
            .fetch(&source.url_for(&manifest.metadata_file), None, "metadata")
            .await?;
        let model_bytes = self
            .fetch(&source.url_for(&manifest.model_file), manifest.model_sha256.as_deref(), "model")
            .await?;

        fs::write(manifest.metadata_path(dir), metadata_bytes)?;
        fs::write(manifest.model_path(dir), model_bytes)?;
        fs::write(dir.join(MANIFEST_FILE), manifest_bytes)?;
        Ok(())
    }

    async fn fetch(
        &self,
        url: &str,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<Vec<u8>, StoreError> {
        log::info!("Downloading {} file from {}", file_type, url);
        let response = reqwest::get(url).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = expected_hash {
            let actual = artifact::sha256_hex(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, actual);
                return Err(StoreError::HashMismatch {
                    file: file_type.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }
        Ok(bytes.to_vec())
    }

    pub fn remove_download(&self, name: &str) -> Result<(), StoreError> {
        let dir = self.artifact_dir(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Downloads the bundle if it is missing, and re-downloads it if the
    /// stored model fails verification. Returns the bundle directory.
    pub async fn ensure_downloaded(&self, source: &ArtifactSource) -> Result<PathBuf, StoreError> {
        log::info!("Checking if artifact '{}' is downloaded...", source.name);
        if !self.is_downloaded(&source.name) {
            log::info!("Artifact not found, downloading...");
            self.download(source).await?;
        } else if !self.verify(&source.name)? {
            log::info!("Artifact verification failed, re-downloading...");
            self.download(source).await?;
        } else {
            log::info!("Artifact verification successful");
        }
        Ok(self.artifact_dir(&source.name))
    }

    /// Returns the bundle directory, failing if it has not been downloaded
    pub fn require(&self, name: &str) -> Result<PathBuf, StoreError> {
        if self.is_downloaded(name) {
            Ok(self.artifact_dir(name))
        } else {
            Err(StoreError::NotDownloaded(name.to_string()))
        }
    }
}
