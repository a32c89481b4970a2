use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use sha2::{Digest, Sha256};

use crate::classifier::ForestModel;
use crate::decoder::LabelMap;

/// Classifier artifact file name, as written by the training run.
pub const MODEL_FILE: &str = "rf_model.json";
/// Label-decoder artifact file name.
pub const ENCODER_FILE: &str = "label_encoder.json";
/// Environment variable overriding the artifact directory.
pub const ASSETS_ENV: &str = "PINKSLIP_ASSETS";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Artifact not found: {0:?}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse {file}: {detail}")]
    ParseError { file: String, detail: String },
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
    #[error("Invalid artifact {file}: {detail}")]
    InvalidArtifact { file: String, detail: String },
}

/// Where the two artifacts are looked for.
///
/// Explicit file paths win over the directory, and the directory wins
/// over [`AssetPaths::default_dir`]. An empty value resolves everything
/// through the default chain.
#[derive(Debug, Clone, Default)]
pub struct AssetPaths {
    /// Directory holding both artifacts.
    pub dir: Option<PathBuf>,
    /// Explicit classifier artifact path.
    pub model: Option<PathBuf>,
    /// Explicit label-decoder artifact path.
    pub encoder: Option<PathBuf>,
}

impl AssetPaths {
    /// Returns the directory artifacts resolve against when no explicit
    /// path is given.
    pub fn default_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(ASSETS_ENV) {
            return PathBuf::from(path);
        }

        // 2. Look next to the running executable
        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                if dir.join(MODEL_FILE).exists() {
                    return dir.to_path_buf();
                }
            }
        }

        // 3. Use the platform-specific data directory
        if let Some(data_dir) = dirs::data_local_dir() {
            let dir = data_dir.join("pinkslip");
            if dir.join(MODEL_FILE).exists() {
                return dir;
            }
        }

        // 4. Fall back to the working directory
        PathBuf::from(".")
    }

    /// Resolved path of the classifier artifact.
    pub fn resolve_model(&self) -> PathBuf {
        match &self.model {
            Some(path) => path.clone(),
            None => self.base_dir().join(MODEL_FILE),
        }
    }

    /// Resolved path of the label-decoder artifact.
    pub fn resolve_encoder(&self) -> PathBuf {
        match &self.encoder {
            Some(path) => path.clone(),
            None => self.base_dir().join(ENCODER_FILE),
        }
    }

    fn base_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.clone(),
            None => Self::default_dir(),
        }
    }
}

/// Loads and memoizes the classifier/decoder artifact pair.
///
/// The pair is loaded once per process through [`AssetStore::obtain`] and
/// cached for every later caller; there is no reload or teardown path. A
/// failed load leaves the store degraded: both accessors return `None`,
/// [`AssetStore::failure`] carries the user-visible report, and every
/// submission is answered with that report instead of a prediction.
pub struct AssetStore {
    classifier: Option<Arc<ForestModel>>,
    decoder: Option<Arc<LabelMap>>,
    failure: Option<String>,
}

static STORE: OnceLock<AssetStore> = OnceLock::new();

impl AssetStore {
    /// Returns the process-wide store, loading the artifacts on first
    /// call. The paths of the first call win; later calls return the
    /// cached pair without touching storage.
    pub fn obtain(paths: &AssetPaths) -> &'static AssetStore {
        STORE.get_or_init(|| Self::load(paths))
    }

    /// Loads both artifacts from storage.
    ///
    /// Any failure on either artifact degrades the whole pair. A store
    /// with only a classifier or only a decoder cannot answer a
    /// submission anyway, so partial success is not preserved.
    pub fn load(paths: &AssetPaths) -> Self {
        match Self::try_load(paths) {
            Ok((model, labels)) => {
                log::info!("Model artifacts ready: {}", model.summary());
                Self {
                    classifier: Some(Arc::new(model)),
                    decoder: Some(Arc::new(labels)),
                    failure: None,
                }
            }
            Err(e) => {
                log::error!("Failed to load model artifacts: {}", e);
                Self {
                    classifier: None,
                    decoder: None,
                    failure: Some(e.to_string()),
                }
            }
        }
    }

    fn try_load(paths: &AssetPaths) -> Result<(ForestModel, LabelMap), AssetError> {
        let model_path = paths.resolve_model();
        log::info!("Loading classifier artifact from {:?}", model_path);
        let model_bytes = read_artifact(&model_path)?;
        let mut model: ForestModel =
            serde_json::from_slice(&model_bytes).map_err(|e| AssetError::ParseError {
                file: file_label(&model_path),
                detail: e.to_string(),
            })?;
        model
            .prepare()
            .map_err(|e| AssetError::InvalidArtifact {
                file: file_label(&model_path),
                detail: e.to_string(),
            })?;

        let encoder_path = paths.resolve_encoder();
        log::info!("Loading label decoder from {:?}", encoder_path);
        let encoder_bytes = read_artifact(&encoder_path)?;
        let labels: LabelMap =
            serde_json::from_slice(&encoder_bytes).map_err(|e| AssetError::ParseError {
                file: file_label(&encoder_path),
                detail: e.to_string(),
            })?;
        labels
            .validate()
            .map_err(|e| AssetError::InvalidArtifact {
                file: file_label(&encoder_path),
                detail: e.to_string(),
            })?;

        Ok((model, labels))
    }

    /// The loaded classifier, unless the store is degraded.
    pub fn classifier(&self) -> Option<Arc<ForestModel>> {
        self.classifier.clone()
    }

    /// The loaded label decoder, unless the store is degraded.
    pub fn decoder(&self) -> Option<Arc<LabelMap>> {
        self.decoder.clone()
    }

    /// The load-failure report, when the store is degraded.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Whether both artifacts loaded and predictions can be served.
    pub fn is_available(&self) -> bool {
        self.classifier.is_some() && self.decoder.is_some()
    }
}

/// Reads one artifact, verifying the optional `.sha256` sidecar first.
fn read_artifact(path: &Path) -> Result<Vec<u8>, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    log::info!("Read {} bytes from {:?}", bytes.len(), path);
    if let Some(expected) = read_sidecar(path)? {
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let actual = format!("{:x}", hasher.finalize());
        if actual != expected {
            return Err(AssetError::HashMismatch {
                file: file_label(path),
                expected,
                actual,
            });
        }
        log::info!("Checksum verified for {:?}", path);
    }
    Ok(bytes)
}

/// Returns the digest recorded in `<artifact>.sha256`, if the sidecar
/// exists. Only the first whitespace-separated token is read, so both a
/// bare digest and a `sha256sum` output line work.
fn read_sidecar(path: &Path) -> Result<Option<String>, AssetError> {
    let sidecar = sidecar_path(path);
    if !sidecar.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&sidecar)?;
    match text.split_whitespace().next() {
        Some(digest) => Ok(Some(digest.to_ascii_lowercase())),
        None => {
            log::warn!("Ignoring empty checksum sidecar {:?}", sidecar);
            Ok(None)
        }
    }
}

fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
