//! On-disk cache of sentence model files.
//!
//! Files are fetched from the Hugging Face Hub the first time a model is
//! needed and reused afterwards. Each repository gets its own directory,
//! named after the repo id with `/` flattened to `_`.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::EmbeddingError;

/// Sentence model used when none is configured
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Files a model directory must hold before it can be loaded
pub const MODEL_FILES: &[&str] = &[CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE];

/// Location of cached model files for one repository.
#[derive(Debug, Clone)]
pub struct ModelCache {
    pub cache_dir: PathBuf,
    pub repo_id: String,
}

impl Default for ModelCache {
    fn default() -> Self {
        let base = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        Self::new(base.join("hunt-console").join("models"), DEFAULT_MODEL_REPO)
    }
}

impl ModelCache {
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Directory holding this repository's files
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.model_dir().join(filename)
    }

    /// Model files not yet on disk
    pub fn missing_files(&self) -> Vec<&'static str> {
        MODEL_FILES
            .iter()
            .copied()
            .filter(|name| !self.file_path(name).exists())
            .collect()
    }
}

/// Resolved paths of a cached model.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelPaths {
    fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join(CONFIG_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
            weights: dir.join(WEIGHTS_FILE),
        }
    }
}

/// Make sure every model file is on disk, fetching the missing ones.
pub fn get_or_download_model(cache: &ModelCache) -> Result<ModelPaths, EmbeddingError> {
    let model_dir = cache.model_dir();
    let missing = cache.missing_files();

    if missing.is_empty() {
        debug!(path = ?model_dir, "Model files already cached");
    } else {
        info!(repo = %cache.repo_id, files = ?missing, "Fetching model files");
        fetch_files(cache, &missing)?;
    }

    Ok(ModelPaths::in_dir(&model_dir))
}

fn fetch_files(cache: &ModelCache, files: &[&str]) -> Result<(), EmbeddingError> {
    use hf_hub::api::sync::Api;

    let repo = Api::new()
        .map_err(|e| EmbeddingError::Download(e.to_string()))?
        .model(cache.repo_id.clone());

    std::fs::create_dir_all(cache.model_dir())?;

    for name in files {
        let fetched = repo
            .get(name)
            .map_err(|e| EmbeddingError::Download(format!("{}: {}", name, e)))?;
        let target = cache.file_path(name);
        std::fs::copy(&fetched, &target)?;
        debug!(file = name, target = ?target, "Model file cached");
    }

    Ok(())
}
