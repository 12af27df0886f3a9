//! Configuration loading for the hunt console.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/hunt-console/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::HuntError;

/// Hugging Face repository of the sentence embedding model.
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Semantic layout settings.
///
/// Semantic placement is on by default; it only ever moves a node, it never
/// blocks its creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Place new nodes near related notes
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// A neighbour must score strictly above this to anchor a new node.
    #[serde(default = "default_placement_threshold")]
    pub placement_threshold: f32,

    /// A node must score strictly above this against a seed to join its cluster.
    #[serde(default = "default_cluster_threshold")]
    pub cluster_threshold: f32,

    /// Texts shorter than this (in characters, after trimming) are not embedded.
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Closest a placed node lands to its anchor (canvas units).
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,

    /// Farthest a placed node lands from its anchor (canvas units).
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Maximum time for semantic placement during node creation (ms).
    /// If exceeded, the node keeps its requested position.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Embedding model repository
    #[serde(default = "default_model_repo")]
    pub model_repo: String,

    /// Where downloaded model files are kept
    #[serde(default = "default_model_cache_dir")]
    pub model_cache_dir: String,
}

fn default_true() -> bool {
    true
}

fn default_placement_threshold() -> f32 {
    0.6
}

fn default_cluster_threshold() -> f32 {
    0.7
}

fn default_min_text_length() -> usize {
    3
}

fn default_min_distance() -> f64 {
    120.0
}

fn default_max_distance() -> f64 {
    200.0
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_model_repo() -> String {
    DEFAULT_MODEL_REPO.to_string()
}

fn default_model_cache_dir() -> String {
    ProjectDirs::from("", "", "hunt-console")
        .map(|p| p.cache_dir().join("models"))
        .unwrap_or_else(|| PathBuf::from(".cache/models"))
        .to_string_lossy()
        .to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            placement_threshold: default_placement_threshold(),
            cluster_threshold: default_cluster_threshold(),
            min_text_length: default_min_text_length(),
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            timeout_ms: default_timeout_ms(),
            model_repo: default_model_repo(),
            model_cache_dir: default_model_cache_dir(),
        }
    }
}

impl LayoutConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.placement_threshold) {
            return Err(format!(
                "placement_threshold must be 0.0-1.0, got {}",
                self.placement_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.cluster_threshold) {
            return Err(format!(
                "cluster_threshold must be 0.0-1.0, got {}",
                self.cluster_threshold
            ));
        }
        if !self.min_distance.is_finite() || !self.max_distance.is_finite() {
            return Err(format!(
                "placement distances must be finite, got {}..={}",
                self.min_distance, self.max_distance
            ));
        }
        if self.min_distance < 0.0 {
            return Err(format!("min_distance must be >= 0, got {}", self.min_distance));
        }
        if self.max_distance < self.min_distance {
            return Err(format!(
                "max_distance ({}) must be >= min_distance ({})",
                self.max_distance, self.min_distance
            ));
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be > 0".to_string());
        }
        Ok(())
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to RocksDB storage directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Semantic layout configuration
    #[serde(default)]
    pub layout: LayoutConfig,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "hunt-console")
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/hunt-console/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (HUNT_DB_PATH, HUNT_LAYOUT__CLUSTER_THRESHOLD, ...)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, HuntError> {
        let config_dir = ProjectDirs::from("", "", "hunt-console")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| HuntError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| HuntError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Nested keys use a double underscore: HUNT_LAYOUT__TIMEOUT_MS
        builder = builder.add_source(
            Environment::with_prefix("HUNT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| HuntError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| HuntError::Config(e.to_string()))?;

        settings.layout.validate().map_err(HuntError::Config)?;
        Ok(settings)
    }

    /// Expand ~ in db_path to the home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        expand_home(&self.db_path)
    }

    /// Expand ~ in the model cache directory
    pub fn expanded_model_cache_dir(&self) -> PathBuf {
        expand_home(&self.layout.model_cache_dir)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
