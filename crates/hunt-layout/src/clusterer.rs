//! The semantic clusterer facade and its shared, lazily loaded handle.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use hunt_embeddings::{CandleEmbedder, EmbeddingModel, ModelCache};
use hunt_types::{LayoutConfig, NodeSnapshot};
use rand::Rng;
use tracing::{info, warn};

use crate::cluster::{Cluster, ClusterAnalyzer};
use crate::embedder::TextEmbedder;
use crate::error::LayoutError;
use crate::placement::{PlacementEngine, PlacementProposal};

/// Placement and clustering over one embedder.
#[derive(Debug, Clone)]
pub struct SemanticClusterer {
    embedder: TextEmbedder,
    placement: PlacementEngine,
    analyzer: ClusterAnalyzer,
}

impl SemanticClusterer {
    /// Build the placement and cluster engines from `config`.
    ///
    /// Only the engine settings are checked here: thresholds must lie in
    /// [0, 1] and the distance range must be finite, non-negative and not
    /// inverted. The enable switch and the timeout belong to the caller.
    pub fn new(embedder: TextEmbedder, config: &LayoutConfig) -> Result<Self, LayoutError> {
        let (placement, analyzer) = engines(config)?;
        Ok(Self {
            embedder,
            placement,
            analyzer,
        })
    }

    /// Clusterer over an already loaded model.
    pub fn with_model(
        model: Arc<dyn EmbeddingModel>,
        config: &LayoutConfig,
    ) -> Result<Self, LayoutError> {
        Self::new(TextEmbedder::new(model, config.min_text_length), config)
    }

    pub fn is_available(&self) -> bool {
        self.embedder.is_available()
    }

    /// Position for a new note near its most similar neighbour, if any.
    pub fn propose_position(
        &self,
        text: &str,
        existing: &[NodeSnapshot],
    ) -> Option<PlacementProposal> {
        self.placement.propose(&self.embedder, text, existing)
    }

    pub fn propose_position_with_rng<R: Rng + ?Sized>(
        &self,
        text: &str,
        existing: &[NodeSnapshot],
        rng: &mut R,
    ) -> Option<PlacementProposal> {
        self.placement
            .propose_with_rng(&self.embedder, text, existing, rng)
    }

    /// Group existing notes into similarity clusters.
    pub fn analyze(&self, nodes: &[NodeSnapshot]) -> Vec<Cluster> {
        self.analyzer.analyze(&self.embedder, nodes)
    }
}

fn engines(config: &LayoutConfig) -> Result<(PlacementEngine, ClusterAnalyzer), LayoutError> {
    Ok((
        PlacementEngine::from_config(config)?,
        ClusterAnalyzer::from_config(config)?,
    ))
}

enum ModelSource {
    /// Load all-MiniLM-L6-v2 through the model cache
    Candle(ModelCache),
    /// Use a model built by the caller
    Provided(Arc<dyn EmbeddingModel>),
    /// Run without a model
    Disabled,
}

struct Inner {
    config: LayoutConfig,
    source: ModelSource,
    placement: PlacementEngine,
    analyzer: ClusterAnalyzer,
    clusterer: OnceLock<Arc<SemanticClusterer>>,
}

/// Cloneable handle to a process-wide [`SemanticClusterer`].
///
/// The model is loaded on first use, exactly once, no matter how many
/// clones race for it. A failed load is logged and leaves the clusterer
/// without a model, so every operation degrades to "no proposal" and "no
/// clusters" instead of failing. Engine settings are checked when the
/// handle is created, with the same rules as [`SemanticClusterer::new`].
#[derive(Clone)]
pub struct SharedClusterer {
    inner: Arc<Inner>,
}

impl SharedClusterer {
    /// Handle that loads the sentence model from `cache_dir` on first use.
    pub fn candle(config: LayoutConfig, cache_dir: impl Into<PathBuf>) -> Result<Self, LayoutError> {
        let cache = ModelCache::new(cache_dir, config.model_repo.clone());
        Self::from_source(config, ModelSource::Candle(cache))
    }

    /// Handle over a model the caller already has.
    pub fn with_model(
        config: LayoutConfig,
        model: Arc<dyn EmbeddingModel>,
    ) -> Result<Self, LayoutError> {
        Self::from_source(config, ModelSource::Provided(model))
    }

    /// Handle with no model at all.
    pub fn disabled(config: LayoutConfig) -> Result<Self, LayoutError> {
        Self::from_source(config, ModelSource::Disabled)
    }

    fn from_source(config: LayoutConfig, source: ModelSource) -> Result<Self, LayoutError> {
        let (placement, analyzer) = engines(&config)?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                source,
                placement,
                analyzer,
                clusterer: OnceLock::new(),
            }),
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.inner.config
    }

    /// Whether the clusterer has been built yet.
    pub fn is_loaded(&self) -> bool {
        self.inner.clusterer.get().is_some()
    }

    /// The shared clusterer, loading the model if this is the first call.
    ///
    /// May block for a long time on first use (download and weight loading).
    pub fn get(&self) -> Arc<SemanticClusterer> {
        self.inner
            .clusterer
            .get_or_init(|| Arc::new(self.build()))
            .clone()
    }

    fn build(&self) -> SemanticClusterer {
        let embedder = match self.load_model() {
            Some(model) => TextEmbedder::new(model, self.inner.config.min_text_length),
            None => TextEmbedder::unavailable(),
        };

        SemanticClusterer {
            embedder,
            placement: self.inner.placement.clone(),
            analyzer: self.inner.analyzer.clone(),
        }
    }

    fn load_model(&self) -> Option<Arc<dyn EmbeddingModel>> {
        match &self.inner.source {
            ModelSource::Candle(cache) => match CandleEmbedder::load(cache) {
                Ok(model) => {
                    info!(repo = %cache.repo_id, "Semantic model ready");
                    Some(Arc::new(model))
                }
                Err(e) => {
                    warn!(error = %e, repo = %cache.repo_id, "Semantic model unavailable");
                    None
                }
            },
            ModelSource::Provided(model) => Some(model.clone()),
            ModelSource::Disabled => {
                info!("Semantic layout running without a model");
                None
            }
        }
    }

    /// See [`SemanticClusterer::propose_position`].
    pub fn propose_position(
        &self,
        text: &str,
        existing: &[NodeSnapshot],
    ) -> Option<PlacementProposal> {
        self.get().propose_position(text, existing)
    }

    /// See [`SemanticClusterer::analyze`].
    pub fn analyze(&self, nodes: &[NodeSnapshot]) -> Vec<Cluster> {
        self.get().analyze(nodes)
    }
}

impl std::fmt::Debug for SharedClusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedClusterer")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hunt_embeddings::TableEmbedder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table() -> Arc<TableEmbedder> {
        Arc::new(
            TableEmbedder::new(2)
                .with("find the treasure map", vec![1.0, 0.0])
                .with("search for buried gold", vec![0.8, 0.6])
                .with("gold coins in the cave", vec![0.9, 0.4359]),
        )
    }

    #[test]
    fn test_model_loaded_once() {
        let model = table();
        let shared = SharedClusterer::with_model(LayoutConfig::default(), model.clone()).unwrap();
        assert!(!shared.is_loaded());

        let clones: Vec<_> = (0..4).map(|_| shared.clone()).collect();
        let handles: Vec<_> = clones
            .into_iter()
            .map(|s| std::thread::spawn(move || s.get()))
            .collect();
        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(shared.is_loaded());
        for instance in &instances {
            assert!(Arc::ptr_eq(instance, &shared.get()));
        }
    }

    #[test]
    fn test_disabled_degrades() {
        let shared = SharedClusterer::disabled(LayoutConfig::default()).unwrap();
        let nodes = vec![
            NodeSnapshot::new(Some(1), 0.0, 0.0, "search for buried gold"),
            NodeSnapshot::new(Some(2), 0.0, 0.0, "search for buried gold"),
        ];
        assert!(!shared.get().is_available());
        assert!(shared.propose_position("find the treasure map", &nodes).is_none());
        assert!(shared.analyze(&nodes).is_empty());
    }

    #[test]
    fn test_failed_load_degrades() {
        let temp = tempfile::TempDir::new().unwrap();
        let cache = ModelCache::new(temp.path(), "hunt-console/broken-model");
        std::fs::create_dir_all(cache.model_dir()).unwrap();
        for file in hunt_embeddings::MODEL_FILES {
            std::fs::write(cache.file_path(file), b"not a model").unwrap();
        }

        let shared = SharedClusterer::candle(
            LayoutConfig {
                model_repo: "hunt-console/broken-model".to_string(),
                ..LayoutConfig::default()
            },
            temp.path(),
        )
        .unwrap();
        let nodes = vec![NodeSnapshot::new(Some(1), 0.0, 0.0, "search for buried gold")];

        assert!(shared.propose_position("find the treasure map", &nodes).is_none());
        assert!(shared.is_loaded());
        assert!(!shared.get().is_available());
    }

    #[test]
    fn test_facade_uses_configured_thresholds() {
        let nodes = vec![
            NodeSnapshot::new(Some(1), 0.0, 0.0, "search for buried gold"),
            NodeSnapshot::new(Some(2), 20.0, 0.0, "gold coins in the cave"),
        ];

        let default = SemanticClusterer::with_model(table(), &LayoutConfig::default()).unwrap();
        assert_eq!(default.analyze(&nodes).len(), 1);

        let strict_config = LayoutConfig {
            cluster_threshold: 0.99,
            placement_threshold: 0.95,
            ..LayoutConfig::default()
        };
        let strict = SemanticClusterer::with_model(table(), &strict_config).unwrap();
        assert!(strict.analyze(&nodes).is_empty());
        assert!(strict
            .propose_position("find the treasure map", &nodes)
            .is_none());
    }

    #[test]
    fn test_facade_proposal() {
        let clusterer = SemanticClusterer::with_model(table(), &LayoutConfig::default()).unwrap();
        let nodes = vec![NodeSnapshot::new(Some(1), 0.0, 0.0, "search for buried gold")];
        let mut rng = StdRng::seed_from_u64(3);
        let proposal = clusterer
            .propose_position_with_rng("find the treasure map", &nodes, &mut rng)
            .unwrap();
        assert_eq!(proposal.related_to, Some(1));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LayoutConfig {
            min_distance: 300.0,
            ..LayoutConfig::default()
        };
        assert!(SemanticClusterer::with_model(table(), &config).is_err());
        assert!(SharedClusterer::with_model(config, table()).is_err());
    }

    #[test]
    fn test_non_finite_distance_rejected_by_both_facades() {
        for config in [
            LayoutConfig {
                max_distance: f64::INFINITY,
                ..LayoutConfig::default()
            },
            LayoutConfig {
                min_distance: f64::NAN,
                ..LayoutConfig::default()
            },
        ] {
            assert!(SemanticClusterer::with_model(table(), &config).is_err());
            assert!(SharedClusterer::with_model(config.clone(), table()).is_err());
            assert!(SharedClusterer::disabled(config).is_err());
        }
    }

    #[test]
    fn test_facade_ignores_service_settings() {
        let config = LayoutConfig {
            enabled: false,
            timeout_ms: 0,
            ..LayoutConfig::default()
        };
        let shared = SharedClusterer::with_model(config.clone(), table()).unwrap();
        let nodes = vec![NodeSnapshot::new(Some(1), 0.0, 0.0, "search for buried gold")];
        assert!(shared.propose_position("find the treasure map", &nodes).is_some());
        assert!(SemanticClusterer::with_model(table(), &config).is_ok());
    }
}
