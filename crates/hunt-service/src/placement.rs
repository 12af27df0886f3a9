//! Semantic placement during node creation, with fail-open behavior.
//!
//! A node is always stored. Placement only replaces its coordinates when
//! every gate passes and the layout engine finds a related note in time:
//! - layout disabled -> keep coordinates
//! - caller opted out or sent no text -> keep coordinates
//! - text too short to embed -> keep coordinates
//! - no related note above the threshold -> keep coordinates
//! - worker failure or timeout -> keep coordinates

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hunt_layout::{long_enough, PlacementProposal, SharedClusterer};
use hunt_types::{NewNode, NodeSnapshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Outcome counters for semantic placement.
#[derive(Debug, Default)]
pub struct PlacementMetrics {
    pub skipped_disabled: AtomicU64,
    pub skipped_not_requested: AtomicU64,
    pub skipped_short_text: AtomicU64,
    pub skipped_error: AtomicU64,
    pub skipped_timeout: AtomicU64,
    pub no_match: AtomicU64,
    pub placed: AtomicU64,
}

impl PlacementMetrics {
    pub fn snapshot(&self) -> PlacementMetricsSnapshot {
        PlacementMetricsSnapshot {
            skipped_disabled: self.skipped_disabled.load(Ordering::Relaxed),
            skipped_not_requested: self.skipped_not_requested.load(Ordering::Relaxed),
            skipped_short_text: self.skipped_short_text.load(Ordering::Relaxed),
            skipped_error: self.skipped_error.load(Ordering::Relaxed),
            skipped_timeout: self.skipped_timeout.load(Ordering::Relaxed),
            no_match: self.no_match.load(Ordering::Relaxed),
            placed: self.placed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PlacementMetricsSnapshot {
    pub skipped_disabled: u64,
    pub skipped_not_requested: u64,
    pub skipped_short_text: u64,
    pub skipped_error: u64,
    pub skipped_timeout: u64,
    pub no_match: u64,
    pub placed: u64,
}

/// Runs the layout engine for new nodes.
#[derive(Debug, Clone)]
pub struct SemanticPlacer {
    clusterer: SharedClusterer,
    metrics: Arc<PlacementMetrics>,
}

impl SemanticPlacer {
    pub fn new(clusterer: SharedClusterer) -> Self {
        Self {
            clusterer,
            metrics: Arc::new(PlacementMetrics::default()),
        }
    }

    pub fn clusterer(&self) -> &SharedClusterer {
        &self.clusterer
    }

    pub fn metrics(&self) -> Arc<PlacementMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Move `draft` next to its most related note, if there is one.
    ///
    /// Returns the proposal that was applied.
    pub async fn place(
        &self,
        draft: &mut NewNode,
        existing: Vec<NodeSnapshot>,
    ) -> Option<PlacementProposal> {
        let config = self.clusterer.config();

        if !config.enabled {
            self.metrics
                .skipped_disabled
                .fetch_add(1, Ordering::Relaxed);
            return None;
        }

        if !draft.use_semantic || draft.text.is_empty() {
            self.metrics
                .skipped_not_requested
                .fetch_add(1, Ordering::Relaxed);
            return None;
        }

        if !long_enough(&draft.text, config.min_text_length) {
            self.metrics
                .skipped_short_text
                .fetch_add(1, Ordering::Relaxed);
            debug!(
                min_len = config.min_text_length,
                "Semantic placement skipped: text too short"
            );
            return None;
        }

        match self.propose(&draft.text, existing).await {
            Some(proposal) => {
                draft.x = proposal.x;
                draft.y = proposal.y;
                Some(proposal)
            }
            None => None,
        }
    }

    /// Ask the layout engine for a position, bounded by the configured
    /// timeout. Nothing is recorded on the draft.
    pub async fn propose(
        &self,
        text: &str,
        existing: Vec<NodeSnapshot>,
    ) -> Option<PlacementProposal> {
        let timeout_ms = self.clusterer.config().timeout_ms;
        let clusterer = self.clusterer.clone();
        let text = text.to_string();
        let start = Instant::now();

        let task = tokio::task::spawn_blocking(move || clusterer.propose_position(&text, &existing));

        match timeout(Duration::from_millis(timeout_ms), task).await {
            Ok(Ok(Some(proposal))) => {
                self.metrics.placed.fetch_add(1, Ordering::Relaxed);
                info!(
                    similarity = proposal.similarity,
                    related_to = ?proposal.related_to,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Semantic positioning"
                );
                Some(proposal)
            }
            Ok(Ok(None)) => {
                self.metrics.no_match.fetch_add(1, Ordering::Relaxed);
                debug!(
                    elapsed_ms = start.elapsed().as_millis(),
                    "No related note, keeping requested position"
                );
                None
            }
            Ok(Err(e)) => {
                self.metrics.skipped_error.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Semantic positioning failed, using requested position");
                None
            }
            Err(_) => {
                self.metrics.skipped_timeout.fetch_add(1, Ordering::Relaxed);
                warn!(timeout_ms, "Semantic positioning timed out, using requested position");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hunt_embeddings::{Embedding, EmbeddingError, EmbeddingModel, ModelInfo, TableEmbedder};
    use hunt_types::LayoutConfig;

    struct SlowModel {
        info: ModelInfo,
    }

    impl EmbeddingModel for SlowModel {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(Embedding::new(vec![1.0, 0.0]))
        }
    }

    struct PanickingModel {
        info: ModelInfo,
    }

    impl EmbeddingModel for PanickingModel {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
            panic!("model crashed");
        }
    }

    fn info() -> ModelInfo {
        ModelInfo {
            name: "test".to_string(),
            dimension: 2,
            max_sequence_length: 64,
        }
    }

    fn table_placer(config: LayoutConfig) -> SemanticPlacer {
        let model = TableEmbedder::new(2)
            .with("find the treasure map", vec![1.0, 0.0])
            .with("search for buried gold", vec![0.8, 0.6]);
        SemanticPlacer::new(SharedClusterer::with_model(config, Arc::new(model)).unwrap())
    }

    fn existing() -> Vec<NodeSnapshot> {
        vec![NodeSnapshot::new(Some(1), 100.0, 100.0, "search for buried gold")]
    }

    #[tokio::test]
    async fn test_places_near_related_note() {
        let placer = table_placer(LayoutConfig::default());
        let mut draft = NewNode::new("find the treasure map").at(-1.0, -1.0);

        let proposal = placer.place(&mut draft, existing()).await.unwrap();

        assert_eq!(proposal.related_to, Some(1));
        assert_eq!((draft.x, draft.y), (proposal.x, proposal.y));
        assert_eq!(placer.metrics().snapshot().placed, 1);
    }

    #[tokio::test]
    async fn test_disabled_keeps_position() {
        let placer = table_placer(LayoutConfig {
            enabled: false,
            ..LayoutConfig::default()
        });
        let mut draft = NewNode::new("find the treasure map").at(5.0, 6.0);

        assert!(placer.place(&mut draft, existing()).await.is_none());
        assert_eq!((draft.x, draft.y), (5.0, 6.0));
        assert_eq!(placer.metrics().snapshot().skipped_disabled, 1);
        assert!(!placer.clusterer().is_loaded());
    }

    #[tokio::test]
    async fn test_opt_out_keeps_position() {
        let placer = table_placer(LayoutConfig::default());
        let mut draft = NewNode::new("find the treasure map").at(5.0, 6.0).without_semantic();
        assert!(placer.place(&mut draft, existing()).await.is_none());

        let mut empty = NewNode::new("");
        assert!(placer.place(&mut empty, existing()).await.is_none());

        assert_eq!(placer.metrics().snapshot().skipped_not_requested, 2);
        assert_eq!((draft.x, draft.y), (5.0, 6.0));
    }

    #[tokio::test]
    async fn test_short_text_keeps_position() {
        let placer = table_placer(LayoutConfig::default());
        let mut draft = NewNode::new(" ok ").at(5.0, 6.0);
        assert!(placer.place(&mut draft, existing()).await.is_none());
        assert_eq!(placer.metrics().snapshot().skipped_short_text, 1);
    }

    #[tokio::test]
    async fn test_short_text_uses_configured_minimum() {
        let model = Arc::new(
            TableEmbedder::new(2)
                .with("find the treasure map", vec![1.0, 0.0])
                .with("search for buried gold", vec![0.8, 0.6]),
        );
        let config = LayoutConfig {
            min_text_length: 25,
            ..LayoutConfig::default()
        };
        let placer =
            SemanticPlacer::new(SharedClusterer::with_model(config, model.clone()).unwrap());
        let mut draft = NewNode::new("  find the treasure map  ").at(5.0, 6.0);

        assert!(placer.place(&mut draft, existing()).await.is_none());
        assert_eq!(placer.metrics().snapshot().skipped_short_text, 1);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_match_keeps_position() {
        let placer = table_placer(LayoutConfig::default());
        let mut draft = NewNode::new("never seen before").at(5.0, 6.0);
        assert!(placer.place(&mut draft, existing()).await.is_none());
        assert_eq!((draft.x, draft.y), (5.0, 6.0));
        assert_eq!(placer.metrics().snapshot().no_match, 1);
    }

    #[tokio::test]
    async fn test_timeout_keeps_position() {
        let config = LayoutConfig {
            timeout_ms: 50,
            ..LayoutConfig::default()
        };
        let clusterer = SharedClusterer::with_model(config, Arc::new(SlowModel { info: info() })).unwrap();
        let placer = SemanticPlacer::new(clusterer);
        let mut draft = NewNode::new("find the treasure map").at(5.0, 6.0);

        assert!(placer.place(&mut draft, existing()).await.is_none());
        assert_eq!((draft.x, draft.y), (5.0, 6.0));
        assert_eq!(placer.metrics().snapshot().skipped_timeout, 1);
    }

    #[tokio::test]
    async fn test_worker_panic_keeps_position() {
        let clusterer = SharedClusterer::with_model(
            LayoutConfig::default(),
            Arc::new(PanickingModel { info: info() }),
        )
        .unwrap();
        let placer = SemanticPlacer::new(clusterer);
        let mut draft = NewNode::new("find the treasure map").at(5.0, 6.0);

        assert!(placer.place(&mut draft, existing()).await.is_none());
        assert_eq!((draft.x, draft.y), (5.0, 6.0));

        let metrics = placer.metrics().snapshot();
        assert_eq!(metrics.skipped_error, 1);
        assert_eq!(metrics.placed, 0);
    }
}
