//! End-to-end test infrastructure for the hunt console.
//!
//! Provides a shared TestHarness and helpers for tests that run the whole
//! path: service -> layout engine -> embedder -> storage.

use std::sync::Arc;

use hunt_embeddings::{EmbeddingModel, TableEmbedder};
use hunt_layout::SharedClusterer;
use hunt_service::HuntService;
use hunt_storage::Storage;
use hunt_types::{HuntId, HuntNode, LayoutConfig, NewHunt, NewNode, NodeSnapshot};

/// New note in the treasure scenario.
pub const TREASURE_MAP: &str = "find the treasure map";
/// Scores 0.8 against [`TREASURE_MAP`].
pub const BURIED_GOLD: &str = "search for buried gold";
/// Scores about 0.1 against [`TREASURE_MAP`].
pub const WEATHER: &str = "unrelated topic about weather";

/// Seed note for the non-transitive triple.
pub const CAMP_NORTH: &str = "camp at the north ridge";
/// Scores about 0.87 against [`CAMP_NORTH`].
pub const CAMP_EAST: &str = "camp toward the east ridge";
/// Scores about 0.87 against [`CAMP_NORTH`] but 0.5 against [`CAMP_EAST`].
pub const CAMP_WEST: &str = "camp toward the west ridge";

/// Deterministic model with hand-picked similarities.
pub fn scenario_model() -> TableEmbedder {
    TableEmbedder::new(3)
        .with(TREASURE_MAP, vec![1.0, 0.0, 0.0])
        .with(BURIED_GOLD, vec![0.8, 0.6, 0.0])
        .with(WEATHER, vec![0.1, 0.0, 0.995])
        .with(CAMP_NORTH, vec![0.0, 1.0, 0.0])
        .with(CAMP_EAST, vec![0.0, 0.866, 0.5])
        .with(CAMP_WEST, vec![0.0, 0.866, -0.5])
}

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Shared storage instance
    pub storage: Arc<Storage>,
    /// Service under test
    pub service: HuntService,
}

impl TestHarness {
    /// Harness backed by [`scenario_model`].
    pub fn new() -> Self {
        Self::with_model(LayoutConfig::default(), Arc::new(scenario_model()))
    }

    pub fn with_model(config: LayoutConfig, model: Arc<dyn EmbeddingModel>) -> Self {
        Self::build(
            SharedClusterer::with_model(config, model).expect("Invalid layout settings"),
        )
    }

    /// Harness whose layout engine has no model.
    pub fn without_model() -> Self {
        Self::build(
            SharedClusterer::disabled(LayoutConfig::default()).expect("Invalid layout settings"),
        )
    }

    fn build(clusterer: SharedClusterer) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let storage =
            Arc::new(Storage::open(temp_dir.path()).expect("Failed to open test storage"));
        let service = HuntService::new(storage.clone(), clusterer);

        Self {
            _temp_dir: temp_dir,
            storage,
            service,
        }
    }

    pub fn create_hunt(&self, name: &str) -> HuntId {
        self.service
            .create_hunt(NewHunt::new(name))
            .expect("Failed to create hunt")
            .id
    }

    /// Store notes at fixed positions, bypassing semantic placement.
    pub async fn pin_nodes(&self, hunt_id: HuntId, notes: &[(&str, f64, f64)]) -> Vec<HuntNode> {
        let mut nodes = Vec::with_capacity(notes.len());
        for (text, x, y) in notes {
            let node = self
                .service
                .create_node(hunt_id, NewNode::new(*text).at(*x, *y).without_semantic())
                .await
                .expect("Failed to create node");
            nodes.push(node);
        }
        nodes
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Euclidean distance between two canvas positions.
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

/// Whether `d` is a valid placement offset, allowing for float error.
pub fn within_ring(d: f64, min: f64, max: f64) -> bool {
    (min - 1e-9..=max + 1e-9).contains(&d)
}

/// Snapshots for direct layout-engine tests.
pub fn snapshots(notes: &[(Option<u64>, f64, f64, &str)]) -> Vec<NodeSnapshot> {
    notes
        .iter()
        .map(|(id, x, y, text)| NodeSnapshot::new(*id, *x, *y, *text))
        .collect()
}
