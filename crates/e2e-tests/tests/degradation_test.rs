//! Graceful degradation E2E tests.
//!
//! Without a usable model the console keeps working: nodes stay where they
//! were asked to go and analysis finds no clusters.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use e2e_tests::{TestHarness, BURIED_GOLD, CAMP_EAST, CAMP_NORTH, TREASURE_MAP};
use hunt_embeddings::{Embedding, EmbeddingError, EmbeddingModel, ModelInfo};
use hunt_types::{LayoutConfig, NewNode};

/// Model that takes longer than any sensible placement budget.
struct SluggishModel {
    info: ModelInfo,
}

impl SluggishModel {
    fn new() -> Self {
        Self {
            info: ModelInfo {
                name: "sluggish".to_string(),
                dimension: 2,
                max_sequence_length: 16,
            },
        }
    }
}

impl EmbeddingModel for SluggishModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, _text: &str) -> Result<Embedding, EmbeddingError> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(Embedding::new(vec![1.0, 0.0]))
    }
}

#[tokio::test]
async fn test_no_model_keeps_requested_position() {
    let harness = TestHarness::without_model();
    let hunt_id = harness.create_hunt("Offline");
    harness.pin_nodes(hunt_id, &[(BURIED_GOLD, 0.0, 0.0)]).await;

    let node = harness
        .service
        .create_node(hunt_id, NewNode::new(TREASURE_MAP).at(77.0, -12.0))
        .await
        .unwrap();

    assert_eq!((node.x, node.y), (77.0, -12.0));
}

#[tokio::test]
async fn test_no_model_analysis_is_empty() {
    let harness = TestHarness::without_model();
    let hunt_id = harness.create_hunt("Offline");
    harness
        .pin_nodes(hunt_id, &[(CAMP_NORTH, 0.0, 0.0), (CAMP_EAST, 10.0, 0.0)])
        .await;

    let analysis = harness.service.semantic_analysis(hunt_id).await.unwrap();
    assert!(analysis.clusters.is_empty());
    assert_eq!(analysis.total_nodes, 2);
    assert_eq!(analysis.clustered_nodes, 0);
}

#[tokio::test]
async fn test_no_model_proposes_nothing() {
    let harness = TestHarness::without_model();
    let hunt_id = harness.create_hunt("Offline");
    harness.pin_nodes(hunt_id, &[(BURIED_GOLD, 0.0, 0.0)]).await;

    let proposal = harness
        .service
        .propose_position(hunt_id, TREASURE_MAP)
        .await
        .unwrap();
    assert!(proposal.is_none());
}

#[tokio::test]
async fn test_short_text_is_not_placed() {
    let harness = TestHarness::new();
    let hunt_id = harness.create_hunt("Treasure");
    harness.pin_nodes(hunt_id, &[(BURIED_GOLD, 0.0, 0.0)]).await;

    let node = harness
        .service
        .create_node(hunt_id, NewNode::new(" x ").at(9.0, 9.0))
        .await
        .unwrap();

    assert_eq!((node.x, node.y), (9.0, 9.0));
    assert_eq!(harness.service.placer().metrics().snapshot().skipped_short_text, 1);
}

#[tokio::test]
async fn test_disabled_layout_skips_placement() {
    let config = LayoutConfig {
        enabled: false,
        ..Default::default()
    };
    let harness = TestHarness::with_model(config, Arc::new(e2e_tests::scenario_model()));
    let hunt_id = harness.create_hunt("Treasure");
    harness.pin_nodes(hunt_id, &[(BURIED_GOLD, 0.0, 0.0)]).await;

    let node = harness
        .service
        .create_node(hunt_id, NewNode::new(TREASURE_MAP).at(1.0, 2.0))
        .await
        .unwrap();

    assert_eq!((node.x, node.y), (1.0, 2.0));
    assert!(harness.service.placer().metrics().snapshot().skipped_disabled >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_model_times_out_and_node_is_still_created() {
    let config = LayoutConfig {
        timeout_ms: 50,
        ..Default::default()
    };
    let harness = TestHarness::with_model(config, Arc::new(SluggishModel::new()));
    let hunt_id = harness.create_hunt("Slow");
    harness.pin_nodes(hunt_id, &[("slow neighbour", 0.0, 0.0)]).await;

    let node = harness
        .service
        .create_node(hunt_id, NewNode::new("slow newcomer").at(40.0, 40.0))
        .await
        .unwrap();

    assert_eq!((node.x, node.y), (40.0, 40.0));
    assert_eq!(harness.service.list_nodes(hunt_id).unwrap().len(), 2);
    assert_eq!(harness.service.placer().metrics().snapshot().skipped_timeout, 1);
}
