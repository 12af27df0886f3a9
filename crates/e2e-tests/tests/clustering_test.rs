//! Cluster analysis E2E tests.
//!
//! Clusters are greedy and anchored on their seed: a note joins the first
//! earlier unconsumed seed it scores above 0.7 against.

use pretty_assertions::assert_eq;

use e2e_tests::{TestHarness, BURIED_GOLD, CAMP_EAST, CAMP_NORTH, CAMP_WEST, TREASURE_MAP, WEATHER};

#[tokio::test]
async fn test_non_transitive_triple_forms_one_cluster() {
    let harness = TestHarness::new();
    let hunt_id = harness.create_hunt("Ridge");
    let nodes = harness
        .pin_nodes(
            hunt_id,
            &[(CAMP_NORTH, 0.0, 0.0), (CAMP_EAST, 90.0, 0.0), (CAMP_WEST, 0.0, 30.0)],
        )
        .await;

    let analysis = harness.service.semantic_analysis(hunt_id).await.unwrap();

    assert_eq!(analysis.clusters.len(), 1);
    let ids: Vec<Option<u64>> = analysis.clusters[0].nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, nodes.iter().map(|n| Some(n.id)).collect::<Vec<_>>());
    assert_eq!(analysis.clusters[0].center.x, 30.0);
    assert_eq!(analysis.clusters[0].center.y, 10.0);
    assert_eq!(analysis.clustered_nodes, 3);
}

#[tokio::test]
async fn test_seed_order_changes_grouping() {
    let harness = TestHarness::new();
    let hunt_id = harness.create_hunt("Ridge");
    harness
        .pin_nodes(
            hunt_id,
            &[(CAMP_EAST, 0.0, 0.0), (CAMP_WEST, 0.0, 0.0), (CAMP_NORTH, 0.0, 0.0)],
        )
        .await;

    let analysis = harness.service.semantic_analysis(hunt_id).await.unwrap();

    // East seeds; west scores only 0.5 against it, north joins
    assert_eq!(analysis.clusters.len(), 1);
    let texts: Vec<&str> = analysis.clusters[0]
        .nodes
        .iter()
        .map(|n| n.text.as_str())
        .collect();
    assert_eq!(texts, vec![CAMP_EAST, CAMP_NORTH]);
    assert_eq!(analysis.total_nodes, 3);
    assert_eq!(analysis.clustered_nodes, 2);
}

#[tokio::test]
async fn test_pair_centroid_is_exact() {
    let harness = TestHarness::new();
    let hunt_id = harness.create_hunt("Pair");
    harness
        .pin_nodes(hunt_id, &[(CAMP_NORTH, 0.0, 0.0), (CAMP_EAST, 10.0, 0.0)])
        .await;

    let analysis = harness.service.semantic_analysis(hunt_id).await.unwrap();

    assert_eq!(analysis.clusters.len(), 1);
    assert_eq!(analysis.clusters[0].center.x, 5.0);
    assert_eq!(analysis.clusters[0].center.y, 0.0);
}

#[tokio::test]
async fn test_no_singleton_clusters() {
    let harness = TestHarness::new();
    let hunt_id = harness.create_hunt("Mixed");
    harness
        .pin_nodes(
            hunt_id,
            &[
                (TREASURE_MAP, 0.0, 0.0),
                (WEATHER, 0.0, 0.0),
                (BURIED_GOLD, 0.0, 0.0),
                (CAMP_NORTH, 0.0, 0.0),
                ("", 0.0, 0.0),
            ],
        )
        .await;

    let analysis = harness.service.semantic_analysis(hunt_id).await.unwrap();

    assert_eq!(analysis.total_nodes, 5);
    assert!(analysis.clusters.iter().all(|c| c.nodes.len() >= 2));
    // map and gold score 0.8
    assert_eq!(analysis.clusters.len(), 1);
    assert_eq!(analysis.clustered_nodes, 2);
}

#[tokio::test]
async fn test_single_node_hunt_has_no_clusters() {
    let harness = TestHarness::new();
    let hunt_id = harness.create_hunt("Lonely");
    harness.pin_nodes(hunt_id, &[(CAMP_NORTH, 0.0, 0.0)]).await;

    let analysis = harness.service.semantic_analysis(hunt_id).await.unwrap();
    assert!(analysis.clusters.is_empty());
    assert_eq!(analysis.total_nodes, 1);
    assert_eq!(analysis.clustered_nodes, 0);
}

#[tokio::test]
async fn test_analysis_serializes_like_the_api() {
    let harness = TestHarness::new();
    let hunt_id = harness.create_hunt("Pair");
    harness
        .pin_nodes(hunt_id, &[(CAMP_NORTH, 0.0, 0.0), (CAMP_EAST, 10.0, 4.0)])
        .await;

    let analysis = harness.service.semantic_analysis(hunt_id).await.unwrap();
    let value = serde_json::to_value(&analysis).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "clusters": [{
                "nodes": [
                    {"id": 1, "x": 0.0, "y": 0.0, "text": CAMP_NORTH},
                    {"id": 2, "x": 10.0, "y": 4.0, "text": CAMP_EAST}
                ],
                "center": {"x": 5.0, "y": 2.0}
            }],
            "total_nodes": 2,
            "clustered_nodes": 2
        })
    );
}
