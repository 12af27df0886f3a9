//! Greedy, seed-anchored clustering of placed notes.
//!
//! Each unconsumed note with text seeds a group; every later unconsumed note
//! scoring strictly above the threshold against that seed joins it. Members
//! are only compared with the seed, never with each other, so a group can
//! hold two notes that are not similar to one another.

use hunt_types::{LayoutConfig, NodeSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedder::TextEmbedder;
use crate::error::LayoutError;
use crate::similarity::SimilarityScorer;

/// A canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Two or more notes grouped around a common seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Seed first, then members in input order
    pub nodes: Vec<NodeSnapshot>,
    /// Arithmetic mean of member positions
    pub center: Point,
}

/// Arithmetic mean of the nodes' positions, `None` for no nodes.
pub fn centroid(nodes: &[NodeSnapshot]) -> Option<Point> {
    if nodes.is_empty() {
        return None;
    }
    let n = nodes.len() as f64;
    let (sum_x, sum_y) = nodes
        .iter()
        .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
    Some(Point {
        x: sum_x / n,
        y: sum_y / n,
    })
}

#[derive(Debug, Clone)]
pub struct ClusterAnalyzer {
    threshold: f32,
}

impl Default for ClusterAnalyzer {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}

impl ClusterAnalyzer {
    pub fn new(threshold: f32) -> Result<Self, LayoutError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LayoutError::InvalidConfig(format!(
                "cluster threshold must be 0.0-1.0, got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn from_config(config: &LayoutConfig) -> Result<Self, LayoutError> {
        Self::new(config.cluster_threshold)
    }

    /// Group `nodes` into clusters, ordered by seed position.
    ///
    /// Empty when there are fewer than two nodes or no model. Singletons are
    /// never emitted.
    pub fn analyze(&self, embedder: &TextEmbedder, nodes: &[NodeSnapshot]) -> Vec<Cluster> {
        if nodes.len() < 2 || !embedder.is_available() {
            return Vec::new();
        }

        let scorer = SimilarityScorer::new(embedder);
        let mut consumed = vec![false; nodes.len()];
        let mut clusters = Vec::new();

        for (i, seed) in nodes.iter().enumerate() {
            if consumed[i] || !seed.has_text() {
                continue;
            }
            consumed[i] = true;

            let mut members = vec![seed.clone()];
            for (j, candidate) in nodes.iter().enumerate().skip(i + 1) {
                if consumed[j] || !candidate.has_text() {
                    continue;
                }
                if scorer.similarity(&seed.text, &candidate.text) > self.threshold {
                    members.push(candidate.clone());
                    consumed[j] = true;
                }
            }

            if members.len() > 1 {
                if let Some(center) = centroid(&members) {
                    clusters.push(Cluster {
                        nodes: members,
                        center,
                    });
                }
            }
        }

        debug!(
            nodes = nodes.len(),
            clusters = clusters.len(),
            embedded = scorer.cached(),
            "Cluster analysis complete"
        );
        clusters
    }
}
