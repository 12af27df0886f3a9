//! Radial placement of a new note next to its closest relative.

use std::f64::consts::TAU;

use hunt_types::{LayoutConfig, NodeId, NodeSnapshot};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedder::TextEmbedder;
use crate::error::LayoutError;
use crate::similarity::SimilarityScorer;

/// Where to put a new note, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementProposal {
    pub x: f64,
    pub y: f64,
    /// Similarity to the anchoring note, in (threshold, 1]
    pub similarity: f32,
    /// Id of the anchoring note, if it had one
    pub related_to: Option<NodeId>,
}

/// Picks the most similar existing note and proposes a spot on a ring
/// around it.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    threshold: f32,
    min_distance: f64,
    max_distance: f64,
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            min_distance: 120.0,
            max_distance: 200.0,
        }
    }
}

impl PlacementEngine {
    pub fn new(threshold: f32, min_distance: f64, max_distance: f64) -> Result<Self, LayoutError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LayoutError::InvalidConfig(format!(
                "placement threshold must be 0.0-1.0, got {}",
                threshold
            )));
        }
        let finite = min_distance.is_finite() && max_distance.is_finite();
        if !finite || min_distance < 0.0 || max_distance < min_distance {
            return Err(LayoutError::InvalidConfig(format!(
                "invalid placement distance range {}..={}",
                min_distance, max_distance
            )));
        }
        Ok(Self {
            threshold,
            min_distance,
            max_distance,
        })
    }

    pub fn from_config(config: &LayoutConfig) -> Result<Self, LayoutError> {
        Self::new(
            config.placement_threshold,
            config.min_distance,
            config.max_distance,
        )
    }

    /// Propose a position for `text`, sampling the offset from the thread RNG.
    pub fn propose(
        &self,
        embedder: &TextEmbedder,
        text: &str,
        nodes: &[NodeSnapshot],
    ) -> Option<PlacementProposal> {
        self.propose_with_rng(embedder, text, nodes, &mut rand::rng())
    }

    /// Propose a position for `text` using the given random source.
    ///
    /// Returns `None` when there are no nodes, no model, or no node whose
    /// similarity strictly exceeds the threshold. Among equally similar
    /// nodes the first one wins.
    pub fn propose_with_rng<R: Rng + ?Sized>(
        &self,
        embedder: &TextEmbedder,
        text: &str,
        nodes: &[NodeSnapshot],
        rng: &mut R,
    ) -> Option<PlacementProposal> {
        if nodes.is_empty() || !embedder.is_available() {
            return None;
        }

        let scorer = SimilarityScorer::new(embedder);
        let mut best: Option<(&NodeSnapshot, f32)> = None;

        for node in nodes.iter().filter(|n| n.has_text()) {
            let sim = scorer.similarity(text, &node.text);
            let best_sim = best.map_or(0.0, |(_, s)| s);
            if sim > best_sim && sim > self.threshold {
                best = Some((node, sim));
            }
        }

        let Some((anchor, similarity)) = best else {
            debug!(candidates = nodes.len(), "No note similar enough to anchor");
            return None;
        };

        let angle = rng.random_range(0.0..TAU);
        let distance = rng.random_range(self.min_distance..=self.max_distance);

        info!(
            related_to = ?anchor.id,
            similarity,
            distance,
            "Placing note near related note"
        );

        Some(PlacementProposal {
            x: anchor.x + angle.cos() * distance,
            y: anchor.y + angle.sin() * distance,
            similarity,
            related_to: anchor.id,
        })
    }
}
