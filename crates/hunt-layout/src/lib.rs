//! # hunt-layout
//!
//! Semantic layout engine for the Hunt Console canvas.
//!
//! Given a new note and the notes already on a hunt's canvas, the engine
//! proposes a position next to the most related note, so that notes about
//! the same thing end up near each other. It can also group an existing set
//! of notes into similarity clusters.
//!
//! ## Components
//! - [`TextEmbedder`]: text to `Option<Embedding>`, never an error
//! - [`SimilarityScorer`]: cosine similarity clamped to [0, 1]
//! - [`PlacementEngine`]: radial placement near the best match
//! - [`ClusterAnalyzer`]: greedy, seed-anchored grouping
//! - [`SemanticClusterer`] / [`SharedClusterer`]: the facade and its
//!   lazily loaded, shared handle
//!
//! Every failure (missing model, short text, encoding error, numeric
//! trouble) degrades to "no embedding" or a similarity of 0.0 and is
//! reported through `tracing`.

pub mod cluster;
pub mod clusterer;
pub mod embedder;
pub mod error;
pub mod placement;
pub mod similarity;

pub use cluster::{centroid, Cluster, ClusterAnalyzer, Point};
pub use clusterer::{SemanticClusterer, SharedClusterer};
pub use embedder::{long_enough, TextEmbedder};
pub use error::LayoutError;
pub use placement::{PlacementEngine, PlacementProposal};
pub use similarity::{clamped_cosine, SimilarityScorer};
