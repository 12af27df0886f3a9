//! # hunt-service
//!
//! Operations behind the Hunt Console: hunts, their journal logs and canvas
//! nodes, plus semantic placement and cluster analysis of a hunt's notes.
//!
//! Node creation asks the layout engine for a position on a blocking worker,
//! bounded by a timeout. Any failure there keeps the caller's coordinates;
//! placement never stops a node from being stored.

pub mod error;
pub mod placement;
pub mod service;

pub use error::ServiceError;
pub use placement::{PlacementMetrics, PlacementMetricsSnapshot, SemanticPlacer};
pub use service::{HealthStatus, HuntService, SemanticAnalysis};
