//! # hunt-types
//!
//! Shared domain types for the Hunt Console.
//!
//! This crate defines the records persisted by the record store and the
//! read-only views consumed by the semantic layout engine:
//! - Hunts: research/investigation project containers
//! - Logs: journal entries tracking a hunt's progress
//! - Nodes: freeform notes placed on a hunt's 2-D canvas
//! - Node snapshots: the layout engine's view of a placed note
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use hunt_types::{NewNode, NodeSnapshot};
//!
//! let draft = NewNode::new("search for buried gold").at(10.0, 20.0);
//! assert_eq!(draft.x, 10.0);
//!
//! let snapshot = NodeSnapshot::new(Some(1), 10.0, 20.0, "search for buried gold");
//! assert!(snapshot.has_text());
//! ```

pub mod config;
pub mod error;
pub mod hunt;
pub mod log;
pub mod node;

pub use config::{LayoutConfig, Settings};
pub use error::HuntError;
pub use hunt::{Hunt, HuntId, HuntPatch, NewHunt, DEFAULT_HUNT_STATUS};
pub use log::{HuntLog, LogId, LogPatch, NewLog};
pub use node::{
    HuntNode, NewNode, NodeId, NodePatch, NodeSnapshot, NodeType, DEFAULT_NODE_HEIGHT,
    DEFAULT_NODE_WIDTH,
};
