//! Canvas nodes and the read-only snapshots the layout engine works on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hunt::HuntId;

/// Identifier assigned to a node by the record store.
pub type NodeId = u64;

pub const DEFAULT_NODE_WIDTH: f64 = 200.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 50.0;

fn default_width() -> f64 {
    DEFAULT_NODE_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_NODE_HEIGHT
}

fn default_true() -> bool {
    true
}

/// Kind of note on the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Written by the hunter
    #[default]
    Note,
    /// Produced by a language model
    Llm,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Note => write!(f, "note"),
            NodeType::Llm => write!(f, "llm"),
        }
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(NodeType::Note),
            "llm" => Ok(NodeType::Llm),
            other => Err(format!("unknown node type: {}", other)),
        }
    }
}

/// A freeform note placed on a hunt's canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuntNode {
    pub id: NodeId,

    /// Owning hunt
    pub hunt_id: HuntId,

    pub x: f64,
    pub y: f64,

    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    pub text: String,

    #[serde(rename = "type", default)]
    pub node_type: NodeType,

    /// Ids of nodes this one is linked to
    #[serde(default)]
    pub connections: Vec<NodeId>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl HuntNode {
    /// Build a node record from a creation request.
    ///
    /// `x`/`y` are taken from the draft; semantic placement, when it applies,
    /// rewrites the draft before this is called.
    pub fn from_draft(id: NodeId, hunt_id: HuntId, draft: NewNode, now: DateTime<Utc>) -> Self {
        Self {
            id,
            hunt_id,
            x: draft.x,
            y: draft.y,
            width: draft.width,
            height: draft.height,
            text: draft.text,
            node_type: draft.node_type,
            connections: draft.connections,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Absent fields keep their current value.
    pub fn apply(&mut self, patch: NodePatch, now: DateTime<Utc>) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(node_type) = patch.node_type {
            self.node_type = node_type;
        }
        if let Some(connections) = patch.connections {
            self.connections = connections;
        }
        self.updated_at = now;
    }

    /// Read-only view for the layout engine.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot::from(self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Request to create a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    /// Fallback position, used when semantic placement has no proposal
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,

    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,

    #[serde(default)]
    pub text: String,

    #[serde(rename = "type", default)]
    pub node_type: NodeType,

    #[serde(default)]
    pub connections: Vec<NodeId>,

    /// Ask the layout engine to place the node near related notes
    #[serde(rename = "use_semantic", default = "default_true")]
    pub use_semantic: bool,
}

impl NewNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
            text: text.into(),
            node_type: NodeType::default(),
            connections: Vec::new(),
            use_semantic: true,
        }
    }

    /// Set the fallback position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Disable semantic placement for this node
    pub fn without_semantic(mut self) -> Self {
        self.use_semantic = false;
        self
    }
}

/// Partial update of a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub connections: Option<Vec<NodeId>>,
}

/// Read-only view of a placed note.
///
/// `id` is absent for nodes that have not been stored yet. The layout engine
/// never mutates a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    #[serde(default)]
    pub id: Option<NodeId>,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: String,
}

impl NodeSnapshot {
    pub fn new(id: Option<NodeId>, x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            id,
            x,
            y,
            text: text.into(),
        }
    }

    /// Whether the note carries any text at all.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

impl From<&HuntNode> for NodeSnapshot {
    fn from(node: &HuntNode) -> Self {
        Self {
            id: Some(node.id),
            x: node.x,
            y: node.y,
            text: node.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_defaults() {
        let draft: NewNode = serde_json::from_str(r#"{"text":"search for buried gold"}"#).unwrap();
        assert!(draft.use_semantic);
        assert_eq!(draft.width, DEFAULT_NODE_WIDTH);
        assert_eq!(draft.height, DEFAULT_NODE_HEIGHT);
        assert_eq!(draft.node_type, NodeType::Note);
        assert_eq!((draft.x, draft.y), (0.0, 0.0));
    }

    #[test]
    fn test_use_semantic_can_be_disabled() {
        let draft: NewNode =
            serde_json::from_str(r#"{"text":"x marks the spot","use_semantic":false,"type":"llm"}"#)
                .unwrap();
        assert!(!draft.use_semantic);
        assert_eq!(draft.node_type, NodeType::Llm);
    }

    #[test]
    fn test_node_type_serializes_as_type_field() {
        let draft = NewNode {
            node_type: NodeType::Llm,
            ..NewNode::new("ask the model")
        };
        let node = HuntNode::from_draft(5, 1, draft, Utc::now());
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "llm");
        assert_eq!(value["huntId"], 1);
    }

    #[test]
    fn test_snapshot_from_node() {
        let node = HuntNode::from_draft(9, 1, NewNode::new("old well").at(3.0, 4.0), Utc::now());
        let snapshot = node.snapshot();
        assert_eq!(snapshot, NodeSnapshot::new(Some(9), 3.0, 4.0, "old well"));
    }

    #[test]
    fn test_apply_patch() {
        let mut node = HuntNode::from_draft(1, 1, NewNode::new("old well"), Utc::now());
        node.apply(
            NodePatch {
                x: Some(50.0),
                connections: Some(vec![2, 3]),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(node.x, 50.0);
        assert_eq!(node.y, 0.0);
        assert_eq!(node.text, "old well");
        assert_eq!(node.connections, vec![2, 3]);
    }

    #[test]
    fn test_snapshot_without_text() {
        let snapshot = NodeSnapshot::new(None, 0.0, 0.0, "");
        assert!(!snapshot.has_text());
    }

    #[test]
    fn test_node_type_from_str() {
        assert_eq!("llm".parse::<NodeType>().unwrap(), NodeType::Llm);
        assert!("sketch".parse::<NodeType>().is_err());
    }
}
