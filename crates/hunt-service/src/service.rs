//! Hunt, node and log operations.

use std::sync::Arc;

use chrono::Utc;
use hunt_layout::{Cluster, PlacementProposal, SharedClusterer};
use hunt_storage::{RecordKind, Storage, StorageStats};
use hunt_types::{
    Hunt, HuntId, HuntLog, HuntNode, HuntPatch, LogId, LogPatch, NewHunt, NewLog, NewNode,
    NodeId, NodePatch, NodeSnapshot,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::ServiceError;
use crate::placement::SemanticPlacer;

/// Clusters found among a hunt's nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticAnalysis {
    pub clusters: Vec<Cluster>,
    pub total_nodes: usize,
    /// Nodes that ended up in some cluster
    pub clustered_nodes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Entry point for every hunt console operation.
pub struct HuntService {
    storage: Arc<Storage>,
    placer: SemanticPlacer,
}

impl HuntService {
    pub fn new(storage: Arc<Storage>, clusterer: SharedClusterer) -> Self {
        Self {
            storage,
            placer: SemanticPlacer::new(clusterer),
        }
    }

    pub fn placer(&self) -> &SemanticPlacer {
        &self.placer
    }

    fn require_hunt(&self, hunt_id: HuntId) -> Result<Hunt, ServiceError> {
        self.storage
            .get_hunt(hunt_id)?
            .ok_or_else(|| ServiceError::hunt_not_found(hunt_id))
    }

    // ==================== Hunts ====================

    pub fn list_hunts(&self) -> Result<Vec<Hunt>, ServiceError> {
        Ok(self.storage.list_hunts()?)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub fn create_hunt(&self, draft: NewHunt) -> Result<Hunt, ServiceError> {
        if draft.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("hunt name is required".to_string()));
        }

        let hunt = Hunt::from_draft(self.storage.next_id(RecordKind::Hunt), draft, Utc::now());
        self.storage.put_hunt(&hunt)?;
        info!(hunt_id = hunt.id, "Created hunt");
        Ok(hunt)
    }

    pub fn get_hunt(&self, hunt_id: HuntId) -> Result<Hunt, ServiceError> {
        self.require_hunt(hunt_id)
    }

    #[instrument(skip(self, patch))]
    pub fn update_hunt(&self, hunt_id: HuntId, patch: HuntPatch) -> Result<Hunt, ServiceError> {
        if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
            return Err(ServiceError::InvalidInput("hunt name cannot be empty".to_string()));
        }

        let mut hunt = self.require_hunt(hunt_id)?;
        hunt.apply(patch, Utc::now());
        self.storage.put_hunt(&hunt)?;
        Ok(hunt)
    }

    /// Delete a hunt along with its logs and nodes.
    #[instrument(skip(self))]
    pub fn delete_hunt(&self, hunt_id: HuntId) -> Result<(), ServiceError> {
        if !self.storage.delete_hunt(hunt_id)? {
            return Err(ServiceError::hunt_not_found(hunt_id));
        }
        info!("Deleted hunt");
        Ok(())
    }

    // ==================== Nodes ====================

    /// Nodes of a hunt in creation order. Unknown hunts have no nodes.
    pub fn list_nodes(&self, hunt_id: HuntId) -> Result<Vec<HuntNode>, ServiceError> {
        Ok(self.storage.get_nodes_for_hunt(hunt_id)?)
    }

    fn snapshots(&self, hunt_id: HuntId) -> Result<Vec<NodeSnapshot>, ServiceError> {
        Ok(self
            .list_nodes(hunt_id)?
            .iter()
            .map(NodeSnapshot::from)
            .collect())
    }

    /// Create a node, placing it near related notes when asked to.
    ///
    /// Placement never fails the call; without a proposal the node keeps the
    /// requested coordinates.
    #[instrument(skip(self, draft))]
    pub async fn create_node(
        &self,
        hunt_id: HuntId,
        mut draft: NewNode,
    ) -> Result<HuntNode, ServiceError> {
        self.require_hunt(hunt_id)?;

        let existing = self.snapshots(hunt_id)?;
        self.placer.place(&mut draft, existing).await;

        let node = HuntNode::from_draft(
            self.storage.next_id(RecordKind::Node),
            hunt_id,
            draft,
            Utc::now(),
        );
        self.storage.put_node(&node)?;
        debug!(node_id = node.id, x = node.x, y = node.y, "Created node");
        Ok(node)
    }

    #[instrument(skip(self, patch))]
    pub fn update_node(&self, node_id: NodeId, patch: NodePatch) -> Result<HuntNode, ServiceError> {
        let mut node = self
            .storage
            .get_node(node_id)?
            .ok_or_else(|| ServiceError::node_not_found(node_id))?;
        node.apply(patch, Utc::now());
        self.storage.put_node(&node)?;
        Ok(node)
    }

    #[instrument(skip(self))]
    pub fn delete_node(&self, node_id: NodeId) -> Result<(), ServiceError> {
        if !self.storage.delete_node(node_id)? {
            return Err(ServiceError::node_not_found(node_id));
        }
        Ok(())
    }

    // ==================== Logs ====================

    /// Logs of a hunt, newest first.
    pub fn list_logs(&self, hunt_id: HuntId) -> Result<Vec<HuntLog>, ServiceError> {
        let mut logs = self.storage.get_logs_for_hunt(hunt_id)?;
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(logs)
    }

    #[instrument(skip(self, draft))]
    pub fn create_log(&self, hunt_id: HuntId, draft: NewLog) -> Result<HuntLog, ServiceError> {
        self.require_hunt(hunt_id)?;

        let log = HuntLog::from_draft(
            self.storage.next_id(RecordKind::Log),
            hunt_id,
            draft,
            Utc::now(),
        );
        self.storage.put_log(&log)?;
        Ok(log)
    }

    #[instrument(skip(self, patch))]
    pub fn update_log(&self, log_id: LogId, patch: LogPatch) -> Result<HuntLog, ServiceError> {
        let mut log = self
            .storage
            .get_log(log_id)?
            .ok_or_else(|| ServiceError::log_not_found(log_id))?;
        log.apply(patch);
        self.storage.put_log(&log)?;
        Ok(log)
    }

    #[instrument(skip(self))]
    pub fn delete_log(&self, log_id: LogId) -> Result<(), ServiceError> {
        if !self.storage.delete_log(log_id)? {
            return Err(ServiceError::log_not_found(log_id));
        }
        Ok(())
    }

    // ==================== Semantic layout ====================

    /// Group a hunt's nodes into similarity clusters.
    #[instrument(skip(self))]
    pub async fn semantic_analysis(&self, hunt_id: HuntId) -> Result<SemanticAnalysis, ServiceError> {
        let snapshots = self.snapshots(hunt_id)?;
        let total_nodes = snapshots.len();
        let clusterer = self.placer.clusterer().clone();

        let clusters = tokio::task::spawn_blocking(move || clusterer.analyze(&snapshots))
            .await
            .map_err(|e| ServiceError::Internal(format!("cluster analysis failed: {}", e)))?;

        let clustered_nodes = clusters.iter().map(|c| c.nodes.len()).sum();
        info!(total_nodes, clustered_nodes, clusters = clusters.len(), "Semantic analysis");

        Ok(SemanticAnalysis {
            clusters,
            total_nodes,
            clustered_nodes,
        })
    }

    /// Where a note with `text` would be placed in a hunt, without storing
    /// anything.
    pub async fn propose_position(
        &self,
        hunt_id: HuntId,
        text: &str,
    ) -> Result<Option<PlacementProposal>, ServiceError> {
        self.require_hunt(hunt_id)?;
        let existing = self.snapshots(hunt_id)?;
        Ok(self.placer.propose(text, existing).await)
    }

    // ==================== Admin ====================

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
        }
    }

    pub fn stats(&self) -> Result<StorageStats, ServiceError> {
        Ok(self.storage.get_stats()?)
    }

    pub fn compact(&self) -> Result<(), ServiceError> {
        Ok(self.storage.compact()?)
    }
}
