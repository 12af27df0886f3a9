//! RocksDB wrapper for hunt console storage.
//!
//! Provides:
//! - Database open with column family setup
//! - Monotonic id assignment per record kind
//! - CRUD for hunts, logs and nodes
//! - Hunt-scoped queries through the membership index
//! - Cascade delete of a hunt's logs and nodes in one WriteBatch

use rocksdb::{ColumnFamily, Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument, warn};

use hunt_types::{Hunt, HuntId, HuntLog, HuntNode, LogId, NodeId};

use crate::column_families::{
    build_cf_descriptors, ALL_CF_NAMES, CF_HUNTS, CF_HUNT_INDEX, CF_LOGS, CF_NODES,
};
use crate::error::StorageError;
use crate::keys::{IndexKey, RecordKey, RecordKind};

/// Main storage interface for the hunt console
pub struct Storage {
    db: DB,
    hunt_sequence: AtomicU64,
    log_sequence: AtomicU64,
    node_sequence: AtomicU64,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(2);

        let cf_descriptors = build_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        // Ids continue after the highest stored key
        let hunt_sequence = Self::load_sequence(&db, RecordKind::Hunt)?;
        let log_sequence = Self::load_sequence(&db, RecordKind::Log)?;
        let node_sequence = Self::load_sequence(&db, RecordKind::Node)?;

        Ok(Self {
            db,
            hunt_sequence: AtomicU64::new(hunt_sequence),
            log_sequence: AtomicU64::new(log_sequence),
            node_sequence: AtomicU64::new(node_sequence),
        })
    }

    /// Next free id for a kind. Ids start at 1.
    fn load_sequence(db: &DB, kind: RecordKind) -> Result<u64, StorageError> {
        let cf_name = kind.column_family();
        let cf = db
            .cf_handle(cf_name)
            .ok_or_else(|| StorageError::MissingColumnFamily(cf_name.to_string()))?;

        let mut iter = db.iterator_cf(&cf, IteratorMode::End);
        if let Some(result) = iter.next() {
            let (key, _) = result?;
            let record_key = RecordKey::from_bytes(&key)?;
            return Ok(record_key.id + 1);
        }
        Ok(1)
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::MissingColumnFamily(name.to_string()))
    }

    /// Reserve the next id for a record kind
    pub fn next_id(&self, kind: RecordKind) -> u64 {
        let sequence = match kind {
            RecordKind::Hunt => &self.hunt_sequence,
            RecordKind::Log => &self.log_sequence,
            RecordKind::Node => &self.node_sequence,
        };
        sequence.fetch_add(1, Ordering::SeqCst)
    }

    fn get_record(&self, kind: RecordKind, id: u64) -> Result<Option<Vec<u8>>, StorageError> {
        let cf = self.cf_handle(kind.column_family())?;
        let result = self.db.get_cf(cf, RecordKey::new(kind, id).to_bytes())?;
        Ok(result)
    }

    /// Write a hunt-owned record together with its membership entry
    fn put_scoped(
        &self,
        kind: RecordKind,
        hunt_id: HuntId,
        id: u64,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        let cf = self.cf_handle(kind.column_family())?;
        let index_cf = self.cf_handle(CF_HUNT_INDEX)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(cf, RecordKey::new(kind, id).to_bytes(), bytes);
        batch.put_cf(index_cf, IndexKey::new(hunt_id, kind, id).to_bytes(), b"");
        self.db.write(batch)?;
        Ok(())
    }

    fn delete_scoped(&self, kind: RecordKind, hunt_id: HuntId, id: u64) -> Result<(), StorageError> {
        let cf = self.cf_handle(kind.column_family())?;
        let index_cf = self.cf_handle(CF_HUNT_INDEX)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(cf, RecordKey::new(kind, id).to_bytes());
        batch.delete_cf(index_cf, IndexKey::new(hunt_id, kind, id).to_bytes());
        self.db.write(batch)?;
        Ok(())
    }

    /// Ids of a hunt's records of one kind, in id order
    fn scoped_ids(&self, hunt_id: HuntId, kind: RecordKind) -> Result<Vec<u64>, StorageError> {
        let prefix = IndexKey::kind_prefix(hunt_id, kind);
        let ids = self
            .prefix_iterator(CF_HUNT_INDEX, &prefix)?
            .into_iter()
            .map(|(key, _)| IndexKey::from_bytes(&key).map(|k| k.id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    // ==================== Hunt Methods ====================

    /// Store (insert or replace) a hunt
    #[instrument(skip(self, hunt), fields(hunt_id = hunt.id))]
    pub fn put_hunt(&self, hunt: &Hunt) -> Result<(), StorageError> {
        let cf = self.cf_handle(CF_HUNTS)?;
        let key = RecordKey::new(RecordKind::Hunt, hunt.id);
        self.db.put_cf(cf, key.to_bytes(), hunt.to_bytes()?)?;
        debug!("Stored hunt");
        Ok(())
    }

    pub fn get_hunt(&self, hunt_id: HuntId) -> Result<Option<Hunt>, StorageError> {
        match self.get_record(RecordKind::Hunt, hunt_id)? {
            Some(bytes) => Ok(Some(Hunt::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All hunts in id order
    pub fn list_hunts(&self) -> Result<Vec<Hunt>, StorageError> {
        let prefix = format!("{}:", RecordKind::Hunt.prefix());
        self.prefix_iterator(CF_HUNTS, prefix.as_bytes())?
            .into_iter()
            .map(|(_, value)| Hunt::from_bytes(&value).map_err(StorageError::from))
            .collect()
    }

    /// Delete a hunt together with all of its logs and nodes.
    ///
    /// Returns false if the hunt did not exist.
    #[instrument(skip(self))]
    pub fn delete_hunt(&self, hunt_id: HuntId) -> Result<bool, StorageError> {
        if self.get_record(RecordKind::Hunt, hunt_id)?.is_none() {
            return Ok(false);
        }

        let hunts_cf = self.cf_handle(CF_HUNTS)?;
        let index_cf = self.cf_handle(CF_HUNT_INDEX)?;

        let mut batch = WriteBatch::default();
        let mut owned = 0usize;

        for (key, _) in self.prefix_iterator(CF_HUNT_INDEX, &IndexKey::hunt_prefix(hunt_id))? {
            let index_key = IndexKey::from_bytes(&key)?;
            let record_cf = self.cf_handle(index_key.kind.column_family())?;
            batch.delete_cf(
                record_cf,
                RecordKey::new(index_key.kind, index_key.id).to_bytes(),
            );
            batch.delete_cf(index_cf, &key);
            owned += 1;
        }

        batch.delete_cf(hunts_cf, RecordKey::new(RecordKind::Hunt, hunt_id).to_bytes());
        self.db.write(batch)?;

        debug!(owned, "Deleted hunt and owned records");
        Ok(true)
    }

    // ==================== Node Methods ====================

    /// Store (insert or replace) a node
    #[instrument(skip(self, node), fields(node_id = node.id, hunt_id = node.hunt_id))]
    pub fn put_node(&self, node: &HuntNode) -> Result<(), StorageError> {
        self.put_scoped(RecordKind::Node, node.hunt_id, node.id, &node.to_bytes()?)?;
        debug!("Stored node");
        Ok(())
    }

    pub fn get_node(&self, node_id: NodeId) -> Result<Option<HuntNode>, StorageError> {
        match self.get_record(RecordKind::Node, node_id)? {
            Some(bytes) => Ok(Some(HuntNode::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Nodes of a hunt in creation (id) order
    pub fn get_nodes_for_hunt(&self, hunt_id: HuntId) -> Result<Vec<HuntNode>, StorageError> {
        let mut nodes = Vec::new();
        for node_id in self.scoped_ids(hunt_id, RecordKind::Node)? {
            match self.get_node(node_id)? {
                Some(node) => nodes.push(node),
                None => warn!(hunt_id, node_id, "Index points at missing node"),
            }
        }
        Ok(nodes)
    }

    /// Returns false if the node did not exist.
    #[instrument(skip(self))]
    pub fn delete_node(&self, node_id: NodeId) -> Result<bool, StorageError> {
        match self.get_node(node_id)? {
            Some(node) => {
                self.delete_scoped(RecordKind::Node, node.hunt_id, node_id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ==================== Log Methods ====================

    /// Store (insert or replace) a log entry
    #[instrument(skip(self, log), fields(log_id = log.id, hunt_id = log.hunt_id))]
    pub fn put_log(&self, log: &HuntLog) -> Result<(), StorageError> {
        self.put_scoped(RecordKind::Log, log.hunt_id, log.id, &log.to_bytes()?)?;
        debug!("Stored log");
        Ok(())
    }

    pub fn get_log(&self, log_id: LogId) -> Result<Option<HuntLog>, StorageError> {
        match self.get_record(RecordKind::Log, log_id)? {
            Some(bytes) => Ok(Some(HuntLog::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Log entries of a hunt in creation (id) order
    pub fn get_logs_for_hunt(&self, hunt_id: HuntId) -> Result<Vec<HuntLog>, StorageError> {
        let mut logs = Vec::new();
        for log_id in self.scoped_ids(hunt_id, RecordKind::Log)? {
            match self.get_log(log_id)? {
                Some(log) => logs.push(log),
                None => warn!(hunt_id, log_id, "Index points at missing log"),
            }
        }
        Ok(logs)
    }

    /// Returns false if the log entry did not exist.
    #[instrument(skip(self))]
    pub fn delete_log(&self, log_id: LogId) -> Result<bool, StorageError> {
        match self.get_log(log_id)? {
            Some(log) => {
                self.delete_scoped(RecordKind::Log, log.hunt_id, log_id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ==================== Low-level Access ====================

    /// Collect entries with a given prefix in a column family.
    #[allow(clippy::type_complexity)]
    pub fn prefix_iterator(
        &self,
        cf_name: &str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        let cf = self.cf_handle(cf_name)?;

        let mut results = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }

        Ok(results)
    }

    // ===== Admin Operations =====

    /// Trigger manual compaction on all column families.
    pub fn compact(&self) -> Result<(), StorageError> {
        info!("Starting full compaction...");
        for cf_name in ALL_CF_NAMES {
            if let Some(cf) = self.db.cf_handle(cf_name) {
                self.db.compact_range_cf::<&[u8], &[u8]>(cf, None, None);
            }
        }
        info!("Compaction complete");
        Ok(())
    }

    /// Get database statistics.
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        Ok(StorageStats {
            hunt_count: self.count_cf_entries(CF_HUNTS)?,
            log_count: self.count_cf_entries(CF_LOGS)?,
            node_count: self.count_cf_entries(CF_NODES)?,
            disk_usage_bytes: self.get_disk_usage(),
        })
    }

    fn count_cf_entries(&self, cf_name: &str) -> Result<u64, StorageError> {
        let cf = self.cf_handle(cf_name)?;
        let mut count = 0u64;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn get_disk_usage(&self) -> u64 {
        let mut total_size = 0u64;

        if let Ok(entries) = std::fs::read_dir(self.db.path()) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }

        total_size
    }
}

/// Statistics about the storage.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct StorageStats {
    pub hunt_count: u64,
    pub log_count: u64,
    pub node_count: u64,
    /// Total disk usage in bytes
    pub disk_usage_bytes: u64,
}
