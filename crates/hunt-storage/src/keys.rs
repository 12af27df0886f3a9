//! Key encoding and decoding for the storage layer.
//!
//! Record keys: `{kind}:{id:020}` (e.g. `node:00000000000000000042`)
//! Index keys:  `hunt:{hunt_id:020}:{kind}:{id:020}`
//!
//! Ids are zero-padded to 20 digits so lexicographic order matches numeric
//! order, which keeps RocksDB iteration in id order and lets the highest
//! stored id be read from the end of a column family.

use crate::column_families::{CF_HUNTS, CF_LOGS, CF_NODES};
use crate::error::StorageError;

/// The kind of record a key points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Hunt,
    Log,
    Node,
}

impl RecordKind {
    /// Key prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Hunt => "hunt",
            RecordKind::Log => "log",
            RecordKind::Node => "node",
        }
    }

    /// Column family holding records of this kind
    pub fn column_family(&self) -> &'static str {
        match self {
            RecordKind::Hunt => CF_HUNTS,
            RecordKind::Log => CF_LOGS,
            RecordKind::Node => CF_NODES,
        }
    }

    fn from_prefix(s: &str) -> Result<Self, StorageError> {
        match s {
            "hunt" => Ok(RecordKind::Hunt),
            "log" => Ok(RecordKind::Log),
            "node" => Ok(RecordKind::Node),
            other => Err(StorageError::BadKey(format!("Unknown record kind: {}", other))),
        }
    }
}

fn parse_id(s: &str) -> Result<u64, StorageError> {
    s.parse()
        .map_err(|e| StorageError::BadKey(format!("Invalid id {:?}: {}", s, e)))
}

/// Primary key of a stored record.
/// Format: {kind}:{id:020}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub kind: RecordKind,
    pub id: u64,
}

impl RecordKey {
    pub fn new(kind: RecordKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// Encode key to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}:{:020}", self.kind.prefix(), self.id).into_bytes()
    }

    /// Decode key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::BadKey(format!("Invalid UTF-8: {}", e)))?;

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            return Err(StorageError::BadKey(format!("Invalid record key format: {}", s)));
        }

        Ok(Self {
            kind: RecordKind::from_prefix(parts[0])?,
            id: parse_id(parts[1])?,
        })
    }
}

/// Hunt membership entry for a log or node.
/// Format: hunt:{hunt_id:020}:{kind}:{id:020}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    pub hunt_id: u64,
    pub kind: RecordKind,
    pub id: u64,
}

impl IndexKey {
    pub fn new(hunt_id: u64, kind: RecordKind, id: u64) -> Self {
        Self { hunt_id, kind, id }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "hunt:{:020}:{}:{:020}",
            self.hunt_id,
            self.kind.prefix(),
            self.id
        )
        .into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::BadKey(format!("Invalid UTF-8: {}", e)))?;

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 4 || parts[0] != "hunt" {
            return Err(StorageError::BadKey(format!("Invalid index key format: {}", s)));
        }

        Ok(Self {
            hunt_id: parse_id(parts[1])?,
            kind: RecordKind::from_prefix(parts[2])?,
            id: parse_id(parts[3])?,
        })
    }

    /// Prefix covering every entry of one kind for a hunt
    pub fn kind_prefix(hunt_id: u64, kind: RecordKind) -> Vec<u8> {
        format!("hunt:{:020}:{}:", hunt_id, kind.prefix()).into_bytes()
    }

    /// Prefix covering every entry for a hunt
    pub fn hunt_prefix(hunt_id: u64) -> Vec<u8> {
        format!("hunt:{:020}:", hunt_id).into_bytes()
    }
}
