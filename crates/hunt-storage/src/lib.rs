//! Storage layer for the hunt console.
//!
//! Provides RocksDB-backed storage with:
//! - Column family isolation for hunts, logs and nodes
//! - Zero-padded integer keys for ordered scans
//! - A hunt-scoped index for foreign-key queries
//! - Atomic cascade deletes via WriteBatch

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;

pub use db::{Storage, StorageStats};
pub use error::StorageError;
pub use keys::{IndexKey, RecordKey, RecordKind};
