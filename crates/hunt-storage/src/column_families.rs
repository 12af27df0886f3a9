//! Column family definitions for RocksDB.
//!
//! - hunts: hunt records keyed by hunt id
//! - hunt_logs: journal entries keyed by log id
//! - hunt_nodes: canvas nodes keyed by node id
//! - hunt_index: hunt -> log/node membership, for hunt-scoped queries

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for hunts
pub const CF_HUNTS: &str = "hunts";

/// Column family name for hunt journal entries
pub const CF_LOGS: &str = "hunt_logs";

/// Column family name for canvas nodes
pub const CF_NODES: &str = "hunt_nodes";

/// Column family name for the hunt membership index
pub const CF_HUNT_INDEX: &str = "hunt_index";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_HUNTS, CF_LOGS, CF_NODES, CF_HUNT_INDEX];

/// Options for record column families (JSON values, compressed)
fn record_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_HUNTS, record_options()),
        ColumnFamilyDescriptor::new(CF_LOGS, record_options()),
        ColumnFamilyDescriptor::new(CF_NODES, record_options()),
        ColumnFamilyDescriptor::new(CF_HUNT_INDEX, Options::default()),
    ]
}
