//! Storage errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Db(#[from] rocksdb::Error),

    /// The database was opened without one of the hunt column families
    #[error("missing column family: {0}")]
    MissingColumnFamily(String),

    #[error("malformed key: {0}")]
    BadKey(String),

    /// A stored record could not be encoded or decoded
    #[error("record codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
