//! Service error types.

use hunt_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Referenced record does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    /// Request rejected before touching storage
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A background worker died
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn hunt_not_found(id: u64) -> Self {
        ServiceError::NotFound { kind: "hunt", id }
    }

    pub fn node_not_found(id: u64) -> Self {
        ServiceError::NotFound { kind: "node", id }
    }

    pub fn log_not_found(id: u64) -> Self {
        ServiceError::NotFound { kind: "log", id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}
