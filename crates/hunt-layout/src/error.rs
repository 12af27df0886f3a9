//! Layout error types.
//!
//! Placement and clustering never fail; these errors only come from
//! building a layout component out of bad settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    /// Invalid configuration
    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),
}
