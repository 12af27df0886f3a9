//! Error type for loading hunt console settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HuntError {
    /// A config source could not be read, or it holds invalid values
    #[error("invalid configuration: {0}")]
    Config(String),
}
