//! Error types for intelayer-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unsupported action value: {0}")]
    UnsupportedValue(String),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
