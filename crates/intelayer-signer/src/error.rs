//! Signing pipeline error types.

use thiserror::Error;

use intelayer_core::CoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The action holds a value with no canonical encoding.
    #[error("Action encoding failed: {0}")]
    Encoding(String),

    /// The vault address is not exactly 20 bytes.
    #[error("Invalid vault address: {0}")]
    InvalidVaultAddress(String),

    /// The signing identity declined the request.
    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    /// No signing identity is configured, or it could not be reached.
    #[error("Signing unavailable: {0}")]
    SigningUnavailable(String),

    /// A request envelope was assembled without a signature.
    #[error("Incomplete request: {0}")]
    IncompleteRequest(String),
}

impl From<CoreError> for SignerError {
    fn from(e: CoreError) -> Self {
        SignerError::Encoding(e.to_string())
    }
}

pub type SignerResult<T> = Result<T, SignerError>;
