//! Exchange request envelope.
//!
//! The envelope is the only value handed to the transport. It can only be
//! built once a signature exists.

use alloy::primitives::Address;
use serde::Serialize;

use crate::error::{SignerError, SignerResult};
use crate::identity::ActionSignature;

/// Signed request body for the gateway's `/exchange` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope<A> {
    /// Exchange the gateway should route to.
    pub exchange: String,
    pub action: A,
    /// Always true.
    pub is_frontend: bool,
    pub nonce: u64,
    pub signature: ActionSignature,
    /// Lowercase 0x-hex, `null` when trading on the signer's own account.
    pub vault_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<u64>,
}

/// Builder for [`RequestEnvelope`].
#[derive(Debug, Clone)]
pub struct RequestEnvelopeBuilder<A> {
    exchange: String,
    action: A,
    nonce: u64,
    vault_address: Option<Address>,
    expires_after: Option<u64>,
    signature: Option<ActionSignature>,
}

impl<A> RequestEnvelopeBuilder<A> {
    pub fn new(exchange: impl Into<String>, action: A, nonce: u64) -> Self {
        Self {
            exchange: exchange.into(),
            action,
            nonce,
            vault_address: None,
            expires_after: None,
            signature: None,
        }
    }

    #[must_use]
    pub fn vault_address(mut self, vault_address: Option<Address>) -> Self {
        self.vault_address = vault_address;
        self
    }

    #[must_use]
    pub fn expires_after(mut self, expires_after: Option<u64>) -> Self {
        self.expires_after = expires_after;
        self
    }

    #[must_use]
    pub fn signature(mut self, signature: ActionSignature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Assemble the envelope.
    ///
    /// # Errors
    /// Returns `SignerError::IncompleteRequest` if no signature was set.
    pub fn build(self) -> SignerResult<RequestEnvelope<A>> {
        let signature = self.signature.ok_or_else(|| {
            SignerError::IncompleteRequest("request envelope requires a signature".to_string())
        })?;

        Ok(RequestEnvelope {
            exchange: self.exchange,
            action: self.action,
            is_frontend: true,
            nonce: self.nonce,
            signature,
            vault_address: self
                .vault_address
                .map(|addr| format!("0x{}", hex::encode(addr))),
            expires_after: self.expires_after,
        })
    }
}

/// Assemble a request envelope from a caller's action and its signature.
///
/// The action is cloned; the caller's value is left untouched.
///
/// # Errors
/// Returns `SignerError::IncompleteRequest` if `signature` is `None`.
pub fn build_request_envelope<A: Clone>(
    exchange: &str,
    action: &A,
    nonce: u64,
    signature: Option<ActionSignature>,
    vault_address: Option<Address>,
) -> SignerResult<RequestEnvelope<A>> {
    let builder = RequestEnvelopeBuilder::new(exchange, action.clone(), nonce)
        .vault_address(vault_address);
    match signature {
        Some(signature) => builder.signature(signature).build(),
        None => builder.build(),
    }
}
