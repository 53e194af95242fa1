//! Signing identity capability.
//!
//! The pipeline never holds key material itself. It asks a [`SigningIdentity`]
//! to sign a prepared EIP-712 digest. The identity may be a local key, a
//! remote signer or a wallet waiting on user confirmation, so signing is the
//! one asynchronous, unbounded step of the pipeline. Dropping the returned
//! future abandons the request.

use std::future::Future;
use std::pin::Pin;

use alloy::primitives::{Address, PrimitiveSignature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as AlloySigner;
use serde::Serialize;
use thiserror::Error;

use crate::error::SignerError;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Why an identity did not produce a signature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The holder declined, e.g. a cancelled wallet prompt.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The identity could not be reached or cannot sign right now.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for SignerError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Rejected(reason) => SignerError::SigningRejected(reason),
            IdentityError::Unavailable(reason) => SignerError::SigningUnavailable(reason),
        }
    }
}

/// A holder of a private key able to sign 32-byte digests.
pub trait SigningIdentity: Send + Sync {
    /// Address the signatures recover to.
    fn address(&self) -> Address;

    /// Sign an EIP-712 digest.
    fn sign_digest(&self, digest: B256) -> BoxFuture<'_, Result<ActionSignature, IdentityError>>;
}

/// ECDSA signature in the exchange's wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSignature {
    /// r component, 0x-prefixed hex.
    pub r: String,
    /// s component, 0x-prefixed hex.
    pub s: String,
    /// Recovery id as 27 or 28.
    pub v: u8,
}

impl ActionSignature {
    /// Create from raw signature bytes (65 bytes: r(32) + s(32) + v(1)).
    ///
    /// Accepts v as either a parity bit (0/1) or 27/28.
    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        let v_raw = bytes[64];
        let v = if v_raw < 27 { v_raw + 27 } else { v_raw };
        Self {
            r: format!("0x{}", hex::encode(&bytes[0..32])),
            s: format!("0x{}", hex::encode(&bytes[32..64])),
            v,
        }
    }

    /// 65-byte `r || s || v` hex string, 0x-prefixed.
    pub fn to_hex(&self) -> String {
        format!(
            "0x{}{}{:02x}",
            self.r.trim_start_matches("0x"),
            self.s.trim_start_matches("0x"),
            self.v
        )
    }
}

impl From<&PrimitiveSignature> for ActionSignature {
    fn from(sig: &PrimitiveSignature) -> Self {
        Self {
            r: format!("0x{}", hex::encode(sig.r().to_be_bytes::<32>())),
            s: format!("0x{}", hex::encode(sig.s().to_be_bytes::<32>())),
            v: if sig.v() { 28 } else { 27 },
        }
    }
}

/// Identity backed by an in-process private key.
pub struct LocalIdentity {
    signer: PrivateKeySigner,
}

impl LocalIdentity {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }
}

impl std::fmt::Debug for LocalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.debug_struct("LocalIdentity")
            .field("address", &self.signer.address())
            .finish()
    }
}

impl SigningIdentity for LocalIdentity {
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn sign_digest(&self, digest: B256) -> BoxFuture<'_, Result<ActionSignature, IdentityError>> {
        Box::pin(async move {
            let signature = self
                .signer
                .sign_hash(&digest)
                .await
                .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
            Ok(ActionSignature::from(&signature))
        })
    }
}
