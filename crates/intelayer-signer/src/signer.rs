//! Action signing.
//!
//! Implements the 2-stage signing process:
//! 1. Calculate `action_hash` from action + nonce + vault_address (+ expiry)
//! 2. Sign the phantom agent wrapping that hash using EIP-712
//!
//! `connect` and `approveAgent` skip stage 1: their typed data is signed
//! directly, and neither signature covers a vault address or an expiry.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::debug;

use intelayer_core::{ApproveAgent, ConnectAgent, Network};

use crate::canonical::{serialize, CanonicalAction, SigningScheme};
use crate::error::{SignerError, SignerResult};
use crate::hash::{build_hash_with_expiry, SigningInput};
use crate::identity::{ActionSignature, SigningIdentity};
use crate::request::{RequestEnvelope, RequestEnvelopeBuilder};
use crate::typed_data::{build_envelope, ApproveAgentEnvelope, SigningPayload, TypedDataEnvelope};

fn require_identity(identity: Option<&dyn SigningIdentity>) -> SignerResult<&dyn SigningIdentity> {
    identity.ok_or_else(|| SignerError::SigningUnavailable("no signing identity configured".to_string()))
}

fn reject_uncovered(
    action_type: &str,
    vault_address: Option<Address>,
    expires_after: Option<u64>,
) -> SignerResult<()> {
    if vault_address.is_some() {
        return Err(SignerError::Encoding(format!(
            "vault address is not covered by the {action_type} signature"
        )));
    }
    if expires_after.is_some() {
        return Err(SignerError::Encoding(format!(
            "expiresAfter is not covered by the {action_type} signature"
        )));
    }
    Ok(())
}

fn approve_agent_payload(
    action: &ApproveAgent,
    nonce: u64,
    network: Network,
) -> SignerResult<SigningPayload> {
    if action.nonce != nonce {
        return Err(SignerError::Encoding(format!(
            "approveAgent nonce {} does not match request nonce {nonce}",
            action.nonce
        )));
    }
    if action.hyperliquid_chain != network.chain_name() {
        return Err(SignerError::Encoding(format!(
            "approveAgent for {} cannot be signed on {network}",
            action.hyperliquid_chain
        )));
    }
    Ok(ApproveAgentEnvelope::new(action).into())
}

/// Build the typed data an action is signed as.
///
/// # Errors
/// Returns `SignerError::Encoding` if the action cannot be serialized, or if a
/// vault address or expiry is given for an action whose signature does not
/// cover them. Returns `SignerError::InvalidVaultAddress` for a malformed vault.
pub fn signing_payload<A: CanonicalAction>(
    action: &A,
    nonce: u64,
    vault_address: Option<Address>,
    expires_after: Option<u64>,
    network: Network,
) -> SignerResult<SigningPayload> {
    match action.signing_scheme() {
        SigningScheme::Hashed => {
            let bytes = serialize(action)?;
            let action_hash = build_hash_with_expiry(
                &bytes,
                nonce,
                vault_address.as_ref().map(|a| a.as_slice()),
                expires_after,
            )?;
            debug!(nonce, %action_hash, has_vault = vault_address.is_some(), "action hash built");
            Ok(build_envelope(action_hash, network).into())
        }
        SigningScheme::Connect(agent) => {
            reject_uncovered("connect", vault_address, expires_after)?;
            Ok(TypedDataEnvelope::for_connect(agent, network).into())
        }
        SigningScheme::ApproveAgent(approve) => {
            reject_uncovered("approveAgent", vault_address, expires_after)?;
            approve_agent_payload(approve, nonce, network)
        }
    }
}

/// Ask `identity` to sign the digest of `payload`.
///
/// # Errors
/// Returns `SignerError::SigningRejected` or `SignerError::SigningUnavailable`
/// as reported by the identity. Neither is retried.
pub async fn sign_envelope(
    payload: &SigningPayload,
    identity: &dyn SigningIdentity,
) -> SignerResult<ActionSignature> {
    let digest = payload.signing_hash();
    debug!(
        chain_id = payload.domain().chain_id,
        primary_type = payload.primary_type(),
        digest = %digest,
        "requesting signature"
    );
    // NOTE: Do not log the signature
    Ok(identity.sign_digest(digest).await?)
}

/// Sign an action on `network`.
///
/// Hashed actions go through the action hash and phantom agent; `connect` and
/// `approveAgent` are signed directly, the same way [`ActionSigner::sign`]
/// does.
///
/// # Errors
/// Returns `SignerError::SigningUnavailable` if `identity` is `None`,
/// `SignerError::Encoding` if the action cannot be serialized or carries a
/// vault it cannot be signed with, and any error reported by the identity.
pub async fn sign_action<A: CanonicalAction>(
    action: &A,
    nonce: u64,
    vault_address: Option<Address>,
    network: Network,
    identity: Option<&dyn SigningIdentity>,
) -> SignerResult<ActionSignature> {
    let identity = require_identity(identity)?;
    let payload = signing_payload(action, nonce, vault_address, None, network)?;
    sign_envelope(&payload, identity).await
}

/// Sign an agent approval (`connect`).
///
/// # Errors
/// Returns `SignerError::SigningUnavailable` if `identity` is `None`, and any
/// error reported by the identity.
pub async fn sign_connect(
    agent: &ConnectAgent,
    network: Network,
    identity: Option<&dyn SigningIdentity>,
) -> SignerResult<ActionSignature> {
    let identity = require_identity(identity)?;
    let payload = TypedDataEnvelope::for_connect(agent, network).into();
    sign_envelope(&payload, identity).await
}

/// Signer bound to a network and an optional identity.
///
/// Holds no per-request state, so one instance can sign many actions
/// concurrently.
#[derive(Clone)]
pub struct ActionSigner {
    identity: Option<Arc<dyn SigningIdentity>>,
    network: Network,
}

impl std::fmt::Debug for ActionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSigner")
            .field("address", &self.address())
            .field("network", &self.network)
            .finish()
    }
}

impl ActionSigner {
    pub fn new(identity: Arc<dyn SigningIdentity>, network: Network) -> Self {
        Self {
            identity: Some(identity),
            network,
        }
    }

    /// A signer with no identity; every signing call fails with
    /// `SignerError::SigningUnavailable`.
    pub fn unconfigured(network: Network) -> Self {
        Self {
            identity: None,
            network,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn address(&self) -> Option<Address> {
        self.identity.as_ref().map(|identity| identity.address())
    }

    /// The typed data that [`ActionSigner::sign`] would ask the identity to sign.
    ///
    /// # Errors
    /// See [`signing_payload`].
    pub fn typed_data<A: CanonicalAction>(
        &self,
        input: &SigningInput<A>,
    ) -> SignerResult<SigningPayload> {
        signing_payload(
            &input.action,
            input.nonce,
            input.vault_address,
            input.expires_after,
            self.network,
        )
    }

    /// Sign an action, dispatching agent approvals to the direct path.
    ///
    /// # Errors
    /// See [`sign_action`].
    pub async fn sign<A: CanonicalAction>(
        &self,
        input: &SigningInput<A>,
    ) -> SignerResult<ActionSignature> {
        let identity = require_identity(self.identity.as_deref())?;
        let payload = self.typed_data(input)?;
        debug!(
            action = input.action.action_type().unwrap_or("unknown"),
            nonce = input.nonce,
            network = %self.network,
            "signing action"
        );
        sign_envelope(&payload, identity).await
    }

    /// Sign an action and assemble its request envelope.
    ///
    /// Nothing is built when signing fails.
    ///
    /// # Errors
    /// See [`ActionSigner::sign`].
    pub async fn sign_request<A: CanonicalAction>(
        &self,
        exchange: &str,
        input: SigningInput<A>,
    ) -> SignerResult<RequestEnvelope<A>> {
        let signature = self.sign(&input).await?;
        RequestEnvelopeBuilder::new(exchange, input.action, input.nonce)
            .vault_address(input.vault_address)
            .expires_after(input.expires_after)
            .signature(signature)
            .build()
    }
}
