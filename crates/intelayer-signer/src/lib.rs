//! Exchange action signing pipeline.
//!
//! Turns an action into a signed request envelope:
//!
//! 1. [`canonical::serialize`] encodes the action as named-map MessagePack.
//! 2. [`hash::build_hash`] appends the nonce and vault marker and hashes with keccak256.
//! 3. [`typed_data::build_envelope`] wraps the hash in a phantom agent for EIP-712.
//!    `connect` and `approveAgent` skip steps 1-2 and are signed directly.
//! 4. A [`SigningIdentity`] signs the digest.
//! 5. [`request::RequestEnvelopeBuilder`] assembles the body posted to the exchange.
//!
//! [`ActionSigner`] runs the whole sequence.

pub mod canonical;
pub mod error;
pub mod hash;
pub mod identity;
pub mod key;
pub mod nonce;
pub mod request;
pub mod signer;
pub mod typed_data;

pub use canonical::{serialize, CanonicalAction, SigningScheme};
pub use error::{SignerError, SignerResult};
pub use hash::{build_hash, build_hash_with_expiry, parse_vault_address, SigningInput};
pub use identity::{ActionSignature, BoxFuture, IdentityError, LocalIdentity, SigningIdentity};
pub use key::{KeyError, KeySource};
pub use nonce::{Clock, MonotonicNonces, NonceSource, SystemClock};
pub use request::{build_request_envelope, RequestEnvelope, RequestEnvelopeBuilder};
pub use signer::{sign_action, sign_connect, sign_envelope, signing_payload, ActionSigner};
pub use typed_data::{
    build_envelope, ApproveAgentEnvelope, ApproveAgentMessage, PhantomAgent, SigningPayload,
    TypedDataDomain, TypedDataEnvelope,
};
