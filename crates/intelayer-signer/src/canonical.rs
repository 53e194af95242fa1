//! Canonical action serialization.
//!
//! Actions are encoded as MessagePack with named maps (`rmp_serde::to_vec_named`).
//! Key order is whatever the value declares: struct field order for typed
//! schemas, insertion order for [`ActionValue`]. Nothing is re-sorted.

use serde::Serialize;

use intelayer_core::{Action, ActionValue, ApproveAgent, ConnectAgent, CoreError};

use crate::error::{SignerError, SignerResult};

/// How an action is turned into a signing digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme<'a> {
    /// Msgpack action hash wrapped in a phantom agent.
    Hashed,
    /// `connect`: the agent struct is signed under the agent-connect domain.
    Connect(&'a ConnectAgent),
    /// `approveAgent`: the action itself is signed under the user-signed domain.
    ApproveAgent(&'a ApproveAgent),
}

/// An action the pipeline can encode and sign.
pub trait CanonicalAction: Serialize {
    /// Reject values that serde would encode but the exchange cannot verify.
    fn check_canonical(&self) -> Result<(), CoreError> {
        Ok(())
    }

    fn signing_scheme(&self) -> SigningScheme<'_> {
        SigningScheme::Hashed
    }

    /// Wire `type` tag, for logging.
    fn action_type(&self) -> Option<&str>;
}

impl CanonicalAction for Action {
    fn signing_scheme(&self) -> SigningScheme<'_> {
        match self {
            Action::Connect(connect) => SigningScheme::Connect(&connect.agent),
            Action::ApproveAgent(approve) => SigningScheme::ApproveAgent(approve),
            _ => SigningScheme::Hashed,
        }
    }

    fn action_type(&self) -> Option<&str> {
        Some(self.type_name())
    }
}

impl CanonicalAction for ActionValue {
    fn check_canonical(&self) -> Result<(), CoreError> {
        self.validate()?;
        match self.action_type() {
            Some(kind @ ("connect" | "approveAgent")) => Err(CoreError::UnsupportedValue(format!(
                "{kind} must be built as a typed action"
            ))),
            _ => Ok(()),
        }
    }

    fn action_type(&self) -> Option<&str> {
        ActionValue::action_type(self)
    }
}

/// Encode an action to its canonical bytes.
///
/// # Errors
/// Returns `SignerError::Encoding` if the action fails its canonical check or
/// msgpack serialization fails.
pub fn serialize<A: CanonicalAction + ?Sized>(action: &A) -> SignerResult<Vec<u8>> {
    action.check_canonical()?;
    rmp_serde::to_vec_named(action).map_err(|e| SignerError::Encoding(e.to_string()))
}
