//! Local key loading.
//!
//! Key custody is outside this crate; this is the minimal loader that turns a
//! configured key source into a [`LocalIdentity`].
//!
//! Security notes:
//! - Raw key bytes are held in `Zeroizing` buffers and wiped after parsing.
//! - Never log private key material.

use std::path::PathBuf;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::identity::LocalIdentity;

/// Source of the private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum KeySource {
    /// Load from environment variable (development).
    EnvVar { var_name: String },
    /// Load from file (production, recommend 0600 permissions).
    File { path: PathBuf },
}

/// Key loading errors.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Failed to decode hex: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Address mismatch: expected {expected}, got {actual}")]
    AddressMismatch { expected: Address, actual: Address },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a hex key (0x prefix and surrounding whitespace allowed).
fn parse_hex_key(hex_str: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let trimmed = hex_str.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    Ok(Zeroizing::new(hex::decode(digits)?))
}

impl LocalIdentity {
    /// Load a key from `source`, optionally checking the derived address.
    ///
    /// # Errors
    /// Returns `KeyError` if the source cannot be read, the key is not valid
    /// hex or not a valid secp256k1 scalar, or the address does not match.
    pub fn load(source: &KeySource, expected_address: Option<Address>) -> Result<Self, KeyError> {
        let secret = match source {
            KeySource::EnvVar { var_name } => {
                let value = Zeroizing::new(
                    std::env::var(var_name)
                        .map_err(|_| KeyError::EnvVarNotFound(var_name.clone()))?,
                );
                parse_hex_key(&value)?
            }
            KeySource::File { path } => {
                let content = Zeroizing::new(std::fs::read_to_string(path)?);
                parse_hex_key(&content)?
            }
        };
        Self::from_bytes(&secret, expected_address)
    }

    /// Build from raw key bytes.
    ///
    /// # Errors
    /// Returns `KeyError::InvalidKey` or `KeyError::AddressMismatch`.
    pub fn from_bytes(secret: &[u8], expected_address: Option<Address>) -> Result<Self, KeyError> {
        let signer =
            PrivateKeySigner::from_slice(secret).map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        if let Some(expected) = expected_address {
            if signer.address() != expected {
                return Err(KeyError::AddressMismatch {
                    expected,
                    actual: signer.address(),
                });
            }
        }

        tracing::debug!(address = %signer.address(), "loaded local signing key");
        Ok(Self::new(signer))
    }

    /// Build from a hex-encoded key.
    ///
    /// # Errors
    /// Same as [`LocalIdentity::from_bytes`], plus `KeyError::HexDecode`.
    pub fn from_hex(hex_key: &str, expected_address: Option<Address>) -> Result<Self, KeyError> {
        let secret = parse_hex_key(hex_key)?;
        Self::from_bytes(&secret, expected_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SigningIdentity;

    // Well-known test private key (DO NOT use in production)
    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_from_hex_derives_address() {
        let identity = LocalIdentity::from_hex(TEST_PRIVATE_KEY, None).unwrap();
        assert_eq!(identity.address(), TEST_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn test_address_mismatch() {
        let result = LocalIdentity::from_hex(TEST_PRIVATE_KEY, Some(Address::ZERO));
        assert!(matches!(result, Err(KeyError::AddressMismatch { .. })));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(
            LocalIdentity::from_hex("0xnothex", None),
            Err(KeyError::HexDecode(_))
        ));
    }

    #[test]
    fn test_missing_env_var() {
        let source = KeySource::EnvVar {
            var_name: "INTELAYER_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
        };
        assert!(matches!(
            LocalIdentity::load(&source, None),
            Err(KeyError::EnvVarNotFound(_))
        ));
    }

    #[test]
    fn test_load_from_file_trims_whitespace() {
        let path = std::env::temp_dir().join(format!("intelayer-key-{}", std::process::id()));
        std::fs::write(&path, format!("  {TEST_PRIVATE_KEY}\n")).unwrap();

        let identity = LocalIdentity::load(&KeySource::File { path: path.clone() }, None).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(identity.address(), TEST_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn test_key_source_from_toml_shape() {
        let source: KeySource = serde_json::from_value(serde_json::json!({
            "source": "env_var",
            "var_name": "INTELAYER_TRADING_KEY"
        }))
        .unwrap();
        assert_eq!(
            source,
            KeySource::EnvVar {
                var_name: "INTELAYER_TRADING_KEY".to_string()
            }
        );
    }
}
