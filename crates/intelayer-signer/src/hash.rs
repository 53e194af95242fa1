//! Action hash construction.
//!
//! ```text
//! action_hash = keccak256(
//!     msgpack(action)
//!     || nonce.to_be_bytes()                       // 8 bytes
//!     || 0x00                    (no vault)
//!      | 0x01 || vault_address   (20 bytes)
//!     || [0x00 || expires_after.to_be_bytes()]      // only when set
//! )
//! ```

use alloy::primitives::{keccak256, Address, B256};

use crate::canonical::{serialize, CanonicalAction};
use crate::error::{SignerError, SignerResult};

/// Length of a vault address in bytes.
pub const VAULT_ADDRESS_LEN: usize = 20;

/// Hash serialized action bytes with a nonce and optional vault address.
///
/// # Errors
/// Returns `SignerError::InvalidVaultAddress` if `vault_address` is not
/// exactly 20 bytes.
pub fn build_hash(
    serialized_action: &[u8],
    nonce: u64,
    vault_address: Option<&[u8]>,
) -> SignerResult<B256> {
    build_hash_with_expiry(serialized_action, nonce, vault_address, None)
}

/// [`build_hash`] with an optional signature expiry appended.
///
/// # Errors
/// Returns `SignerError::InvalidVaultAddress` if `vault_address` is not
/// exactly 20 bytes.
pub fn build_hash_with_expiry(
    serialized_action: &[u8],
    nonce: u64,
    vault_address: Option<&[u8]>,
    expires_after: Option<u64>,
) -> SignerResult<B256> {
    let mut data = Vec::with_capacity(serialized_action.len() + 8 + 1 + VAULT_ADDRESS_LEN + 9);
    data.extend_from_slice(serialized_action);
    data.extend_from_slice(&nonce.to_be_bytes());

    // The absence flag is part of the pre-image too
    match vault_address {
        None => data.push(0x00),
        Some(addr) => {
            if addr.len() != VAULT_ADDRESS_LEN {
                return Err(SignerError::InvalidVaultAddress(format!(
                    "expected {VAULT_ADDRESS_LEN} bytes, got {}",
                    addr.len()
                )));
            }
            data.push(0x01);
            data.extend_from_slice(addr);
        }
    }

    // Unlike the vault flag, nothing is written when there is no expiry
    if let Some(expires) = expires_after {
        data.push(0x00);
        data.extend_from_slice(&expires.to_be_bytes());
    }

    Ok(keccak256(&data))
}

/// Parse a vault address from hex, with or without a `0x` prefix.
///
/// # Errors
/// Returns `SignerError::InvalidVaultAddress` unless the input is exactly 40
/// hex characters.
pub fn parse_vault_address(input: &str) -> SignerResult<Address> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if digits.len() != VAULT_ADDRESS_LEN * 2 {
        return Err(SignerError::InvalidVaultAddress(format!(
            "expected 40 hex characters, got {}",
            digits.len()
        )));
    }
    let bytes = hex::decode(digits)
        .map_err(|e| SignerError::InvalidVaultAddress(format!("{input}: {e}")))?;
    Ok(Address::from_slice(&bytes))
}

/// Everything that goes into an action hash.
#[derive(Debug, Clone)]
pub struct SigningInput<A> {
    pub action: A,
    pub nonce: u64,
    /// None = trading on the signer's own account.
    pub vault_address: Option<Address>,
    pub expires_after: Option<u64>,
}

impl<A> SigningInput<A> {
    pub fn new(action: A, nonce: u64) -> Self {
        Self {
            action,
            nonce,
            vault_address: None,
            expires_after: None,
        }
    }

    #[must_use]
    pub fn with_vault(mut self, vault_address: Option<Address>) -> Self {
        self.vault_address = vault_address;
        self
    }

    #[must_use]
    pub fn with_expiry(mut self, expires_after: Option<u64>) -> Self {
        self.expires_after = expires_after;
        self
    }
}

impl<A: CanonicalAction> SigningInput<A> {
    /// Serialize the action and hash it with this input's nonce and markers.
    ///
    /// # Errors
    /// Returns `SignerError::Encoding` if the action cannot be serialized.
    pub fn action_hash(&self) -> SignerResult<B256> {
        let bytes = serialize(&self.action)?;
        build_hash_with_expiry(
            &bytes,
            self.nonce,
            self.vault_address.as_ref().map(|a| a.as_slice()),
            self.expires_after,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intelayer_core::{Action, BulkCancel, CancelWire};

    const NONCE: u64 = 1_700_000_000_000;

    fn sub_account_bytes() -> Vec<u8> {
        serialize(&Action::create_sub_account("Sub1")).unwrap()
    }

    #[test]
    fn test_action_hash_golden() {
        let hash = build_hash(&sub_account_bytes(), NONCE, None).unwrap();
        assert_eq!(
            hex::encode(hash),
            "d17ab5ae40543b0fbc6d4b4d31f9590a2aecb5c4b4112607f1e5c4704d7f8fd4"
        );
    }

    #[test]
    fn test_action_hash_with_vault_golden() {
        let vault = [0x42u8; 20];
        let hash = build_hash(&sub_account_bytes(), NONCE, Some(&vault)).unwrap();
        assert_eq!(
            hex::encode(hash),
            "9eec80909d45481649620ccecaec2d7714f06c9c346a00aa48657edebd1449df"
        );
    }

    #[test]
    fn test_vault_presence_changes_hash() {
        let bytes = sub_account_bytes();
        let none = build_hash(&bytes, NONCE, None).unwrap();
        let zero_vault = build_hash(&bytes, NONCE, Some(&[0u8; 20])).unwrap();
        let other_vault = build_hash(&bytes, NONCE, Some(&[0x01u8; 20])).unwrap();

        assert_ne!(none, zero_vault);
        assert_ne!(zero_vault, other_vault);
    }

    #[test]
    fn test_nonce_changes_hash() {
        let bytes = sub_account_bytes();
        let hashes: Vec<B256> = [0, 1, NONCE, NONCE + 1, u64::MAX]
            .iter()
            .map(|n| build_hash(&bytes, *n, None).unwrap())
            .collect();

        for (i, a) in hashes.iter().enumerate() {
            for b in &hashes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_large_nonce_keeps_fixed_width() {
        // A 5-zero prefix scheme would emit 17 hex digits here
        let big: u64 = 0x1_0000_0000_0000;
        let mut manual = sub_account_bytes();
        manual.extend_from_slice(&big.to_be_bytes());
        manual.push(0x00);

        assert_eq!(
            build_hash(&sub_account_bytes(), big, None).unwrap(),
            keccak256(&manual)
        );
    }

    #[test]
    fn test_rejects_short_and_long_vault() {
        let bytes = sub_account_bytes();
        assert!(matches!(
            build_hash(&bytes, NONCE, Some(&[0u8; 19])),
            Err(SignerError::InvalidVaultAddress(_))
        ));
        assert!(matches!(
            build_hash(&bytes, NONCE, Some(&[0u8; 21])),
            Err(SignerError::InvalidVaultAddress(_))
        ));
    }

    #[test]
    fn test_expiry_changes_hash() {
        let input = SigningInput::new(Action::create_sub_account("Sub1"), NONCE);
        let with_expiry = input.clone().with_expiry(Some(1_700_000_060_000));

        assert_ne!(
            input.action_hash().unwrap(),
            with_expiry.action_hash().unwrap()
        );
    }

    #[test]
    fn test_signing_input_matches_build_hash() {
        let vault = Address::repeat_byte(0x42);
        let action = Action::Cancel(BulkCancel {
            cancels: vec![CancelWire { asset: 5, oid: 123 }],
        });
        let input = SigningInput::new(action.clone(), 1000).with_vault(Some(vault));

        let bytes = serialize(&action).unwrap();
        assert_eq!(
            input.action_hash().unwrap(),
            build_hash(&bytes, 1000, Some(vault.as_slice())).unwrap()
        );
    }

    #[test]
    fn test_parse_vault_address() {
        let addr = parse_vault_address("0x4242424242424242424242424242424242424242").unwrap();
        assert_eq!(addr, Address::repeat_byte(0x42));

        let unprefixed = parse_vault_address("4242424242424242424242424242424242424242").unwrap();
        assert_eq!(unprefixed, addr);

        for bad in [
            "0x42424242424242424242424242424242424242",
            "0x424242424242424242424242424242424242424242",
            "0xzz42424242424242424242424242424242424242",
        ] {
            assert!(matches!(
                parse_vault_address(bad),
                Err(SignerError::InvalidVaultAddress(_))
            ));
        }
    }
}
