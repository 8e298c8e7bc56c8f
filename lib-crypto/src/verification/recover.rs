//! Signature recovery - secp256k1 public-key recovery
//!
//! Recovery never panics and never errors: a signature that cannot be
//! recovered simply yields `None`, and callers decide what that means.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use lib_types::Address;

use crate::hashing::{keccak256, prefixed_message_hash};

/// Length of the `r ‖ s` signature material
pub const SIGNATURE_LEN: usize = 64;

/// Derive the 20-byte address of a verifying key
///
/// Address = last 20 bytes of Keccak-256 over the uncompressed point without
/// its SEC1 tag byte.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::new(bytes)
}

/// Recover the signer address from a signature over `prehash`
///
/// `recovery_byte` must be 0 or 1. High-S signatures are rejected by the
/// underlying verifier, so every accepted signature is canonical.
pub fn recover_address(
    prehash: &[u8; 32],
    signature: &[u8; SIGNATURE_LEN],
    recovery_byte: u8,
) -> Option<Address> {
    if recovery_byte > 1 {
        return None;
    }
    let recovery_id = RecoveryId::from_byte(recovery_byte)?;
    let signature = Signature::from_slice(signature).ok()?;

    match VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id) {
        Ok(key) => {
            let address = address_of(&key);
            if address.is_zero() {
                None
            } else {
                Some(address)
            }
        }
        Err(e) => {
            tracing::trace!("secp256k1 recovery failed: {}", e);
            None
        }
    }
}

/// Recover the signer address from a signature over the prefixed form of `digest`
pub fn recover_prefixed_address(
    digest: &[u8; 32],
    signature: &[u8; SIGNATURE_LEN],
    recovery_byte: u8,
) -> Option<Address> {
    recover_address(&prefixed_message_hash(digest), signature, recovery_byte)
}
