//! Hashing module for multisig cryptography
//!
//! Provides Keccak-256 hashing used throughout the authorization engine.
//!
//! # Canonical Authorization Hash
//!
//! **Keccak-256 is the canonical hash function for all authorization data.**
//!
//! This includes domain separators, action struct hashes, digests and
//! address derivation. Signatures produced by external wallets commit to
//! Keccak-256 digests, so no other hash may be substituted on these paths.

use sha3::{Digest, Keccak256};

/// Prefix applied before re-hashing a digest in "signed message" mode
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak-256 hash function - primary hash function for authorization
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Hash multiple data segments as if concatenated
pub fn keccak256_multiple(data_segments: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for segment in data_segments {
        hasher.update(segment);
    }
    hasher.finalize().into()
}

/// Wrap a 32-byte digest in the signed-message prefix and hash again
///
/// The same key signing the same logical digest produces different signature
/// bytes here than it does over the raw digest.
pub fn prefixed_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    keccak256_multiple(&[SIGNED_MESSAGE_PREFIX, digest])
}
