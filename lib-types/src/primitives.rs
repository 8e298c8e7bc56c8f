//! Canonical Primitive Types for Multisig Authorization
//!
//! Rule: No String identifiers in authorization state. Ever.
//!
//! These types are the foundational building blocks for every digest,
//! approval record and stake balance. They are designed to be:
//! - Fixed-size (no dynamic allocation)
//! - Deterministically serializable
//! - Efficient to copy and compare

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TYPE ALIASES
// ============================================================================

/// Token amounts (supports up to ~340 undecillion units)
pub type Amount = u128;

/// Basis points for percentage calculations (10000 = 100%)
pub type Bps = u16;

/// Chain identity bound into every domain separator
pub type ChainId = u64;

/// Account-scoped replay counter
pub type Nonce = u64;

/// Basis points denominator (100%)
pub const MAX_BPS: Bps = 10_000;

/// Size of one ABI word
pub const WORD_SIZE: usize = 32;

// ============================================================================
// HASH TYPES
// ============================================================================

/// 32-byte digest identifying one proposed action instance
#[derive(
    Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default,
)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Create a new Digest from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a zeroed Digest
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Get the underlying bytes
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero digest
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// 20-byte address (derived from a public key, or a contract identity)
///
/// Ordering is byte-lexicographic, which equals the numeric order of the
/// big-endian integer the address encodes.
#[derive(
    Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Create a new Address from raw bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Create a zeroed Address
    pub const fn zero() -> Self {
        Self([0u8; 20])
    }

    /// Get the underlying bytes
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Left-pad into a 32-byte word
    pub fn to_word(&self) -> [u8; WORD_SIZE] {
        let mut word = [0u8; WORD_SIZE];
        word[12..].copy_from_slice(&self.0);
        word
    }

    /// Read an address out of a left-padded word
    ///
    /// Returns `None` if any of the 12 padding bytes is non-zero.
    pub fn from_word(word: &[u8; WORD_SIZE]) -> Option<Self> {
        if word[..12].iter().any(|&b| b != 0) {
            return None;
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Some(Self(bytes))
    }

    /// Parse from a hex string, with or without `0x` prefix
    pub fn from_hex(s: &str) -> Option<Self> {
        let raw = hex::decode(s.trim_start_matches("0x")).ok()?;
        let bytes: [u8; 20] = raw.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(&self.0[..6]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// WORD ENCODING
// ============================================================================

/// Encode an unsigned integer as a big-endian 32-byte word
pub fn u128_word(value: u128) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Decode a big-endian 32-byte word into a `usize`
///
/// Returns `None` if the value does not fit.
pub fn word_to_usize(word: &[u8; WORD_SIZE]) -> Option<usize> {
    const SIZE: usize = std::mem::size_of::<usize>();
    if word[..WORD_SIZE - SIZE].iter().any(|&b| b != 0) {
        return None;
    }
    let mut bytes = [0u8; SIZE];
    bytes.copy_from_slice(&word[WORD_SIZE - SIZE..]);
    Some(usize::from_be_bytes(bytes))
}

// ============================================================================
// TESTS
// ============================================================================
