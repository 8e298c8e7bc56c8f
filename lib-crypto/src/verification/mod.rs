//! Signature verification module
//!
//! Public-key recovery for secp256k1 signatures over 32-byte prehashes.

pub mod recover;

// Re-export main functions
pub use recover::{address_of, recover_address, recover_prefixed_address, SIGNATURE_LEN};
