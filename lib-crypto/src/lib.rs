//! Multisig Cryptography Foundation Module
//!
//! Keccak-256 hashing, secp256k1 signing and public-key recovery.

pub mod hashing;
pub mod keypair;
pub mod verification;

// Re-export hashing functionality
pub use hashing::{keccak256, keccak256_multiple, prefixed_message_hash, SIGNED_MESSAGE_PREFIX};

// Re-export keypair functionality
pub use keypair::generation::KeyPair;

// Re-export recovery
pub use verification::{address_of, recover_address, recover_prefixed_address, SIGNATURE_LEN};
