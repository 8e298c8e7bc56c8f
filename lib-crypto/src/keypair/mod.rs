//! KeyPair management module
//!
//! secp256k1 signing keys for owners and off-chain tooling

pub mod generation;

// Re-export main KeyPair type
pub use generation::KeyPair;
