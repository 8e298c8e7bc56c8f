//! Multisig authorization primitives.
//! Stable, protocol-neutral, behavior-free.
//!
//! Rule: No String identifiers in authorization state. Ever.

pub mod primitives;
pub mod action;

pub use primitives::{
    u128_word, word_to_usize, Address, Amount, Bps, ChainId, Digest, Nonce, MAX_BPS, WORD_SIZE,
};
pub use action::{ActionDescriptor, GasParams, Operation};
