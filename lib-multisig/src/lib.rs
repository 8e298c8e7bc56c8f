//! Multi-party transaction authorization for shared accounts.
//!
//! An account is controlled by a set of owners. An action is authorized once
//! enough owners approved its digest: either a count threshold of distinct
//! owners, or a share of the total stake.
//!
//! # Pipeline
//!
//! 1. **Hasher**: action + account + chain + nonce -> 32-byte digest
//! 2. **Codec**: packed approvals bundle -> typed entries
//! 3. **Validator**: entry -> (approver, valid)
//! 4. **Engine**: ordering, ownership and threshold checks, nonce advance
//!
//! `SharedAccount` is the entry point; every operation on one account runs
//! under that account's lock.

pub mod account;
pub mod approvals;
pub mod codec;
pub mod config;
pub mod engine;
pub mod errors;
pub mod hasher;
pub mod nonce;
pub mod stake;
pub mod validator;

pub use account::{AccountSnapshot, AccountState, SharedAccount};
pub use approvals::ApprovalStore;
pub use codec::{ApprovalEntry, BundleBuilder, SignatureCodec, HEADER_LEN};
pub use config::{MultisigConfig, DEFAULT_CONFIG_FILENAME};
pub use engine::{AuthorizationEngine, Authorized, CheckedBundle, Policy};
pub use errors::{AuthzError, AuthzResult};
pub use hasher::HashedAction;
pub use nonce::NonceSequencer;
pub use stake::StakeLedger;
pub use validator::{ContractRegistry, ContractVerifier, Resolution};

pub use lib_types::{ActionDescriptor, Address, Amount, Bps, ChainId, Digest, GasParams, Nonce, Operation};
