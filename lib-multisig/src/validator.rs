//! Approval Validation
//!
//! Resolves each parsed entry to the identity it speaks for and whether the
//! proof holds for the digest at hand. Resolution never fails: an entry that
//! proves nothing resolves to `valid = false` and the engine decides what that
//! means.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lib_crypto::{recover_address, recover_prefixed_address};
use lib_types::{Address, Digest};

use crate::approvals::ApprovalStore;
use crate::codec::ApprovalEntry;

/// Verifier for opaque signatures of a contract owner
///
/// Implementations receive the digest preimage, not the digest, together with
/// the signature data carried in the bundle.
pub trait ContractVerifier: Send + Sync {
    fn is_valid_signature(&self, preimage: &[u8], signature: &[u8]) -> bool;
}

/// Contract owners and the verifiers that speak for them
#[derive(Clone, Default)]
pub struct ContractRegistry {
    verifiers: HashMap<Address, Arc<dyn ContractVerifier>>,
}

impl fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("contracts", &self.verifiers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the verifier for `identity`
    pub fn register(&mut self, identity: Address, verifier: Arc<dyn ContractVerifier>) {
        self.verifiers.insert(identity, verifier);
    }

    pub fn get(&self, identity: &Address) -> Option<&Arc<dyn ContractVerifier>> {
        self.verifiers.get(identity)
    }

    pub fn contains(&self, identity: &Address) -> bool {
        self.verifiers.contains_key(identity)
    }
}

/// Identity an entry resolved to, and whether its proof holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub approver: Address,
    pub valid: bool,
}

impl Resolution {
    fn valid(approver: Address) -> Self {
        Self { approver, valid: true }
    }

    fn invalid(approver: Address) -> Self {
        Self { approver, valid: false }
    }
}

/// Everything resolution may consult for one authorization attempt
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub digest: &'a Digest,
    pub preimage: &'a [u8],
    pub caller: Address,
    pub approvals: &'a ApprovalStore,
    pub contracts: &'a ContractRegistry,
}

/// Resolve one entry against the digest
pub fn resolve(entry: &ApprovalEntry, ctx: &ValidationContext<'_>) -> Resolution {
    match entry {
        ApprovalEntry::CryptographicSignature {
            signature,
            recovery_byte,
        } => match recover_address(ctx.digest.as_bytes(), signature, *recovery_byte) {
            Some(signer) => Resolution::valid(signer),
            None => Resolution::invalid(Address::zero()),
        },

        ApprovalEntry::PrefixedMessageSignature {
            signature,
            recovery_byte,
        } => match recover_prefixed_address(ctx.digest.as_bytes(), signature, *recovery_byte) {
            Some(signer) => Resolution::valid(signer),
            None => Resolution::invalid(Address::zero()),
        },

        ApprovalEntry::OnChainApproval { approver } => Resolution {
            approver: *approver,
            valid: ctx.approvals.is_approved(approver, ctx.digest),
        },

        ApprovalEntry::CallerImplicitApproval { approver } => Resolution {
            approver: *approver,
            valid: *approver == ctx.caller,
        },

        ApprovalEntry::ContractSignature { approver, data } => {
            let valid = ctx
                .contracts
                .get(approver)
                .map(|verifier| verifier.is_valid_signature(ctx.preimage, data))
                .unwrap_or(false);
            Resolution {
                approver: *approver,
                valid,
            }
        }
    }
}
