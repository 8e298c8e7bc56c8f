//! On-chain Approval Store
//!
//! Records that an owner approved a digest ahead of time. Records are never
//! cleared, including after the digest they approve has been authorized.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use lib_types::{Address, Digest};

use crate::errors::{AuthzError, AuthzResult};

/// Approval records of one account
///
/// Uses BTreeMap for deterministic ordering when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStore {
    approved: BTreeMap<Address, BTreeSet<Digest>>,
}

impl ApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `identity` approves `digest`
    ///
    /// Only `identity` itself may record its approval. Repeating an approval
    /// is a no-op.
    pub fn approve(&mut self, caller: Address, identity: Address, digest: Digest) -> AuthzResult<()> {
        if caller != identity {
            return Err(AuthzError::NotAuthorized { caller, identity });
        }

        self.approved.entry(identity).or_default().insert(digest);
        Ok(())
    }

    /// Whether `identity` has approved `digest`
    pub fn is_approved(&self, identity: &Address, digest: &Digest) -> bool {
        self.approved
            .get(identity)
            .map(|digests| digests.contains(digest))
            .unwrap_or(false)
    }

    /// Total number of (identity, digest) records
    pub fn len(&self) -> usize {
        self.approved.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.approved.is_empty()
    }

    /// All records (for serialization/debugging)
    pub fn records(&self) -> impl Iterator<Item = (&Address, &Digest)> {
        self.approved
            .iter()
            .flat_map(|(identity, digests)| digests.iter().map(move |digest| (identity, digest)))
    }
}
