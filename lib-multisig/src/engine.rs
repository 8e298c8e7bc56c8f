//! Authorization Engine
//!
//! The `check` and `authorize` functions decide whether a packed approvals
//! bundle satisfies an account's policy for one action.
//!
//! # Checks, in order
//!
//! 1. **Policy configured**: threshold (count) or stake ratio (weighted) is non-zero
//! 2. **Digest**: computed with the account's current nonce, never the caller's
//! 3. **Non-empty bundle**
//! 4. **Decodable bundle**
//! 5. **Resolution**: every entry resolved to (approver, valid), in buffer order
//! 6. **Ordering**: approvers strictly ascending across the whole bundle
//! 7. **Membership, then proof**: each approver is an owner and its entry is valid
//! 8. **Policy**: approver count >= threshold, or approver stake >= required stake
//!
//! Only `authorize` mutates state, and only by advancing the nonce after every
//! check passed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use lib_types::{ActionDescriptor, Address, Amount, ChainId, Digest, Nonce};

use crate::account::AccountState;
use crate::codec::SignatureCodec;
use crate::config::MultisigConfig;
use crate::errors::{AuthzError, AuthzResult};
use crate::hasher;
use crate::validator::{resolve, Resolution, ValidationContext};

/// Minimum number of headers a bundle must carry
///
/// Not the threshold: a short count-mode bundle reports `InsufficientApprovals`
/// with the real count instead of a decode error.
const MIN_APPROVALS: usize = 1;

/// Threshold policy applied in the final check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    /// Count of distinct owner approvals against the threshold
    Count,
    /// Summed stake of distinct owner approvals against the stake ratio
    Weighted,
}

/// Successful authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorized {
    /// Digest the approvals were checked against
    pub digest: Digest,
    /// Nonce consumed by this authorization
    pub nonce: Nonce,
}

/// Outcome of checking a bundle without consuming the nonce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedBundle {
    pub digest: Digest,
    /// Approvers in bundle order
    pub approvers: Vec<Address>,
    /// Summed stake of the approvers
    pub weight: Amount,
}

/// Stateless engine bound to one chain and one set of decoding limits
#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
    chain_id: ChainId,
    codec: SignatureCodec,
}

impl AuthorizationEngine {
    pub fn new(config: &MultisigConfig) -> AuthzResult<Self> {
        config.validate()?;
        Ok(Self {
            chain_id: config.chain_id,
            codec: SignatureCodec::from_config(config),
        })
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn codec(&self) -> &SignatureCodec {
        &self.codec
    }

    /// Run every check without mutating the account
    pub fn check(
        &self,
        state: &AccountState,
        action: &ActionDescriptor,
        approvals: &[u8],
        caller: Address,
        policy: Policy,
    ) -> AuthzResult<CheckedBundle> {
        // =====================================================================
        // Check 1: Policy configured
        // =====================================================================
        match policy {
            Policy::Count if state.threshold() == 0 => {
                return Err(AuthzError::ThresholdNotConfigured)
            }
            Policy::Weighted if state.stake_threshold_bps() == 0 => {
                return Err(AuthzError::ThresholdNotConfigured)
            }
            _ => {}
        }

        // =====================================================================
        // Check 2: Digest bound to the current nonce
        // =====================================================================
        let bound = action.with_nonce(state.nonce().current());
        let hashed = hasher::hash_with_preimage(&bound, &state.address(), self.chain_id);
        debug!(account = %state.address(), nonce = bound.nonce, digest = %hashed.digest, "Computed digest");

        // =====================================================================
        // Check 3 + 4: Bundle present and decodable
        // =====================================================================
        if approvals.is_empty() {
            return Err(AuthzError::InsufficientApprovalData);
        }
        let entries = self.codec.parse(approvals, MIN_APPROVALS)?;

        // =====================================================================
        // Check 5: Resolve every entry
        // =====================================================================
        let ctx = ValidationContext {
            digest: &hashed.digest,
            preimage: &hashed.preimage,
            caller,
            approvals: state.approvals(),
            contracts: state.contracts(),
        };

        let resolutions: Vec<Resolution> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let resolution = resolve(entry, &ctx);
                debug!(
                    index,
                    kind = entry.kind(),
                    approver = %resolution.approver,
                    valid = resolution.valid,
                    "Resolved approval"
                );
                resolution
            })
            .collect();

        // =====================================================================
        // Check 6: Strictly ascending approvers
        // =====================================================================
        // Strict monotonicity rejects duplicates and misordering in one pass
        for pair in resolutions.windows(2) {
            let (previous, current) = (pair[0].approver, pair[1].approver);
            if current <= previous {
                return Err(AuthzError::DuplicateOrUnorderedApprover { previous, current });
            }
        }

        // =====================================================================
        // Check 7: Owners only, valid proofs only
        // =====================================================================
        let mut approvers = Vec::with_capacity(resolutions.len());
        let mut weight: Amount = 0;

        for (index, resolution) in resolutions.iter().enumerate() {
            let approver = resolution.approver;
            if !state.is_owner(&approver) {
                return Err(AuthzError::UnknownApprover(approver));
            }
            if !resolution.valid {
                return Err(AuthzError::InvalidApproval { index, approver });
            }

            weight = weight.saturating_add(state.stakes().weight_of(&approver));
            approvers.push(approver);
        }

        // =====================================================================
        // Check 8: Threshold policy
        // =====================================================================
        match policy {
            Policy::Count => {
                let need = state.threshold();
                if approvers.len() < need as usize {
                    return Err(AuthzError::InsufficientApprovals {
                        have: approvers.len(),
                        need,
                    });
                }
            }
            Policy::Weighted => {
                let need = state.stakes().required_stake(state.stake_threshold_bps());
                if weight < need {
                    return Err(AuthzError::InsufficientStakedWeight { have: weight, need });
                }
            }
        }

        Ok(CheckedBundle {
            digest: hashed.digest,
            approvers,
            weight,
        })
    }

    /// Check the bundle and, on success, consume the account's nonce
    pub fn authorize(
        &self,
        state: &mut AccountState,
        action: &ActionDescriptor,
        approvals: &[u8],
        caller: Address,
        policy: Policy,
    ) -> AuthzResult<Authorized> {
        let result = self
            .check(state, action, approvals, caller, policy)
            .and_then(|checked| {
                let nonce = state.nonce_mut().advance()?;
                Ok(Authorized {
                    digest: checked.digest,
                    nonce,
                })
            });

        match &result {
            Ok(authorized) => info!(
                account = %state.address(),
                nonce = authorized.nonce,
                digest = %authorized.digest,
                ?policy,
                "Authorized action"
            ),
            Err(e) => warn!(
                account = %state.address(),
                nonce = state.nonce().current(),
                ?policy,
                decode_error = e.is_decode_error(),
                "Authorization rejected: {}",
                e
            ),
        }

        result
    }
}
