//! Stake Ledger
//!
//! Per-owner staked weight for stake-weighted authorization.
//!
//! # Key Rules
//!
//! 1. **Conservation**: `total == sum(balances)` after every operation
//! 2. **No negative weight**: unstaking more than the balance is rejected
//! 3. **Rounding down**: required stake is `total * bps / 10000`, floored

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lib_types::{Address, Amount, Bps, MAX_BPS};

use crate::errors::{AuthzError, AuthzResult};

/// Staked balances of one account's stakers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeLedger {
    balances: BTreeMap<Address, Amount>,
    total: Amount,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Staked weight of `identity` (zero if it never staked)
    pub fn weight_of(&self, identity: &Address) -> Amount {
        self.balances.get(identity).copied().unwrap_or(0)
    }

    /// Sum of all balances
    pub fn total_stake(&self) -> Amount {
        self.total
    }

    /// Weight needed to satisfy `ratio_bps` of the total stake
    ///
    /// Split into quotient and remainder so the product never overflows.
    pub fn required_stake(&self, ratio_bps: Bps) -> Amount {
        let bps = ratio_bps as Amount;
        let denominator = MAX_BPS as Amount;
        (self.total / denominator) * bps + (self.total % denominator) * bps / denominator
    }

    /// Add `amount` to the balance of `identity`, returning the new balance
    pub fn stake(&mut self, identity: Address, amount: Amount) -> AuthzResult<Amount> {
        if amount == 0 {
            return Err(AuthzError::ZeroAmount);
        }

        let balance = self.weight_of(&identity);
        let new_balance = balance.checked_add(amount).ok_or(AuthzError::Overflow)?;
        let new_total = self.total.checked_add(amount).ok_or(AuthzError::Overflow)?;

        self.balances.insert(identity, new_balance);
        self.total = new_total;
        Ok(new_balance)
    }

    /// Remove `amount` from the balance of `identity`, returning the new balance
    pub fn unstake(&mut self, identity: Address, amount: Amount) -> AuthzResult<Amount> {
        if amount == 0 {
            return Err(AuthzError::ZeroAmount);
        }

        let balance = self.weight_of(&identity);
        if balance < amount {
            return Err(AuthzError::InsufficientStake {
                have: balance,
                need: amount,
            });
        }

        let new_balance = balance - amount;
        if new_balance == 0 {
            self.balances.remove(&identity);
        } else {
            self.balances.insert(identity, new_balance);
        }
        // total >= balance >= amount
        self.total -= amount;
        Ok(new_balance)
    }

    /// Number of identities with a non-zero balance
    pub fn stakers(&self) -> usize {
        self.balances.len()
    }
}
