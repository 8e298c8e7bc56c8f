//! Account State
//!
//! One shared account: its owners, policy, nonce, approvals and stakes.
//!
//! `AccountState` is the plain state the engine reads. `SharedAccount` wraps
//! it in a mutex so that every operation on one account, including the whole
//! check-then-advance sequence of an authorization, runs as a single critical
//! section. Two concurrent authorizations can never both observe the same
//! pre-advance nonce.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

use lib_types::{ActionDescriptor, Address, Amount, Bps, ChainId, Digest, Nonce, MAX_BPS};

use crate::approvals::ApprovalStore;
use crate::config::MultisigConfig;
use crate::engine::{AuthorizationEngine, Authorized, CheckedBundle, Policy};
use crate::errors::{AuthzError, AuthzResult};
use crate::hasher;
use crate::nonce::NonceSequencer;
use crate::stake::StakeLedger;
use crate::validator::{ContractRegistry, ContractVerifier};

// =============================================================================
// ACCOUNT STATE
// =============================================================================

/// Persisted state of one account
#[derive(Debug, Clone)]
pub struct AccountState {
    address: Address,
    owners: BTreeSet<Address>,
    threshold: u32,
    stake_threshold_bps: Bps,
    nonce: NonceSequencer,
    approvals: ApprovalStore,
    stakes: StakeLedger,
    contracts: ContractRegistry,
}

impl AccountState {
    /// Create an account with a count-mode threshold
    ///
    /// A zero threshold is accepted; such an account can never authorize in
    /// count mode.
    pub fn new(
        address: Address,
        owners: impl IntoIterator<Item = Address>,
        threshold: u32,
    ) -> AuthzResult<Self> {
        if address.is_zero() {
            return Err(AuthzError::Config("account address must be non-zero".to_string()));
        }

        let mut owner_set = BTreeSet::new();
        for owner in owners {
            if owner.is_zero() || owner == address {
                return Err(AuthzError::Config(format!("invalid owner {}", owner)));
            }
            if !owner_set.insert(owner) {
                return Err(AuthzError::Config(format!("duplicate owner {}", owner)));
            }
        }

        if threshold as usize > owner_set.len() {
            return Err(AuthzError::Config(format!(
                "threshold {} exceeds {} owners",
                threshold,
                owner_set.len()
            )));
        }

        Ok(Self {
            address,
            owners: owner_set,
            threshold,
            stake_threshold_bps: 0,
            nonce: NonceSequencer::new(),
            approvals: ApprovalStore::new(),
            stakes: StakeLedger::new(),
            contracts: ContractRegistry::new(),
        })
    }

    /// Configure the weighted-mode ratio in basis points
    pub fn with_stake_threshold(mut self, ratio_bps: Bps) -> AuthzResult<Self> {
        if ratio_bps > MAX_BPS {
            return Err(AuthzError::Config(format!(
                "stake threshold {} bps exceeds {}",
                ratio_bps, MAX_BPS
            )));
        }
        self.stake_threshold_bps = ratio_bps;
        Ok(self)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owners(&self) -> &BTreeSet<Address> {
        &self.owners
    }

    pub fn is_owner(&self, identity: &Address) -> bool {
        self.owners.contains(identity)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn stake_threshold_bps(&self) -> Bps {
        self.stake_threshold_bps
    }

    pub fn nonce(&self) -> &NonceSequencer {
        &self.nonce
    }

    pub(crate) fn nonce_mut(&mut self) -> &mut NonceSequencer {
        &mut self.nonce
    }

    pub fn approvals(&self) -> &ApprovalStore {
        &self.approvals
    }

    pub fn approvals_mut(&mut self) -> &mut ApprovalStore {
        &mut self.approvals
    }

    pub fn stakes(&self) -> &StakeLedger {
        &self.stakes
    }

    pub fn stakes_mut(&mut self) -> &mut StakeLedger {
        &mut self.stakes
    }

    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    pub fn contracts_mut(&mut self) -> &mut ContractRegistry {
        &mut self.contracts
    }
}

/// Serializable copy of an account's persisted state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    pub chain_id: ChainId,
    pub owners: BTreeSet<Address>,
    pub threshold: u32,
    pub stake_threshold_bps: Bps,
    pub nonce: Nonce,
    pub approvals: ApprovalStore,
    pub stakes: StakeLedger,
}

// =============================================================================
// SHARED ACCOUNT
// =============================================================================

/// Thread-safe handle to one account
///
/// Clones share the same state and lock.
#[derive(Debug, Clone)]
pub struct SharedAccount {
    state: Arc<Mutex<AccountState>>,
    engine: Arc<AuthorizationEngine>,
}

impl SharedAccount {
    pub fn new(state: AccountState, config: &MultisigConfig) -> AuthzResult<Self> {
        let engine = AuthorizationEngine::new(config)?;
        info!(
            account = %state.address(),
            owners = state.owners().len(),
            threshold = state.threshold(),
            stake_threshold_bps = state.stake_threshold_bps(),
            chain_id = config.chain_id,
            "Opened shared account"
        );
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            engine: Arc::new(engine),
        })
    }

    // =========================================================================
    // Authorization
    // =========================================================================

    /// Authorize under the count policy
    pub fn authorize(
        &self,
        action: &ActionDescriptor,
        approvals: &[u8],
        caller: Address,
    ) -> AuthzResult<Authorized> {
        let mut state = self.state.lock();
        self.engine
            .authorize(&mut state, action, approvals, caller, Policy::Count)
    }

    /// Authorize under the stake-weighted policy
    pub fn authorize_weighted(
        &self,
        action: &ActionDescriptor,
        approvals: &[u8],
        caller: Address,
    ) -> AuthzResult<Authorized> {
        let mut state = self.state.lock();
        self.engine
            .authorize(&mut state, action, approvals, caller, Policy::Weighted)
    }

    /// Authorize, then run `execute` before the account lock is released
    ///
    /// `execute` receives the action bound to the consumed nonce.
    pub fn authorize_and_execute<R>(
        &self,
        action: &ActionDescriptor,
        approvals: &[u8],
        caller: Address,
        policy: Policy,
        execute: impl FnOnce(&ActionDescriptor, &Authorized) -> R,
    ) -> AuthzResult<(Authorized, R)> {
        let mut state = self.state.lock();
        let authorized = self
            .engine
            .authorize(&mut state, action, approvals, caller, policy)?;
        let bound = action.with_nonce(authorized.nonce);
        let output = execute(&bound, &authorized);
        Ok((authorized, output))
    }

    /// Pre-verify a bundle under the count policy without consuming the nonce
    pub fn check_approvals(
        &self,
        action: &ActionDescriptor,
        approvals: &[u8],
        caller: Address,
    ) -> AuthzResult<CheckedBundle> {
        let state = self.state.lock();
        self.engine
            .check(&state, action, approvals, caller, Policy::Count)
    }

    /// Pre-verify a bundle under the weighted policy without consuming the nonce
    pub fn check_weighted_approvals(
        &self,
        action: &ActionDescriptor,
        approvals: &[u8],
        caller: Address,
    ) -> AuthzResult<CheckedBundle> {
        let state = self.state.lock();
        self.engine
            .check(&state, action, approvals, caller, Policy::Weighted)
    }

    // =========================================================================
    // On-chain approvals
    // =========================================================================

    /// Record the caller's approval of `digest`
    pub fn approve(&self, caller: Address, digest: Digest) -> AuthzResult<()> {
        self.approve_as(caller, caller, digest)
    }

    /// Record an approval for `identity`; only `identity` may do so
    pub fn approve_as(&self, caller: Address, identity: Address, digest: Digest) -> AuthzResult<()> {
        let mut state = self.state.lock();
        state.approvals_mut().approve(caller, identity, digest)?;
        info!(account = %state.address(), approver = %identity, digest = %digest, "Approved digest");
        Ok(())
    }

    pub fn is_approved(&self, identity: &Address, digest: &Digest) -> bool {
        self.state.lock().approvals().is_approved(identity, digest)
    }

    // =========================================================================
    // Stake
    // =========================================================================

    pub fn stake(&self, identity: Address, amount: Amount) -> AuthzResult<Amount> {
        let mut state = self.state.lock();
        let balance = state.stakes_mut().stake(identity, amount)?;
        info!(account = %state.address(), staker = %identity, %amount, %balance, "Staked");
        Ok(balance)
    }

    pub fn unstake(&self, identity: Address, amount: Amount) -> AuthzResult<Amount> {
        let mut state = self.state.lock();
        let balance = state.stakes_mut().unstake(identity, amount)?;
        info!(account = %state.address(), staker = %identity, %amount, %balance, "Unstaked");
        Ok(balance)
    }

    pub fn weight_of(&self, identity: &Address) -> Amount {
        self.state.lock().stakes().weight_of(identity)
    }

    pub fn total_stake(&self) -> Amount {
        self.state.lock().stakes().total_stake()
    }

    /// Stake an approving set needs under the current ratio
    pub fn required_stake(&self) -> Amount {
        let state = self.state.lock();
        state.stakes().required_stake(state.stake_threshold_bps())
    }

    // =========================================================================
    // Contract owners
    // =========================================================================

    pub fn register_contract_verifier(&self, identity: Address, verifier: Arc<dyn ContractVerifier>) {
        let mut state = self.state.lock();
        state.contracts_mut().register(identity, verifier);
        info!(account = %state.address(), contract = %identity, "Registered contract verifier");
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub fn address(&self) -> Address {
        self.state.lock().address()
    }

    pub fn chain_id(&self) -> ChainId {
        self.engine.chain_id()
    }

    pub fn current_nonce(&self) -> Nonce {
        self.state.lock().nonce().current()
    }

    pub fn owners(&self) -> BTreeSet<Address> {
        self.state.lock().owners().clone()
    }

    pub fn threshold(&self) -> u32 {
        self.state.lock().threshold()
    }

    pub fn stake_threshold_bps(&self) -> Bps {
        self.state.lock().stake_threshold_bps()
    }

    /// Digest of `action` exactly as given, nonce included
    pub fn hash(&self, action: &ActionDescriptor) -> Digest {
        hasher::hash(action, &self.address(), self.chain_id())
    }

    /// Preimage of `action` exactly as given
    pub fn preimage(&self, action: &ActionDescriptor) -> Vec<u8> {
        hasher::preimage(action, &self.address(), self.chain_id())
    }

    pub fn domain_separator(&self) -> [u8; 32] {
        hasher::domain_separator(&self.address(), self.chain_id())
    }

    /// Consistent copy of all persisted state
    pub fn snapshot(&self) -> AccountSnapshot {
        let state = self.state.lock();
        AccountSnapshot {
            address: state.address(),
            chain_id: self.engine.chain_id(),
            owners: state.owners().clone(),
            threshold: state.threshold(),
            stake_threshold_bps: state.stake_threshold_bps(),
            nonce: state.nonce().current(),
            approvals: state.approvals().clone(),
            stakes: state.stakes().clone(),
        }
    }
}
