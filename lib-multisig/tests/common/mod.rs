//! Shared fixtures for integration tests

#![allow(dead_code)]

use lib_crypto::KeyPair;
use lib_multisig::{
    ActionDescriptor, Address, AccountState, BundleBuilder, Digest, MultisigConfig, SharedAccount,
};

pub const ACCOUNT_BYTE: u8 = 0xaa;

/// Account under test plus its signing owners, sorted ascending by address
pub struct Fixture {
    pub account: SharedAccount,
    pub owners: Vec<KeyPair>,
}

impl Fixture {
    pub fn owner(&self, index: usize) -> &KeyPair {
        &self.owners[index]
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.owners.iter().map(KeyPair::address).collect()
    }

    /// Digest of `action` at the account's current nonce
    pub fn pending_digest(&self, action: &ActionDescriptor) -> Digest {
        self.account
            .hash(&action.with_nonce(self.account.current_nonce()))
    }

    /// Bundle of digest signatures from `signers`, sorted ascending
    pub fn signed_bundle(&self, action: &ActionDescriptor, signers: &[usize]) -> Vec<u8> {
        let digest = self.pending_digest(action);
        signers
            .iter()
            .fold(BundleBuilder::new(), |builder, &i| sign(builder, self.owner(i), &digest))
            .build()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("lib_multisig=debug")
        .try_init();
}

pub fn account_address() -> Address {
    Address::new([ACCOUNT_BYTE; 20])
}

/// Deterministic owner keys, sorted ascending by address
pub fn owner_keys(count: usize) -> Vec<KeyPair> {
    let mut keys: Vec<KeyPair> = (0..count)
        .map(|i| KeyPair::from_seed(format!("multisig-owner-{}", i).as_bytes()).unwrap())
        .collect();
    keys.sort_by_key(KeyPair::address);
    keys
}

pub fn setup(owner_count: usize, threshold: u32) -> Fixture {
    setup_with_config(owner_count, threshold, 0, &MultisigConfig::for_testing())
}

pub fn setup_weighted(owner_count: usize, ratio_bps: u16) -> Fixture {
    setup_with_config(owner_count, 0, ratio_bps, &MultisigConfig::for_testing())
}

pub fn setup_with_config(
    owner_count: usize,
    threshold: u32,
    ratio_bps: u16,
    config: &MultisigConfig,
) -> Fixture {
    init_tracing();
    let owners = owner_keys(owner_count);
    let state = AccountState::new(account_address(), owners.iter().map(KeyPair::address), threshold)
        .unwrap()
        .with_stake_threshold(ratio_bps)
        .unwrap();
    let account = SharedAccount::new(state, config).unwrap();
    Fixture { account, owners }
}

pub fn transfer(value: u128) -> ActionDescriptor {
    ActionDescriptor::call(Address::new([0x42; 20]), value, vec![0xde, 0xad, 0xbe, 0xef], 0)
}

pub fn sign(builder: BundleBuilder, keypair: &KeyPair, digest: &Digest) -> BundleBuilder {
    let (signature, recovery_byte) = keypair.sign_prehash(digest.as_bytes()).unwrap();
    builder.signature(keypair.address(), signature, recovery_byte)
}

pub fn sign_prefixed(builder: BundleBuilder, keypair: &KeyPair, digest: &Digest) -> BundleBuilder {
    let (signature, recovery_byte) = keypair.sign_prefixed(digest.as_bytes()).unwrap();
    builder.prefixed_signature(keypair.address(), signature, recovery_byte)
}
