//! Property-based tests using proptest

mod common;

use common::*;
use lib_multisig::{ActionDescriptor, Address, AuthzError, StakeLedger};
use proptest::prelude::*;

const OWNERS: usize = 5;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Authorization succeeds iff the signing subset reaches the threshold
    #[test]
    fn prop_count_threshold_iff(
        mask in 1u8..(1 << OWNERS),
        threshold in 1u32..=(OWNERS as u32),
    ) {
        let fx = setup(OWNERS, threshold);
        let signers: Vec<usize> = (0..OWNERS).filter(|i| mask & (1 << i) != 0).collect();
        let action = transfer(mask as u128);
        let bundle = fx.signed_bundle(&action, &signers);

        let result = fx.account.authorize(&action, &bundle, Address::zero());
        if signers.len() >= threshold as usize {
            prop_assert!(result.is_ok());
            prop_assert_eq!(fx.account.current_nonce(), 1);
        } else {
            prop_assert_eq!(
                result,
                Err(AuthzError::InsufficientApprovals { have: signers.len(), need: threshold })
            );
            prop_assert_eq!(fx.account.current_nonce(), 0);
        }
    }

    /// Any single-field change produces a different digest
    #[test]
    fn prop_digest_binds_fields(
        value in any::<u128>(),
        other_value in any::<u128>(),
        data in proptest::collection::vec(any::<u8>(), 0..64),
        nonce in any::<u64>(),
    ) {
        prop_assume!(value != other_value);
        let fx = setup(1, 1);
        let base = ActionDescriptor::call(Address::new([7; 20]), value, data.clone(), nonce);

        let mut changed = base.clone();
        changed.value = other_value;
        prop_assert_ne!(fx.account.hash(&base), fx.account.hash(&changed));

        let mut changed = base.clone();
        changed.data.push(0);
        prop_assert_ne!(fx.account.hash(&base), fx.account.hash(&changed));

        let changed = base.with_nonce(nonce.wrapping_add(1));
        prop_assert_ne!(fx.account.hash(&base), fx.account.hash(&changed));
    }

    /// Arbitrary bytes never authorize and never move the nonce
    #[test]
    fn prop_garbage_bundle_rejected(bundle in proptest::collection::vec(any::<u8>(), 0..400)) {
        let fx = setup(2, 1);
        let result = fx.account.authorize(&transfer(1), &bundle, Address::zero());
        prop_assert!(result.is_err());
        prop_assert_eq!(fx.account.current_nonce(), 0);
    }

    /// Required stake never exceeds the total and grows with the ratio
    #[test]
    fn prop_required_stake_bounded(
        total in 1u128..=u128::MAX,
        low in 0u16..=10_000,
        high in 0u16..=10_000,
    ) {
        let mut ledger = StakeLedger::new();
        ledger.stake(Address::new([1; 20]), total).unwrap();
        let (low, high) = if low <= high { (low, high) } else { (high, low) };

        prop_assert!(ledger.required_stake(high) <= total);
        prop_assert!(ledger.required_stake(low) <= ledger.required_stake(high));
        prop_assert_eq!(ledger.required_stake(10_000), total);
    }

    /// Stake then unstake of the same amounts restores every balance
    #[test]
    fn prop_stake_unstake_conserves(amounts in proptest::collection::vec(1u128..1_000_000, 1..20)) {
        let mut ledger = StakeLedger::new();
        for (i, amount) in amounts.iter().enumerate() {
            ledger.stake(Address::new([(i % 4) as u8 + 1; 20]), *amount).unwrap();
        }
        prop_assert_eq!(ledger.total_stake(), amounts.iter().sum::<u128>());

        for (i, amount) in amounts.iter().enumerate() {
            ledger.unstake(Address::new([(i % 4) as u8 + 1; 20]), *amount).unwrap();
        }
        prop_assert_eq!(ledger.total_stake(), 0);
        prop_assert_eq!(ledger.stakers(), 0);
    }
}
