//! Transaction Hashing
//!
//! Derives the domain-bound digest an approval commits to.
//!
//! # Layout
//!
//! ```text
//! domain_separator = keccak256(DOMAIN_TYPEHASH ‖ chain_id ‖ account)
//! struct_hash      = keccak256(ACTION_TYPEHASH ‖ to ‖ value ‖ keccak256(data)
//!                              ‖ operation ‖ exec_gas ‖ base_gas ‖ gas_price
//!                              ‖ gas_token ‖ refund_receiver ‖ nonce)
//! preimage         = 0x19 ‖ 0x01 ‖ domain_separator ‖ struct_hash
//! digest           = keccak256(preimage)
//! ```
//!
//! Every scalar is a 32-byte big-endian word and every address is left-padded,
//! so the encoding is unambiguous. The account and chain live in the domain
//! separator: the same action against another account or chain hashes to a
//! different digest.

use once_cell::sync::Lazy;

use lib_crypto::{keccak256, keccak256_multiple};
use lib_types::{u128_word, ActionDescriptor, Address, ChainId, Digest, WORD_SIZE};

/// Type string of the domain separator
pub const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";

/// Type string of an action
pub const ACTION_TYPE: &str = "MultisigAction(address to,uint256 value,bytes data,uint8 operation,uint256 execGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";

/// Length of the encoded preimage
pub const PREIMAGE_LEN: usize = 2 + 2 * WORD_SIZE;

static DOMAIN_TYPEHASH: Lazy<[u8; 32]> = Lazy::new(|| keccak256(DOMAIN_TYPE.as_bytes()));
static ACTION_TYPEHASH: Lazy<[u8; 32]> = Lazy::new(|| keccak256(ACTION_TYPE.as_bytes()));

/// Digest together with the bytes it was computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedAction {
    pub digest: Digest,
    pub preimage: Vec<u8>,
}

/// Domain separator binding an account on a chain
pub fn domain_separator(account: &Address, chain_id: ChainId) -> [u8; 32] {
    keccak256_multiple(&[
        DOMAIN_TYPEHASH.as_slice(),
        &u128_word(chain_id as u128),
        &account.to_word(),
    ])
}

/// Struct hash of the action fields, nonce included
pub fn struct_hash(action: &ActionDescriptor) -> [u8; 32] {
    let data_hash = keccak256(&action.data);

    keccak256_multiple(&[
        ACTION_TYPEHASH.as_slice(),
        &action.to.to_word(),
        &u128_word(action.value),
        &data_hash,
        &u128_word(action.operation.as_u8() as u128),
        &u128_word(action.gas.exec_gas as u128),
        &u128_word(action.gas.base_gas as u128),
        &u128_word(action.gas.gas_price),
        &action.gas.gas_token.to_word(),
        &action.gas.refund_receiver.to_word(),
        &u128_word(action.nonce as u128),
    ])
}

/// Exact byte sequence hashed into the digest
pub fn preimage(action: &ActionDescriptor, account: &Address, chain_id: ChainId) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(PREIMAGE_LEN);
    encoded.push(0x19);
    encoded.push(0x01);
    encoded.extend_from_slice(&domain_separator(account, chain_id));
    encoded.extend_from_slice(&struct_hash(action));
    encoded
}

/// Digest of an action for an account on a chain
pub fn hash(action: &ActionDescriptor, account: &Address, chain_id: ChainId) -> Digest {
    Digest::new(keccak256(&preimage(action, account, chain_id)))
}

/// Digest and preimage in one pass
pub fn hash_with_preimage(
    action: &ActionDescriptor,
    account: &Address,
    chain_id: ChainId,
) -> HashedAction {
    let preimage = preimage(action, account, chain_id);
    let digest = Digest::new(keccak256(&preimage));
    HashedAction { digest, preimage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::{GasParams, Operation};

    fn account() -> Address {
        Address::new([0xaa; 20])
    }

    fn sample_action() -> ActionDescriptor {
        ActionDescriptor {
            to: Address::new([0x11; 20]),
            value: 1_000,
            data: vec![0xde, 0xad, 0xbe, 0xef],
            operation: Operation::Call,
            gas: GasParams {
                exec_gas: 50_000,
                base_gas: 21_000,
                gas_price: 7,
                gas_token: Address::zero(),
                refund_receiver: Address::zero(),
            },
            nonce: 0,
        }
    }

    #[test]
    fn test_hash_deterministic() {
        let action = sample_action();
        assert_eq!(hash(&action, &account(), 1), hash(&action, &account(), 1));
    }

    #[test]
    fn test_preimage_layout() {
        let action = sample_action();
        let encoded = preimage(&action, &account(), 1);

        assert_eq!(encoded.len(), PREIMAGE_LEN);
        assert_eq!(&encoded[..2], &[0x19, 0x01]);
        assert_eq!(&encoded[2..34], &domain_separator(&account(), 1));
        assert_eq!(&encoded[34..], &struct_hash(&action));
        assert_eq!(hash(&action, &account(), 1).0, keccak256(&encoded));
    }

    #[test]
    fn test_domain_binds_chain_and_account() {
        let action = sample_action();
        let base = hash(&action, &account(), 1);

        assert_ne!(base, hash(&action, &account(), 2));
        assert_ne!(base, hash(&action, &Address::new([0xab; 20]), 1));
    }

    #[test]
    fn test_every_field_is_bound() {
        let action = sample_action();
        let base = hash(&action, &account(), 1);

        let mut variants = Vec::new();
        variants.push(ActionDescriptor { to: Address::new([0x12; 20]), ..action.clone() });
        variants.push(ActionDescriptor { value: 1_001, ..action.clone() });
        variants.push(ActionDescriptor { data: vec![0xde, 0xad], ..action.clone() });
        variants.push(ActionDescriptor { operation: Operation::DelegateCall, ..action.clone() });
        variants.push(action.with_nonce(1));

        let mut gas = action.gas.clone();
        gas.exec_gas += 1;
        variants.push(ActionDescriptor { gas, ..action.clone() });

        let mut gas = action.gas.clone();
        gas.base_gas += 1;
        variants.push(ActionDescriptor { gas, ..action.clone() });

        let mut gas = action.gas.clone();
        gas.gas_price += 1;
        variants.push(ActionDescriptor { gas, ..action.clone() });

        let mut gas = action.gas.clone();
        gas.gas_token = Address::new([0x01; 20]);
        variants.push(ActionDescriptor { gas, ..action.clone() });

        let mut gas = action.gas.clone();
        gas.refund_receiver = Address::new([0x02; 20]);
        variants.push(ActionDescriptor { gas, ..action.clone() });

        for variant in variants {
            assert_ne!(hash(&variant, &account(), 1), base, "{:?}", variant);
        }
    }

    #[test]
    fn test_hash_with_preimage_matches() {
        let action = sample_action();
        let hashed = hash_with_preimage(&action, &account(), 9);
        assert_eq!(hashed.digest, hash(&action, &account(), 9));
        assert_eq!(hashed.preimage, preimage(&action, &account(), 9));
    }
}
