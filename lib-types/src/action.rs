//! Action primitives.
//!
//! Pure data describing a proposed action. Hashing lives in lib-multisig,
//! execution lives outside this workspace.
//!
//! Rule: These types must remain behavior-free and serialization-stable.

use serde::{Deserialize, Serialize};

use crate::primitives::{Address, Amount, Nonce};

/// How the target is invoked once the action is authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Operation {
    /// Plain call
    #[default]
    Call = 0,
    /// Call executed in the account's own context
    DelegateCall = 1,
}

impl Operation {
    /// Wire value bound into the digest
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Fee parameters carried by an action
///
/// Refund accounting happens elsewhere; these values are only bound into the
/// digest so that approvers commit to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GasParams {
    /// Gas forwarded to the inner execution
    pub exec_gas: u64,
    /// Gas costs independent of the execution (signature checks, payload)
    pub base_gas: u64,
    /// Price per gas unit used for the refund
    pub gas_price: Amount,
    /// Token the refund is paid in (zero = native)
    pub gas_token: Address,
    /// Receiver of the refund (zero = executor)
    pub refund_receiver: Address,
}

/// Immutable description of a proposed action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ActionDescriptor {
    /// Target of the call
    pub to: Address,
    /// Native value attached
    pub value: Amount,
    /// Call payload
    pub data: Vec<u8>,
    /// Call kind
    pub operation: Operation,
    /// Fee parameters
    pub gas: GasParams,
    /// Account nonce this action is meant for
    pub nonce: Nonce,
}

impl ActionDescriptor {
    /// Create a plain call with no fee parameters
    pub fn call(to: Address, value: Amount, data: Vec<u8>, nonce: Nonce) -> Self {
        Self {
            to,
            value,
            data,
            operation: Operation::Call,
            gas: GasParams::default(),
            nonce,
        }
    }

    /// Copy of this action bound to another nonce
    pub fn with_nonce(&self, nonce: Nonce) -> Self {
        Self {
            nonce,
            ..self.clone()
        }
    }
}
