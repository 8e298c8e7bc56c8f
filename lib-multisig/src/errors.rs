//! Authorization Errors

use thiserror::Error;
use lib_types::{Address, Amount};

/// Reason an authorization, approval or stake operation was rejected
///
/// Every variant is terminal: the call that produced it left nonce,
/// approvals and stakes untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Threshold not configured for this authorization mode")]
    ThresholdNotConfigured,

    #[error("Insufficient approval data: empty approvals buffer")]
    InsufficientApprovalData,

    #[error("Malformed approval bundle: {0}")]
    MalformedBundle(String),

    #[error("Truncated variable region at offset {offset}: need {needed} bytes, buffer has {available}")]
    TruncatedVariableRegion {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Duplicate or unordered approver: {current} does not follow {previous}")]
    DuplicateOrUnorderedApprover { previous: Address, current: Address },

    #[error("Unknown approver: {0}")]
    UnknownApprover(Address),

    #[error("Invalid approval at index {index} (claimed approver {approver})")]
    InvalidApproval { index: usize, approver: Address },

    #[error("Insufficient approvals: have {have}, need {need}")]
    InsufficientApprovals { have: usize, need: u32 },

    #[error("Insufficient staked weight: have {have}, need {need}")]
    InsufficientStakedWeight { have: Amount, need: Amount },

    #[error("Not authorized: {caller} cannot act as {identity}")]
    NotAuthorized { caller: Address, identity: Address },

    #[error("Zero amount not allowed")]
    ZeroAmount,

    #[error("Insufficient stake: have {have}, need {need}")]
    InsufficientStake { have: Amount, need: Amount },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthzError {
    /// Whether this error came from bundle decoding rather than policy evaluation
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            AuthzError::MalformedBundle(_) | AuthzError::TruncatedVariableRegion { .. }
        )
    }
}

/// Result type for authorization operations
pub type AuthzResult<T> = Result<T, AuthzError>;
