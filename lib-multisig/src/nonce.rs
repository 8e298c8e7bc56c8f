//! Nonce Sequencer
//!
//! Account-scoped replay counter. Starts at 0, moves by exactly 1 per
//! successful authorization, never moves backwards.

use serde::{Deserialize, Serialize};

use lib_types::Nonce;

use crate::errors::{AuthzError, AuthzResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceSequencer {
    next: Nonce,
}

impl NonceSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nonce the next authorization must be bound to
    pub fn current(&self) -> Nonce {
        self.next
    }

    /// Consume the current nonce, returning it
    ///
    /// Only the engine advances the sequence, and only after every check
    /// of an authorization passed.
    pub(crate) fn advance(&mut self) -> AuthzResult<Nonce> {
        let consumed = self.next;
        self.next = consumed.checked_add(1).ok_or(AuthzError::Overflow)?;
        Ok(consumed)
    }
}
