//! Multisig Configuration
//!
//! Chain binding and decoding limits for the authorization engine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use lib_types::ChainId;

use crate::errors::{AuthzError, AuthzResult};

/// Default config filename
pub const DEFAULT_CONFIG_FILENAME: &str = "multisig.toml";

/// Configuration shared by every account an engine instance serves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultisigConfig {
    /// Chain identity bound into every domain separator
    pub chain_id: ChainId,
    /// Maximum number of entries accepted in one approvals bundle
    pub max_approvals: usize,
    /// Maximum data length of one contract signature entry
    pub max_contract_signature_bytes: usize,
}

impl Default for MultisigConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            max_approvals: 64,
            max_contract_signature_bytes: 16 * 1024, // 16 KB
        }
    }
}

impl MultisigConfig {
    /// Create a permissive config for testing
    pub fn for_testing() -> Self {
        Self {
            chain_id: 31_337,
            max_approvals: usize::MAX / 65,
            max_contract_signature_bytes: usize::MAX / 2,
        }
    }

    /// Same config bound to another chain
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Reject values the engine cannot operate with
    pub fn validate(&self) -> AuthzResult<()> {
        if self.chain_id == 0 {
            return Err(AuthzError::Config("chain_id must be non-zero".to_string()));
        }
        if self.max_approvals == 0 {
            return Err(AuthzError::Config("max_approvals must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> AuthzResult<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| AuthzError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> AuthzResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            AuthzError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), chain_id = config.chain_id, "Loaded multisig config");
        Ok(config)
    }
}
