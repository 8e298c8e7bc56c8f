//! Approval Bundle Codec
//!
//! Splits a packed approvals buffer into discrete entries, and builds such
//! buffers for off-chain tooling.
//!
//! # Wire format
//!
//! The buffer starts with a run of 65-byte headers `r (32) ‖ s (32) ‖ v (1)`.
//! The discriminator `v` selects the entry kind:
//!
//! | `v`      | Entry                     | `r`               | `s`            |
//! |----------|---------------------------|-------------------|----------------|
//! | 0        | contract signature        | claimed identity  | data offset    |
//! | 1        | on-chain approval         | claimed identity  | ignored        |
//! | 2        | caller-implicit approval  | claimed identity  | ignored        |
//! | 31, 32   | prefixed-message signature| signature `r`     | signature `s`  |
//! | other    | signature over the digest | signature `r`     | signature `s`  |
//!
//! Contract signature data lives after the headers: a 32-byte big-endian length
//! followed by that many bytes. The header run ends at the smallest data offset
//! any contract entry references, or at the end of the buffer.
//!
//! Entries are returned in buffer order. Order carries meaning for the engine
//! and is never changed here.

use lib_types::{word_to_usize, Address, WORD_SIZE};
use lib_crypto::SIGNATURE_LEN;

use crate::config::MultisigConfig;
use crate::errors::{AuthzError, AuthzResult};

/// Size of one fixed approval header
pub const HEADER_LEN: usize = 65;

/// Discriminator of a contract signature header
pub const V_CONTRACT: u8 = 0;
/// Discriminator of an on-chain approval header
pub const V_ON_CHAIN: u8 = 1;
/// Discriminator of a caller-implicit approval header
pub const V_CALLER: u8 = 2;
/// Offset added to the recovery byte of a signature over the digest
pub const V_DIGEST_BASE: u8 = 27;
/// Offset added to the recovery byte of a prefixed-message signature
pub const V_PREFIXED_BASE: u8 = 31;

/// One parsed approval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalEntry {
    /// secp256k1 signature over the digest
    CryptographicSignature {
        signature: [u8; SIGNATURE_LEN],
        recovery_byte: u8,
    },
    /// secp256k1 signature over the prefixed digest
    PrefixedMessageSignature {
        signature: [u8; SIGNATURE_LEN],
        recovery_byte: u8,
    },
    /// Previously stored approval of the digest
    OnChainApproval { approver: Address },
    /// Approval by whoever invokes the check
    CallerImplicitApproval { approver: Address },
    /// Opaque signature checked by the approver's registered verifier
    ContractSignature { approver: Address, data: Vec<u8> },
}

impl ApprovalEntry {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ApprovalEntry::CryptographicSignature { .. } => "signature",
            ApprovalEntry::PrefixedMessageSignature { .. } => "prefixed_signature",
            ApprovalEntry::OnChainApproval { .. } => "on_chain",
            ApprovalEntry::CallerImplicitApproval { .. } => "caller",
            ApprovalEntry::ContractSignature { .. } => "contract",
        }
    }

    /// Identity named in the entry, if it names one
    pub fn claimed_approver(&self) -> Option<Address> {
        match self {
            ApprovalEntry::OnChainApproval { approver }
            | ApprovalEntry::CallerImplicitApproval { approver }
            | ApprovalEntry::ContractSignature { approver, .. } => Some(*approver),
            _ => None,
        }
    }
}

/// Bundle parser with the limits of one engine instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCodec {
    max_approvals: usize,
    max_contract_signature_bytes: usize,
}

impl Default for SignatureCodec {
    fn default() -> Self {
        Self::from_config(&MultisigConfig::default())
    }
}

impl SignatureCodec {
    pub fn new(max_approvals: usize, max_contract_signature_bytes: usize) -> Self {
        Self {
            max_approvals,
            max_contract_signature_bytes,
        }
    }

    pub fn from_config(config: &MultisigConfig) -> Self {
        Self::new(config.max_approvals, config.max_contract_signature_bytes)
    }

    /// Parse a packed bundle carrying at least `expected_approvers` headers
    pub fn parse(&self, buffer: &[u8], expected_approvers: usize) -> AuthzResult<Vec<ApprovalEntry>> {
        let min_len = expected_approvers
            .checked_mul(HEADER_LEN)
            .ok_or_else(|| AuthzError::MalformedBundle("approver count overflows".to_string()))?;
        if buffer.len() < min_len {
            return Err(AuthzError::MalformedBundle(format!(
                "{} bytes cannot hold {} approval headers",
                buffer.len(),
                expected_approvers
            )));
        }

        let mut header_end = buffer.len();
        let mut entries = Vec::new();

        while (entries.len() + 1) * HEADER_LEN <= header_end {
            if entries.len() == self.max_approvals {
                return Err(AuthzError::MalformedBundle(format!(
                    "more than {} approvals in bundle",
                    self.max_approvals
                )));
            }

            let index = entries.len();
            let start = index * HEADER_LEN;
            let header = &buffer[start..start + HEADER_LEN];
            let (entry, data_offset) = self.parse_header(buffer, header, index)?;

            if let Some(offset) = data_offset {
                header_end = header_end.min(offset);
            }
            entries.push(entry);
        }

        if header_end != entries.len() * HEADER_LEN {
            return Err(AuthzError::MalformedBundle(format!(
                "header region of {} bytes is not a whole number of headers",
                header_end
            )));
        }

        if entries.len() < expected_approvers {
            return Err(AuthzError::MalformedBundle(format!(
                "found {} approval headers, expected at least {}",
                entries.len(),
                expected_approvers
            )));
        }

        Ok(entries)
    }

    /// Decode one header; returns the entry and, for contract entries, the data offset
    fn parse_header(
        &self,
        buffer: &[u8],
        header: &[u8],
        index: usize,
    ) -> AuthzResult<(ApprovalEntry, Option<usize>)> {
        let r = word_at(header, 0);
        let s = word_at(header, WORD_SIZE);
        let v = header[2 * WORD_SIZE];

        let entry = match v {
            V_CONTRACT => {
                let approver = claimed_identity(&r, index)?;
                let offset = word_to_usize(&s).ok_or(AuthzError::TruncatedVariableRegion {
                    offset: usize::MAX,
                    needed: WORD_SIZE,
                    available: buffer.len(),
                })?;

                if offset < (index + 1) * HEADER_LEN {
                    return Err(AuthzError::MalformedBundle(format!(
                        "contract data offset {} of entry {} points into the header region",
                        offset, index
                    )));
                }

                let data = self.read_variable(buffer, offset)?;
                return Ok((ApprovalEntry::ContractSignature { approver, data }, Some(offset)));
            }
            V_ON_CHAIN => ApprovalEntry::OnChainApproval {
                approver: claimed_identity(&r, index)?,
            },
            V_CALLER => ApprovalEntry::CallerImplicitApproval {
                approver: claimed_identity(&r, index)?,
            },
            v if v >= V_PREFIXED_BASE => ApprovalEntry::PrefixedMessageSignature {
                signature: signature_material(header),
                recovery_byte: v - V_PREFIXED_BASE,
            },
            v => ApprovalEntry::CryptographicSignature {
                signature: signature_material(header),
                // Out-of-range values stay out of range and fail recovery
                recovery_byte: v.wrapping_sub(V_DIGEST_BASE),
            },
        };

        Ok((entry, None))
    }

    /// Read a length-prefixed region starting at `offset`
    fn read_variable(&self, buffer: &[u8], offset: usize) -> AuthzResult<Vec<u8>> {
        let available = buffer.len();
        let prefix_end = offset
            .checked_add(WORD_SIZE)
            .filter(|&end| end <= available)
            .ok_or(AuthzError::TruncatedVariableRegion {
                offset,
                needed: WORD_SIZE,
                available,
            })?;

        let length_word = word_at(buffer, offset);
        let length = word_to_usize(&length_word)
            .filter(|&len| len <= self.max_contract_signature_bytes)
            .ok_or(AuthzError::TruncatedVariableRegion {
                offset,
                needed: usize::MAX,
                available,
            })?;

        let data_end = prefix_end
            .checked_add(length)
            .filter(|&end| end <= available)
            .ok_or(AuthzError::TruncatedVariableRegion {
                offset,
                needed: WORD_SIZE.saturating_add(length),
                available,
            })?;

        Ok(buffer[prefix_end..data_end].to_vec())
    }
}

fn word_at(bytes: &[u8], start: usize) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word.copy_from_slice(&bytes[start..start + WORD_SIZE]);
    word
}

fn signature_material(header: &[u8]) -> [u8; SIGNATURE_LEN] {
    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(&header[..SIGNATURE_LEN]);
    signature
}

fn claimed_identity(word: &[u8; WORD_SIZE], index: usize) -> AuthzResult<Address> {
    Address::from_word(word).ok_or_else(|| {
        AuthzError::MalformedBundle(format!(
            "entry {} claims a non-canonical identity word",
            index
        ))
    })
}

// =============================================================================
// BUNDLE BUILDER
// =============================================================================

/// Builds packed approval bundles
///
/// Entries are keyed by the identity they prove so `build` can emit them in
/// the strictly ascending order the engine requires.
#[derive(Debug, Clone, Default)]
pub struct BundleBuilder {
    entries: Vec<(Address, ApprovalEntry)>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature over the digest made by `signer`
    pub fn signature(mut self, signer: Address, signature: [u8; SIGNATURE_LEN], recovery_byte: u8) -> Self {
        self.entries.push((
            signer,
            ApprovalEntry::CryptographicSignature {
                signature,
                recovery_byte,
            },
        ));
        self
    }

    /// Add a prefixed-message signature made by `signer`
    pub fn prefixed_signature(
        mut self,
        signer: Address,
        signature: [u8; SIGNATURE_LEN],
        recovery_byte: u8,
    ) -> Self {
        self.entries.push((
            signer,
            ApprovalEntry::PrefixedMessageSignature {
                signature,
                recovery_byte,
            },
        ));
        self
    }

    /// Reference an approval `approver` stored beforehand
    pub fn on_chain(mut self, approver: Address) -> Self {
        self.entries
            .push((approver, ApprovalEntry::OnChainApproval { approver }));
        self
    }

    /// Claim approval by the submitting caller
    pub fn caller(mut self, approver: Address) -> Self {
        self.entries
            .push((approver, ApprovalEntry::CallerImplicitApproval { approver }));
        self
    }

    /// Add an opaque contract signature
    pub fn contract(mut self, approver: Address, data: Vec<u8>) -> Self {
        self.entries
            .push((approver, ApprovalEntry::ContractSignature { approver, data }));
        self
    }

    /// Number of entries added so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emit entries sorted by identity, ascending
    pub fn build(mut self) -> Vec<u8> {
        self.entries.sort_by_key(|(identity, _)| *identity);
        self.build_in_order()
    }

    /// Emit entries exactly in insertion order
    pub fn build_in_order(self) -> Vec<u8> {
        let header_len = self.entries.len() * HEADER_LEN;
        let mut headers = Vec::with_capacity(header_len);
        let mut tail = Vec::new();

        for (_, entry) in &self.entries {
            match entry {
                ApprovalEntry::CryptographicSignature {
                    signature,
                    recovery_byte,
                } => {
                    headers.extend_from_slice(signature);
                    headers.push(recovery_byte.wrapping_add(V_DIGEST_BASE));
                }
                ApprovalEntry::PrefixedMessageSignature {
                    signature,
                    recovery_byte,
                } => {
                    headers.extend_from_slice(signature);
                    headers.push(recovery_byte.wrapping_add(V_PREFIXED_BASE));
                }
                ApprovalEntry::OnChainApproval { approver } => {
                    headers.extend_from_slice(&approver.to_word());
                    headers.extend_from_slice(&[0u8; WORD_SIZE]);
                    headers.push(V_ON_CHAIN);
                }
                ApprovalEntry::CallerImplicitApproval { approver } => {
                    headers.extend_from_slice(&approver.to_word());
                    headers.extend_from_slice(&[0u8; WORD_SIZE]);
                    headers.push(V_CALLER);
                }
                ApprovalEntry::ContractSignature { approver, data } => {
                    let offset = header_len + tail.len();
                    headers.extend_from_slice(&approver.to_word());
                    headers.extend_from_slice(&lib_types::u128_word(offset as u128));
                    headers.push(V_CONTRACT);

                    tail.extend_from_slice(&lib_types::u128_word(data.len() as u128));
                    tail.extend_from_slice(data);
                }
            }
        }

        headers.extend_from_slice(&tail);
        headers
    }
}
