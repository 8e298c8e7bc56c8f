//! KeyPair generation - secp256k1 owner keys
//!
//! Keys sign 32-byte prehashes and report their 20-byte address. Deterministic
//! seeding exists for tooling and tests; production keys come from `generate`.

use anyhow::Result;
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use lib_types::Address;

use crate::hashing::{keccak256, prefixed_message_hash};
use crate::verification::{address_of, recover_address, SIGNATURE_LEN};

/// secp256k1 key pair (the signing key zeroizes itself on drop)
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    address: Address,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair").field("address", &self.address).finish()
    }
}

impl KeyPair {
    /// Generate a new key pair from the OS entropy source
    pub fn generate() -> Result<Self> {
        let signing_key = SigningKey::random(&mut OsRng);
        let keypair = Self::from_signing_key(signing_key);

        keypair.validate()?;

        Ok(keypair)
    }

    /// Derive a key pair deterministically from seed material
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let secret = keccak256(seed);
        Self::from_secret_bytes(&secret)
    }

    /// Load a key pair from a 32-byte secret scalar
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(secret)
            .map_err(|e| anyhow::anyhow!("Invalid secp256k1 secret key: {}", e))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_of(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// Address controlled by this key
    pub fn address(&self) -> Address {
        self.address
    }

    /// Public half of the key pair
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign a 32-byte prehash, returning `r ‖ s` and the recovery byte (0 or 1)
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<([u8; SIGNATURE_LEN], u8)> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(prehash)
            .map_err(|e| anyhow::anyhow!("secp256k1 signing failed: {}", e))?;

        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes.copy_from_slice(&signature.to_bytes());
        Ok((bytes, recovery_id.to_byte()))
    }

    /// Sign a digest in "signed message" mode
    pub fn sign_prefixed(&self, digest: &[u8; 32]) -> Result<([u8; SIGNATURE_LEN], u8)> {
        self.sign_prehash(&prefixed_message_hash(digest))
    }

    /// Validate that the keypair signs and recovers to its own address
    pub fn validate(&self) -> Result<()> {
        let test_message = keccak256(b"MULTISIG-KeyPair-Validation-Test");
        let (signature, recovery_byte) = self.sign_prehash(&test_message)?;

        if recover_address(&test_message, &signature, recovery_byte) != Some(self.address) {
            return Err(anyhow::anyhow!(
                "Keypair validation failed: recovered address mismatch"
            ));
        }

        Ok(())
    }
}
