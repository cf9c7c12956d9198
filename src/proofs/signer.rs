//! Signing devices and the software keypair signer.
//!
//! # Security
//! - Private keys are loaded from an explicit string or an environment variable
//! - Keys are never logged or serialized

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};

use crate::proofs::ProofError;
use crate::transaction::{Proof, PublicKey};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "DEPLOYER_PRIVATE_KEY";

/// Something that can sign transaction bytes: a software key, a hardware
/// ledger, a remote co-signer.
///
/// `sign` may suspend for as long as the device needs (e.g. a human
/// confirming on a hardware wallet).
#[async_trait]
pub trait SigningDevice: Send + Sync {
    /// Public key the device signs for.
    fn public_key(&self) -> PublicKey;

    /// Sign `bytes`, returning the signature as a proof.
    async fn sign(&self, bytes: &[u8]) -> Result<Proof, ProofError>;
}

/// Ed25519 keypair held in memory.
pub struct KeypairSigner {
    key: SigningKey,
}

impl KeypairSigner {
    /// Create a signer from a base58-encoded 32-byte private key.
    pub fn from_private_key(private_key_b58: &str) -> Result<Self, ProofError> {
        let bytes = bs58::decode(private_key_b58.trim())
            .into_vec()
            .map_err(|e| ProofError::Signer(format!("Invalid private key format: {}", e)))?;
        let secret: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            ProofError::Signer(format!("Invalid private key length: {} bytes", b.len()))
        })?;

        let signer = Self { key: SigningKey::from_bytes(&secret) };
        tracing::info!(public_key = %signer.public_key(), "Keypair signer initialized");
        Ok(signer)
    }

    /// Load the signer from environment variable.
    ///
    /// Reads `DEPLOYER_PRIVATE_KEY` from environment.
    pub fn from_env() -> Result<Self, ProofError> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            ProofError::Signer(format!("Environment variable {} not set", PRIVATE_KEY_ENV_VAR))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self { key: SigningKey::generate(&mut rand::rngs::OsRng) }
    }
}

#[async_trait]
impl SigningDevice for KeypairSigner {
    fn public_key(&self) -> PublicKey {
        PublicKey(self.key.verifying_key().to_bytes())
    }

    async fn sign(&self, bytes: &[u8]) -> Result<Proof, ProofError> {
        Ok(Proof::new(self.key.sign(bytes).to_bytes().to_vec()))
    }
}

impl std::fmt::Debug for KeypairSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairSigner")
            .field("public_key", &self.public_key().to_string())
            .finish()
    }
}
