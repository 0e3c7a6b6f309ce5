use std::fmt;

use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};
use thiserror::Error;

/// Secret seed followed by the ed25519 public key.
pub const KEYPAIR_LEN: usize = 64;
const SEED_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeypairError {
    #[error("private key is not valid base58: {0}")]
    Base58(String),
    #[error("private key is not a JSON byte array: {0}")]
    Json(String),
    #[error("expected {KEYPAIR_LEN} keypair bytes, got {0}")]
    Length(usize),
    #[error("public key does not match the secret seed")]
    Mismatch,
}

/// Solana signing keypair whose public key is always derived from the seed.
pub struct WalletKeypair {
    inner: Keypair,
}

impl WalletKeypair {
    /// Parse a wallet export: base58 (Phantom style) or a JSON byte array
    /// (`solana-keygen` file contents).
    pub fn parse(secret: &str) -> Result<Self, KeypairError> {
        let secret = secret.trim();
        let bytes = if secret.starts_with('[') {
            serde_json::from_str::<Vec<u8>>(secret).map_err(|e| KeypairError::Json(e.to_string()))?
        } else {
            bs58::decode(secret)
                .into_vec()
                .map_err(|e| KeypairError::Base58(e.to_string()))?
        };
        Self::from_bytes(&bytes)
    }

    /// Rejects exports whose public half was not derived from their seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        if bytes.len() != KEYPAIR_LEN {
            return Err(KeypairError::Length(bytes.len()));
        }
        let mut seed = [0u8; SEED_LEN];
        seed.copy_from_slice(&bytes[..SEED_LEN]);

        let keypair = Self::from_seed(seed);
        if keypair.pubkey().to_bytes()[..] != bytes[SEED_LEN..] {
            return Err(KeypairError::Mismatch);
        }
        Ok(keypair)
    }

    pub fn from_seed(seed: [u8; SEED_LEN]) -> Self {
        Self {
            inner: Keypair::new_from_array(seed),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.inner.pubkey()
    }

    /// Base58 public key.
    pub fn public_key(&self) -> String {
        self.pubkey().to_string()
    }

    /// Base58 of the full 64 bytes, the canonical export form.
    pub fn to_base58(&self) -> String {
        self.inner.to_base58_string()
    }

    pub fn to_bytes(&self) -> [u8; KEYPAIR_LEN] {
        self.inner.to_bytes()
    }
}

impl fmt::Debug for WalletKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletKeypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
