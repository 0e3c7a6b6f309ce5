use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use tracing::{debug, info};

/// Keyring service name shared by every Agentdesk key.
pub const KEYRING_SERVICE: &str = "agentdesk";
/// Account holding the key for the record store.
pub const DATA_KEY_ACCOUNT: &str = "data-key";
/// Account holding the key that wraps wallet private keys.
pub const VAULT_KEY_ACCOUNT: &str = "vault-key";

const KEY_LEN: usize = 32;

/// A 256-bit AES key plus the keyring account it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub id: String,
    pub bytes: [u8; KEY_LEN],
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("keychain unavailable for {account}: {reason}")]
    Keychain { account: String, reason: String },
    #[error("stored key for {account} is corrupt: {reason}")]
    Corrupt { account: String, reason: String },
    #[error("in-memory key lock poisoned")]
    Poisoned,
}

/// Source of a symmetric key; generated on first use when absent.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn load_key(&self) -> Result<KeyMaterial, KeyError>;
}

/// Key persisted base64-encoded in the OS keychain under one account.
pub struct KeyringProvider {
    service: String,
    account: String,
}

impl KeyringProvider {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    /// Key for the encrypted record store.
    pub fn data_key() -> Self {
        Self::new(KEYRING_SERVICE, DATA_KEY_ACCOUNT)
    }

    /// Key for wallet credentials, kept apart from the store key.
    pub fn vault_key() -> Self {
        Self::new(KEYRING_SERVICE, VAULT_KEY_ACCOUNT)
    }

    fn keychain_error(&self, err: keyring::Error) -> KeyError {
        KeyError::Keychain {
            account: self.account.clone(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl KeyProvider for KeyringProvider {
    async fn load_key(&self) -> Result<KeyMaterial, KeyError> {
        // Keyring operations are synchronous.
        let entry = keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| self.keychain_error(e))?;

        match entry.get_password() {
            Ok(encoded) => {
                debug!(account = %self.account, "loaded key from keychain");
                decode_key(&self.account, &encoded)
            }
            Err(keyring::Error::NoEntry) => {
                let material = generate_key(&self.account);
                entry
                    .set_password(&encode_key(&material))
                    .map_err(|e| self.keychain_error(e))?;
                info!(account = %self.account, "generated new key in keychain");
                Ok(material)
            }
            // Unreadable entries are surfaced, never overwritten.
            Err(err) => Err(self.keychain_error(err)),
        }
    }
}

/// Process-local key. Clones share the same key.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKeyProvider {
    slot: Arc<Mutex<Option<KeyMaterial>>>,
}

impl InMemoryKeyProvider {
    pub fn with_key(material: KeyMaterial) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(material))),
        }
    }
}

#[async_trait]
impl KeyProvider for InMemoryKeyProvider {
    async fn load_key(&self) -> Result<KeyMaterial, KeyError> {
        let mut slot = self.slot.lock().map_err(|_| KeyError::Poisoned)?;
        Ok(slot.get_or_insert_with(|| generate_key("memory")).clone())
    }
}

fn generate_key(account: &str) -> KeyMaterial {
    let mut bytes = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut bytes);
    KeyMaterial {
        id: account.to_string(),
        bytes,
    }
}

fn encode_key(material: &KeyMaterial) -> String {
    general_purpose::STANDARD.encode(material.bytes)
}

fn decode_key(account: &str, encoded: &str) -> Result<KeyMaterial, KeyError> {
    let corrupt = |reason: String| KeyError::Corrupt {
        account: account.to_string(),
        reason,
    };
    let raw = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| corrupt(e.to_string()))?;
    let bytes: [u8; KEY_LEN] = raw
        .as_slice()
        .try_into()
        .map_err(|_| corrupt(format!("expected {KEY_LEN} bytes, got {}", raw.len())))?;

    Ok(KeyMaterial {
        id: account.to_string(),
        bytes,
    })
}
