use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Decrypted private key material. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl From<String> for SecretKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Vault failures. Messages never include plaintext, ciphertext or key bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("malformed ciphertext: {0}")]
    Malformed(String),
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("key unavailable: {0}")]
    Key(String),
}

/// Encrypts and decrypts stored wallet secrets.
#[async_trait]
pub trait CredentialVault: Send + Sync {
    async fn encrypt(&self, secret: &SecretKey) -> Result<String, VaultError>;

    async fn decrypt(&self, encrypted: &str) -> Result<SecretKey, VaultError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let secret = SecretKey::new("5Kd3NBUAdUnhyzenEwVLy9pBKxSwXvE9FMPyR4UKZvpe6E3AgLr");
        let printed = format!("{secret:?}");
        assert!(!printed.contains("5Kd3"));
        assert_eq!(secret.expose_secret().len(), 51);
    }
}
