//! AES-256-GCM credential vault for wallet private keys.
//!
//! Encrypted format: standard base64 of `nonce (12 bytes) || ciphertext`, so the
//! whole secret fits in a single string column of the wallet record.

use agentdesk_core::vault::{CredentialVault, SecretKey, VaultError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::instrument;

use crate::{
    cipher::{self, CipherError, NONCE_LEN},
    key_provider::{KeyMaterial, KeyProvider},
};

/// Vault backed by a `KeyProvider` (OS keyring in production).
pub struct AesGcmVault<P: KeyProvider> {
    key_provider: P,
}

impl<P: KeyProvider> AesGcmVault<P> {
    pub fn new(key_provider: P) -> Self {
        Self { key_provider }
    }

    async fn key(&self) -> Result<KeyMaterial, VaultError> {
        self.key_provider
            .load_key()
            .await
            .map_err(|e| VaultError::Key(e.to_string()))
    }
}

#[async_trait]
impl<P: KeyProvider> CredentialVault for AesGcmVault<P> {
    #[instrument(skip_all)]
    async fn encrypt(&self, secret: &SecretKey) -> Result<String, VaultError> {
        let material = self.key().await?;
        let sealed = cipher::seal(&material, secret.expose_secret().as_bytes())
            .map_err(|_| VaultError::EncryptionFailed)?;
        Ok(STANDARD.encode(sealed.to_bytes()))
    }

    #[instrument(skip_all)]
    async fn decrypt(&self, encrypted: &str) -> Result<SecretKey, VaultError> {
        let data = STANDARD
            .decode(encrypted.trim())
            .map_err(|e| VaultError::Malformed(format!("base64: {e}")))?;
        if data.len() <= NONCE_LEN {
            return Err(VaultError::Malformed("ciphertext too short".into()));
        }

        let material = self.key().await?;
        let (nonce, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = cipher::open(&material, nonce, ciphertext).map_err(|err| match err {
            CipherError::NonceLength(_) => VaultError::Malformed(err.to_string()),
            _ => VaultError::DecryptionFailed,
        })?;

        String::from_utf8(plaintext)
            .map(SecretKey::from)
            .map_err(|_| VaultError::Malformed("secret is not valid UTF-8".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_provider::InMemoryKeyProvider;

    const SECRET: &str = "4Z7cXSyeFR8wNGMVXUE1TwtKn5D5Vu7FzEv69dokLv7KrQk7h6pu4LF8ZRR9yQBhc7uSM6RTTZtU1fmaxiNrxXrs";

    #[tokio::test]
    async fn encrypt_then_decrypt_returns_secret() {
        let vault = AesGcmVault::new(InMemoryKeyProvider::default());
        let blob = vault
            .encrypt(&SecretKey::new(SECRET))
            .await
            .expect("encrypt");
        assert!(!blob.contains(SECRET));

        let secret = vault.decrypt(&blob).await.expect("decrypt");
        assert_eq!(secret.expose_secret(), SECRET);
    }

    #[tokio::test]
    async fn same_secret_encrypts_differently() {
        let vault = AesGcmVault::new(InMemoryKeyProvider::default());
        let a = vault.encrypt(&SecretKey::new(SECRET)).await.expect("a");
        let b = vault.encrypt(&SecretKey::new(SECRET)).await.expect("b");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn malformed_blobs_are_rejected() {
        let vault = AesGcmVault::new(InMemoryKeyProvider::default());

        let err = vault.decrypt("not base64!!").await.expect_err("bad base64");
        assert!(matches!(err, VaultError::Malformed(_)));

        let short = STANDARD.encode([0u8; NONCE_LEN]);
        let err = vault.decrypt(&short).await.expect_err("too short");
        assert_eq!(err, VaultError::Malformed("ciphertext too short".into()));
    }

    #[tokio::test]
    async fn tampered_or_foreign_ciphertext_fails_authentication() {
        let vault = AesGcmVault::new(InMemoryKeyProvider::default());
        let blob = vault.encrypt(&SecretKey::new(SECRET)).await.expect("encrypt");

        let mut raw = STANDARD.decode(&blob).expect("decode");
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let err = vault
            .decrypt(&STANDARD.encode(&raw))
            .await
            .expect_err("tampered");
        assert_eq!(err, VaultError::DecryptionFailed);

        let other = AesGcmVault::new(InMemoryKeyProvider::default());
        let err = other.decrypt(&blob).await.expect_err("foreign key");
        assert_eq!(err, VaultError::DecryptionFailed);
    }

    #[tokio::test]
    async fn errors_never_echo_the_secret() {
        let vault = AesGcmVault::new(InMemoryKeyProvider::default());
        let blob = vault.encrypt(&SecretKey::new(SECRET)).await.expect("encrypt");
        let other = AesGcmVault::new(InMemoryKeyProvider::default());
        let err = other.decrypt(&blob).await.expect_err("foreign key");
        assert!(!err.to_string().contains(SECRET));
        assert!(!err.to_string().contains(&blob));
    }
}
