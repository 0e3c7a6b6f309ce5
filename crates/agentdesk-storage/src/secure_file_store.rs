use std::{
    fs::{self, File},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use agentdesk_core::storage::{SecureStore, StoreError};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::instrument;

use crate::{
    cipher,
    key_provider::{KeyMaterial, KeyProvider},
};

/// AES-GCM encrypted file-backed store: one file per key under `root`.
/// Keys are persisted via a `KeyProvider` (OS keyring in production).
pub struct EncryptedFileStore<P: KeyProvider> {
    root: PathBuf,
    key_provider: P,
}

impl<P: KeyProvider> EncryptedFileStore<P> {
    pub fn new(root: impl Into<PathBuf>, key_provider: P) -> Self {
        Self {
            root: root.into(),
            key_provider,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_key(key))
    }

    async fn key(&self) -> Result<KeyMaterial, StoreError> {
        self.key_provider
            .load_key()
            .await
            .map_err(|e| StoreError::unavailable(format!("key provider: {e}")))
    }
}

/// On-disk JSON envelope.
#[derive(Debug, Serialize, Deserialize)]
struct StoredBlob {
    nonce: String,
    ciphertext: String,
}

#[async_trait]
impl<P: KeyProvider> SecureStore for EncryptedFileStore<P> {
    #[instrument(skip_all, fields(key = %key))]
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let material = self.key().await?;
        let sealed = cipher::seal(&material, value).map_err(StoreError::unavailable)?;

        let blob = StoredBlob {
            nonce: URL_SAFE_NO_PAD.encode(&sealed.nonce),
            ciphertext: URL_SAFE_NO_PAD.encode(&sealed.ciphertext),
        };
        write_blob(&self.path_for(key), &blob)
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let blob = read_blob(key, &self.path_for(key))?;
        let material = self.key().await?;

        let nonce = URL_SAFE_NO_PAD
            .decode(blob.nonce)
            .map_err(|e| StoreError::unavailable(format!("nonce decode failed: {e}")))?;
        let ciphertext = URL_SAFE_NO_PAD
            .decode(blob.ciphertext)
            .map_err(|e| StoreError::unavailable(format!("ciphertext decode failed: {e}")))?;

        cipher::open(&material, &nonce, &ciphertext).map_err(StoreError::unavailable)
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::unavailable(err)),
        }
    }
}

/// Atomic write: temp file in the same directory, then rename over the target.
fn write_blob(path: &Path, blob: &StoredBlob) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::unavailable("invalid storage path"))?;
    fs::create_dir_all(parent).map_err(StoreError::unavailable)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(StoreError::unavailable)?;
    let json = serde_json::to_vec(blob).map_err(StoreError::unavailable)?;
    tmp.write_all(&json).map_err(StoreError::unavailable)?;
    tmp.flush().map_err(StoreError::unavailable)?;
    tmp.persist(path)
        .map_err(|e| StoreError::unavailable(e.error))?;
    Ok(())
}

fn read_blob(key: &str, path: &Path) -> Result<StoredBlob, StoreError> {
    let mut file = File::open(path).map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            StoreError::NotFound {
                key: key.to_string(),
            }
        } else {
            StoreError::unavailable(err)
        }
    })?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(StoreError::unavailable)?;
    serde_json::from_slice(&buf).map_err(StoreError::unavailable)
}

fn sanitize_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key)
}
