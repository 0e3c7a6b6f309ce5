use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use thiserror::Error;

/// Tagged persistence failures. Actions may collapse these into a generic
/// envelope code, but the tag is kept for logging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Requested key or record does not exist.
    #[error("entry not found for key: {key}")]
    NotFound { key: String },
    /// Write would violate a uniqueness or consistency constraint.
    #[error("conflict: {reason}")]
    Conflict { reason: String },
    /// Backing storage could not be reached or returned garbage.
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StoreError {
    /// Short tag used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::Conflict { .. } => "conflict",
            StoreError::Unavailable { .. } => "unavailable",
        }
    }

    pub fn unavailable(reason: impl ToString) -> Self {
        StoreError::Unavailable {
            reason: reason.to_string(),
        }
    }
}

/// Contract for encrypted-at-rest blob storage backing conversation and wallet records.
#[async_trait]
pub trait SecureStore: Send + Sync {
    /// Persist a value under a key, overwriting any existing entry.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Retrieve the value for a key.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Remove a key and its value (idempotent).
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and offline runs. Values are kept in plaintext.
///
/// [`InMemorySecureStore::set_available`] simulates an outage: while
/// unavailable, every call fails with [`StoreError::Unavailable`].
#[derive(Debug, Clone)]
pub struct InMemorySecureStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    available: Arc<AtomicBool>,
}

impl Default for InMemorySecureStore {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl InMemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable("in-memory store offline"))
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, StoreError> {
        self.inner
            .lock()
            .map_err(|err| StoreError::unavailable(format!("lock poisoned: {err}")))
    }
}

#[async_trait]
impl SecureStore for InMemorySecureStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.check_available()?;
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.check_available()?;
        self.lock()?
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let store = InMemorySecureStore::new();
        store.put("conversations", b"[]").await.expect("put");
        assert_eq!(store.get("conversations").await.expect("get"), b"[]");
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_removes_data() {
        let store = InMemorySecureStore::new();
        store.put("k", b"v").await.expect("put should succeed");
        store.delete("k").await.expect("delete should succeed");
        store
            .delete("k")
            .await
            .expect("delete again should still succeed");

        let err = store
            .get("k")
            .await
            .expect_err("get should fail after delete");
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn offline_store_rejects_every_call() {
        let store = InMemorySecureStore::new();
        store.put("k", b"v").await.expect("put");
        store.set_available(false);

        let err = store.get("k").await.expect_err("offline get");
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(store.put("k", b"w").await.is_err());

        store.set_available(true);
        assert_eq!(store.get("k").await.expect("back online"), b"v");
    }
}
