//! Conversation and wallet repositories backed by any `SecureStore` (encrypted at rest).
//! Each record kind lives as one JSON array under a fixed store key.

mod conversations;
mod wallets;

use std::sync::Arc;

use agentdesk_core::storage::{SecureStore, StoreError};
use serde::{de::DeserializeOwned, Serialize};

pub use conversations::SecureStoreConversationRepo;
pub use wallets::SecureStoreWalletRepo;

/// JSON array of records stored under a single key.
struct RecordSet<S: SecureStore> {
    store: Arc<S>,
    key: &'static str,
}

impl<S: SecureStore> RecordSet<S> {
    fn new(store: Arc<S>, key: &'static str) -> Self {
        Self { store, key }
    }

    async fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        match self.store.get(self.key).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Unavailable {
                reason: format!("corrupt {} record set: {e}", self.key),
            }),
            Err(StoreError::NotFound { .. }) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    async fn save<T: Serialize>(&self, records: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records).map_err(StoreError::unavailable)?;
        self.store.put(self.key, &bytes).await
    }
}
