use std::sync::Arc;

use agentdesk_core::{
    storage::{SecureStore, StoreError},
    wallet::{Wallet, WalletRepository},
};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::RecordSet;

const WALLETS_KEY: &str = "wallets";

/// Wallet repository backed by a `SecureStore`. Wallets are returned in insertion order.
pub struct SecureStoreWalletRepo<S: SecureStore> {
    records: RecordSet<S>,
    write_lock: Mutex<()>,
}

impl<S: SecureStore> SecureStoreWalletRepo<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            records: RecordSet::new(store, WALLETS_KEY),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl<S: SecureStore> WalletRepository for SecureStoreWalletRepo<S> {
    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Wallet>, StoreError> {
        let wallets: Vec<Wallet> = self.records.load().await?;
        Ok(wallets.into_iter().find(|w| w.owner_id == owner_id))
    }

    #[instrument(skip_all, fields(owner_id = %wallet.owner_id, public_key = %wallet.public_key))]
    async fn insert(&self, wallet: Wallet) -> Result<Wallet, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut wallets: Vec<Wallet> = self.records.load().await?;
        if wallets
            .iter()
            .any(|w| w.id == wallet.id || w.public_key == wallet.public_key)
        {
            return Err(StoreError::Conflict {
                reason: format!("wallet {} already registered", wallet.public_key),
            });
        }
        wallets.push(wallet.clone());
        self.records.save(&wallets).await?;
        Ok(wallet)
    }
}
