use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::StoreError;

/// Wallet record owned by a user. The private key is only ever stored encrypted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    pub id: Uuid,
    pub owner_id: String,
    /// Base58 public key.
    pub public_key: String,
    /// Ciphertext produced by a `CredentialVault`.
    pub encrypted_private_key: String,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(
        owner_id: impl Into<String>,
        public_key: impl Into<String>,
        encrypted_private_key: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            public_key: public_key.into(),
            encrypted_private_key: encrypted_private_key.into(),
            created_at: Utc::now(),
        }
    }
}

/// Persistence contract for wallets.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// First wallet owned by the user, if any.
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Wallet>, StoreError>;

    async fn insert(&self, wallet: Wallet) -> Result<Wallet, StoreError>;
}
