use std::sync::Arc;

use agentdesk_core::{
    conversation::{Conversation, ConversationRepository},
    storage::{SecureStore, StoreError},
};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::RecordSet;

const CONVERSATIONS_KEY: &str = "conversations";

/// Conversation repository backed by a `SecureStore`.
pub struct SecureStoreConversationRepo<S: SecureStore> {
    records: RecordSet<S>,
    // Serializes read-modify-write cycles on the record set.
    write_lock: Mutex<()>,
}

impl<S: SecureStore> SecureStoreConversationRepo<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            records: RecordSet::new(store, CONVERSATIONS_KEY),
            write_lock: Mutex::new(()),
        }
    }

    /// Seed a conversation. Fails with `Conflict` if the id is taken.
    #[instrument(skip_all, fields(conversation_id = %conversation.id))]
    pub async fn insert(&self, conversation: Conversation) -> Result<Conversation, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut conversations: Vec<Conversation> = self.records.load().await?;
        if conversations.iter().any(|c| c.id == conversation.id) {
            return Err(StoreError::Conflict {
                reason: format!("conversation {} already exists", conversation.id),
            });
        }
        conversations.push(conversation.clone());
        self.records.save(&conversations).await?;
        Ok(conversation)
    }
}

#[async_trait]
impl<S: SecureStore> ConversationRepository for SecureStoreConversationRepo<S> {
    #[instrument(skip(self))]
    async fn find(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        let conversations: Vec<Conversation> = self.records.load().await?;
        Ok(conversations.into_iter().find(|c| c.id == id))
    }

    #[instrument(skip(self, title))]
    async fn update_title(&self, id: &str, title: &str) -> Result<Conversation, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut conversations: Vec<Conversation> = self.records.load().await?;
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound { key: id.to_string() })?;
        conversation.title = title.to_string();
        conversation.updated_at = chrono::Utc::now();
        let updated = conversation.clone();
        self.records.save(&conversations).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use agentdesk_core::{
        conversation::{rename_conversation, RenameConversation},
        storage::InMemorySecureStore,
    };

    use super::*;

    async fn seeded() -> (
        Arc<InMemorySecureStore>,
        SecureStoreConversationRepo<InMemorySecureStore>,
    ) {
        let store = Arc::new(InMemorySecureStore::new());
        let repo = SecureStoreConversationRepo::new(store.clone());
        repo.insert(Conversation::new("c1", "Untitled"))
            .await
            .expect("seed");
        (store, repo)
    }

    #[tokio::test]
    async fn update_title_persists() {
        let (_, repo) = seeded().await;
        let before = repo.find("c1").await.expect("find").expect("exists");

        let updated = repo.update_title("c1", "Trip to Japan").await.expect("update");
        assert_eq!(updated.title, "Trip to Japan");
        assert!(updated.updated_at >= before.updated_at);

        let found = repo.find("c1").await.expect("find").expect("exists");
        assert_eq!(found, updated);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (_, repo) = seeded().await;
        let err = repo
            .update_title("missing", "Title")
            .await
            .expect_err("no such conversation");
        assert_eq!(
            err,
            StoreError::NotFound {
                key: "missing".into()
            }
        );
        assert_eq!(repo.find("missing").await.expect("find"), None);
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let (_, repo) = seeded().await;
        let err = repo
            .insert(Conversation::new("c1", "Again"))
            .await
            .expect_err("duplicate id");
        assert_eq!(err.kind(), "conflict");
    }

    #[tokio::test]
    async fn rename_action_through_repository() {
        let (store, repo) = seeded().await;

        let ok = rename_conversation(&repo, RenameConversation::new("c1", "Kyoto itinerary"))
            .await
            .expect("valid");
        assert!(ok.is_success());
        assert_eq!(
            repo.find("c1").await.expect("find").expect("exists").title,
            "Kyoto itinerary"
        );

        let missing = rename_conversation(&repo, RenameConversation::new("nope", "Title"))
            .await
            .expect("valid");
        assert_eq!(
            missing.error(),
            Some(agentdesk_core::action::ActionErrorCode::UnexpectedError)
        );

        store.set_available(false);
        let offline = rename_conversation(&repo, RenameConversation::new("c1", "Osaka"))
            .await
            .expect("valid");
        assert!(!offline.is_success());
    }

    #[tokio::test]
    async fn corrupt_record_set_is_unavailable() {
        let store = Arc::new(InMemorySecureStore::new());
        store.put(CONVERSATIONS_KEY, b"{not json").await.expect("put");
        let repo = SecureStoreConversationRepo::new(store);
        let err = repo.find("c1").await.expect_err("corrupt");
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }
}
