use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, warn};

use crate::{
    action::{ActionEmptyResponse, ActionErrorCode, ActionResponse},
    storage::StoreError,
};

/// Inclusive bounds on a conversation title, counted in UTF-16 code units.
pub const TITLE_MIN_LEN: usize = 1;
pub const TITLE_MAX_LEN: usize = 100;

/// Conversation record. Only the title is mutable from this layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Persistence contract for conversations.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find(&self, id: &str) -> Result<Option<Conversation>, StoreError>;

    /// Replace the title of an existing conversation.
    async fn update_title(&self, id: &str, title: &str) -> Result<Conversation, StoreError>;
}

/// Input rejected before any side effect runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must be between {min} and {max} UTF-16 units long, got {len}")]
    TitleLength { len: usize, min: usize, max: usize },
}

/// Input shape of the rename action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameConversation {
    pub id: String,
    pub title: String,
}

impl RenameConversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let len = self.title.encode_utf16().count();
        if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
            return Err(ValidationError::TitleLength {
                len,
                min: TITLE_MIN_LEN,
                max: TITLE_MAX_LEN,
            });
        }
        Ok(())
    }
}

/// Rename a conversation.
///
/// Invalid input returns `Err` without touching the repository. Every store
/// failure is logged with its tag and reported as `UNEXPECTED_ERROR`.
#[instrument(skip_all, fields(conversation_id = %input.id))]
pub async fn rename_conversation(
    conversations: &dyn ConversationRepository,
    input: RenameConversation,
) -> Result<ActionEmptyResponse, ValidationError> {
    input.validate()?;

    match conversations.update_title(&input.id, &input.title).await {
        Ok(_) => Ok(ActionResponse::empty()),
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "rename failed");
            Ok(ActionResponse::failure(ActionErrorCode::UnexpectedError))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use serde_json::json;

    use super::*;

    /// Records calls and optionally fails every update with a fixed error.
    #[derive(Default)]
    struct RecordingRepo {
        updates: AtomicUsize,
        fail_with: Option<StoreError>,
        last_title: Mutex<Option<String>>,
    }

    #[async_trait]
    impl ConversationRepository for RecordingRepo {
        async fn find(&self, _id: &str) -> Result<Option<Conversation>, StoreError> {
            Ok(None)
        }

        async fn update_title(&self, id: &str, title: &str) -> Result<Conversation, StoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            *self.last_title.lock().unwrap() = Some(title.to_string());
            Ok(Conversation::new(id, title))
        }
    }

    #[tokio::test]
    async fn rejects_out_of_range_titles_before_storage() {
        let repo = RecordingRepo::default();
        for title in [String::new(), "x".repeat(TITLE_MAX_LEN + 1)] {
            let err = rename_conversation(&repo, RenameConversation::new("c1", title))
                .await
                .expect_err("should reject");
            assert!(matches!(err, ValidationError::TitleLength { .. }));
        }
        assert_eq!(repo.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn astral_characters_count_twice() {
        let repo = RecordingRepo::default();
        let err = rename_conversation(&repo, RenameConversation::new("c1", "😀".repeat(51)))
            .await
            .expect_err("102 units is over the limit");
        assert_eq!(
            err,
            ValidationError::TitleLength {
                len: 102,
                min: TITLE_MIN_LEN,
                max: TITLE_MAX_LEN
            }
        );
        assert_eq!(repo.updates.load(Ordering::SeqCst), 0);

        let resp = rename_conversation(&repo, RenameConversation::new("c1", "😀".repeat(50)))
            .await
            .expect("100 units is within bounds");
        assert!(resp.is_success());
    }

    #[tokio::test]
    async fn accepts_boundary_lengths() {
        let repo = RecordingRepo::default();
        // 100 multi-byte BMP characters is still within bounds.
        let long = "é".repeat(TITLE_MAX_LEN);
        for title in ["a".to_string(), long.clone()] {
            let resp = rename_conversation(&repo, RenameConversation::new("c1", title))
                .await
                .expect("valid input");
            assert!(resp.is_success());
        }
        assert_eq!(repo.updates.load(Ordering::SeqCst), 2);
        assert_eq!(repo.last_title.lock().unwrap().as_deref(), Some(long.as_str()));
    }

    #[tokio::test]
    async fn successful_update_is_bare_success() {
        let repo = RecordingRepo::default();
        let resp = rename_conversation(&repo, RenameConversation::new("c1", "Trip to Japan"))
            .await
            .expect("valid input");
        assert_eq!(
            serde_json::to_value(resp).expect("serialize"),
            json!({ "success": true })
        );
    }

    #[tokio::test]
    async fn every_store_failure_maps_to_unexpected_error() {
        let failures = [
            StoreError::NotFound { key: "c1".into() },
            StoreError::Conflict {
                reason: "dup".into(),
            },
            StoreError::unavailable("offline"),
        ];
        for failure in failures {
            let repo = RecordingRepo {
                fail_with: Some(failure),
                ..Default::default()
            };
            let resp = rename_conversation(&repo, RenameConversation::new("c1", "New title"))
                .await
                .expect("valid input");
            assert_eq!(
                serde_json::to_value(resp).expect("serialize"),
                json!({ "success": false, "error": "UNEXPECTED_ERROR" })
            );
            assert_eq!(repo.updates.load(Ordering::SeqCst), 1);
        }
    }
}
