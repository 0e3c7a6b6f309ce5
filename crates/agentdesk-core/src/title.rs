//! Conversation title generation from the first user message.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::model::{CompletionRequest, LanguageModel};

/// Fixed instructions for the title call. The length and punctuation rules are
/// requests to the model; the output is not checked against them.
pub const TITLE_SYSTEM_PROMPT: &str = "\
- you will generate a short title based on the first message a user begins a conversation with
- ensure it is not more than 80 characters long
- the title should be a summary of the user's message
- do not use quotes or colons";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Chat message as sent by the client. `content` is arbitrary JSON
/// (plain text or structured parts).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: serde_json::Value,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: serde_json::Value::String(text.into()),
        }
    }
}

/// Ask the model for a title summarizing `message`. Provider errors propagate.
#[instrument(skip_all, fields(model = model.name()))]
pub async fn generate_title(model: &dyn LanguageModel, message: &ChatMessage) -> Result<String> {
    let prompt = serde_json::to_string(message).context("serializing chat message")?;
    let completion = model
        .generate_text(CompletionRequest {
            system: TITLE_SYSTEM_PROMPT.to_string(),
            prompt,
        })
        .await?;
    debug!(chars = completion.text.chars().count(), "title generated");
    Ok(completion.text)
}
