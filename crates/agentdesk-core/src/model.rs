use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Single-shot text generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System instructions steering the model.
    pub system: String,
    /// User-side prompt text.
    pub prompt: String,
}

/// Model output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
}

/// Contract for any language model provider (OpenAI, local, stub).
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short name used for logging and UI.
    fn name(&self) -> &'static str;

    async fn generate_text(&self, request: CompletionRequest) -> Result<Completion>;
}

/// Offline model for tests and smoke runs: turns the prompt into a title-like
/// string deterministically. JSON chat messages contribute their `content` text;
/// quotes and colons are dropped and the result is capped at 80 characters.
pub struct EchoModel;

const ECHO_MAX_CHARS: usize = 80;

#[async_trait]
impl LanguageModel for EchoModel {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn generate_text(&self, request: CompletionRequest) -> Result<Completion> {
        let source = serde_json::from_str::<serde_json::Value>(&request.prompt)
            .ok()
            .and_then(|value| value.get("content").cloned())
            .map(|content| match content {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            })
            .unwrap_or(request.prompt);

        let cleaned: String = source
            .chars()
            .filter(|c| !matches!(c, '"' | ':'))
            .collect();
        let text = cleaned
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(ECHO_MAX_CHARS)
            .collect::<String>()
            .trim_end()
            .to_string();

        Ok(Completion {
            text: if text.is_empty() {
                "New conversation".to_string()
            } else {
                text
            },
        })
    }
}
