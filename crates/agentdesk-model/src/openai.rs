use agentdesk_core::model::{Completion, CompletionRequest, LanguageModel};
use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the OpenAI model client.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
    pub api_base: Option<String>,
}

impl OpenAiSettings {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_base: None,
        }
    }
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// OpenAI-backed model using chat completions.
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    settings: OpenAiSettings,
}

impl OpenAiModel {
    pub fn new(settings: OpenAiSettings) -> Result<Self> {
        anyhow::ensure!(!settings.api_key.trim().is_empty(), "openai api key is empty");
        let mut config = OpenAIConfig::new().with_api_key(&settings.api_key);
        if let Some(base) = &settings.api_base {
            config = config.with_api_base(base);
        }
        let client = Client::with_config(config);
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn name(&self) -> &'static str {
        "openai"
    }

    #[instrument(skip_all, fields(provider = "openai", model = %self.settings.model))]
    async fn generate_text(&self, request: CompletionRequest) -> Result<Completion> {
        let req = CreateChatCompletionRequestArgs::default()
            .model(self.settings.model.clone())
            .messages(chat_messages(request)?)
            .build()
            .context("building chat completion request")?;

        let resp = self
            .client
            .chat()
            .create(req)
            .await
            .context("openai chat completion failed")?;

        let text = first_choice_text(resp)?;
        debug!(chars = text.chars().count(), "completion received");

        Ok(Completion { text })
    }
}

/// Content of the first choice, exactly as the provider returned it.
fn first_choice_text(resp: CreateChatCompletionResponse) -> Result<String> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .context("openai returned no choices")?;
    Ok(choice.message.content.unwrap_or_default())
}

/// System instructions first, then the serialized user prompt.
fn chat_messages(request: CompletionRequest) -> Result<Vec<ChatCompletionRequestMessage>> {
    let system = ChatCompletionRequestSystemMessageArgs::default()
        .content(ChatCompletionRequestSystemMessageContent::Text(request.system))
        .build()
        .context("building system message")?;
    let user = ChatCompletionRequestUserMessageArgs::default()
        .content(ChatCompletionRequestUserMessageContent::Text(request.prompt))
        .build()
        .context("building user message")?;

    Ok(vec![
        ChatCompletionRequestMessage::System(system),
        ChatCompletionRequestMessage::User(user),
    ])
}
