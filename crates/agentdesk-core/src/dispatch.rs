use std::sync::Arc;

use anyhow::Result;

use crate::{
    action::{ActionEmptyResponse, ActionResponse},
    agent::{self, AgentConfig, AgentData, AgentFactory},
    context::RequestContext,
    conversation::{self, ConversationRepository, RenameConversation, ValidationError},
    model::LanguageModel,
    title::{self, ChatMessage},
    vault::CredentialVault,
    wallet::WalletRepository,
};

/// Shared collaborators behind the actions. Cheap to clone; holds no request state.
#[derive(Clone)]
pub struct ActionDispatcher {
    conversations: Arc<dyn ConversationRepository>,
    wallets: Arc<dyn WalletRepository>,
    vault: Arc<dyn CredentialVault>,
    agents: Arc<dyn AgentFactory>,
    model: Arc<dyn LanguageModel>,
    agent_config: AgentConfig,
}

impl ActionDispatcher {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        wallets: Arc<dyn WalletRepository>,
        vault: Arc<dyn CredentialVault>,
        agents: Arc<dyn AgentFactory>,
        model: Arc<dyn LanguageModel>,
        agent_config: AgentConfig,
    ) -> Self {
        Self {
            conversations,
            wallets,
            vault,
            agents,
            model,
            agent_config,
        }
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    pub async fn generate_title(&self, message: &ChatMessage) -> Result<String> {
        title::generate_title(self.model.as_ref(), message).await
    }

    pub async fn rename_conversation(
        &self,
        input: RenameConversation,
    ) -> Result<ActionEmptyResponse, ValidationError> {
        conversation::rename_conversation(self.conversations.as_ref(), input).await
    }

    pub async fn retrieve_agent(&self, ctx: &RequestContext) -> Result<ActionResponse<AgentData>> {
        agent::retrieve_agent(
            ctx,
            self.wallets.as_ref(),
            self.vault.as_ref(),
            self.agents.as_ref(),
            &self.agent_config,
        )
        .await
    }
}
