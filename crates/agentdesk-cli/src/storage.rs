use std::{path::PathBuf, sync::Arc};

use agentdesk_core::{
    agent::AgentConfig,
    dispatch::ActionDispatcher,
    model::{EchoModel, LanguageModel},
    storage::SecureStore,
};
use agentdesk_model::openai::OpenAiModel;
use agentdesk_records::{SecureStoreConversationRepo, SecureStoreWalletRepo};
use agentdesk_storage::{
    key_provider::{KeyProvider, KeyringProvider},
    secure_file_store::EncryptedFileStore,
    vault::AesGcmVault,
};
use agentdesk_wallet::SolanaAgentFactory;
use color_eyre::Result;
use dirs::data_dir;
use tracing::{debug, warn};

use crate::config::{self, Config, EnvLookup};

/// Resolve the default data directory for Agentdesk.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("agentdesk"))
}

/// Encrypted record store rooted at the configured (or default) data directory,
/// keyed from the OS keychain.
pub fn store_from_config(config: &Config) -> Result<EncryptedFileStore<KeyringProvider>> {
    let root = match &config.data_dir {
        Some(root) => root.clone(),
        None => default_data_dir()?,
    };
    debug!(?root, "initializing encrypted store");
    Ok(EncryptedFileStore::new(root, KeyringProvider::data_key()))
}

/// Pick the configured model, falling back to the offline echo model.
pub fn model_from_config(config: &Config, env: EnvLookup<'_>) -> Arc<dyn LanguageModel> {
    if let Some(settings) = config::resolve_openai_settings(config, env) {
        match OpenAiModel::new(settings) {
            Ok(model) => return Arc::new(model),
            Err(err) => warn!("failed to init OpenAI model, falling back to echo: {err}"),
        }
    }
    Arc::new(EchoModel)
}

/// Wire every collaborator around one shared store.
pub fn dispatcher<S, P>(
    store: Arc<S>,
    vault_keys: P,
    model: Arc<dyn LanguageModel>,
    agent_config: AgentConfig,
) -> ActionDispatcher
where
    S: SecureStore + 'static,
    P: KeyProvider + 'static,
{
    ActionDispatcher::new(
        Arc::new(SecureStoreConversationRepo::new(store.clone())),
        Arc::new(SecureStoreWalletRepo::new(store)),
        Arc::new(AesGcmVault::new(vault_keys)),
        Arc::new(SolanaAgentFactory::new()),
        model,
        agent_config,
    )
}

/// Production wiring: keychain-backed store and vault, model and agent config from config/env.
pub fn dispatcher_from_config(config: &Config, env: EnvLookup<'_>) -> Result<ActionDispatcher> {
    let store = Arc::new(store_from_config(config)?);
    Ok(dispatcher(
        store,
        KeyringProvider::vault_key(),
        model_from_config(config, env),
        config::resolve_agent_config(config, env),
    ))
}

/// Helpers for tests: store rooted at a temp dir with an in-memory key.
#[cfg(test)]
pub fn test_store(
    root: impl Into<PathBuf>,
) -> EncryptedFileStore<agentdesk_storage::key_provider::InMemoryKeyProvider> {
    EncryptedFileStore::new(root, Default::default())
}
