//! Wallet agents: per-request handles that act on behalf of a wallet owner.

use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{ser::SerializeStruct, Serialize, Serializer};
use tracing::{info, instrument, warn};

use crate::{
    action::{ActionErrorCode, ActionResponse},
    context::RequestContext,
    vault::{CredentialVault, SecretKey},
    wallet::WalletRepository,
};

/// Process-wide values every agent needs, passed explicitly.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AgentConfig {
    /// Blockchain RPC endpoint.
    pub rpc_url: String,
    /// API key the agent uses for its model provider.
    pub model_api_key: String,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("rpc_url", &self.rpc_url)
            .field("model_api_key", &"<redacted>")
            .finish()
    }
}

/// Stateful agent built from a decrypted wallet key. Lives for one request.
#[async_trait]
pub trait WalletAgent: Send + Sync + fmt::Debug {
    /// Base58 public key derived from the private key the agent was built with.
    fn public_key(&self) -> &str;

    fn rpc_url(&self) -> &str;

    /// Key the agent's model-backed tools authenticate with.
    fn model_api_key(&self) -> &str;

    /// Native balance in the chain's smallest unit.
    async fn balance(&self) -> Result<u64>;
}

pub type AgentHandle = Arc<dyn WalletAgent>;

/// Builds agents. Fails when the key or configuration is unusable.
pub trait AgentFactory: Send + Sync {
    fn name(&self) -> &'static str;

    fn build(&self, secret: &SecretKey, config: &AgentConfig) -> Result<AgentHandle>;
}

/// Success payload of agent retrieval. Serializes only public fields of the agent.
#[derive(Debug, Clone)]
pub struct AgentData {
    pub agent: AgentHandle,
}

impl Serialize for AgentData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct PublicAgent<'a>(&'a dyn WalletAgent);

        impl Serialize for PublicAgent<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut state = serializer.serialize_struct("Agent", 1)?;
                state.serialize_field("publicKey", self.0.public_key())?;
                state.end()
            }
        }

        let mut state = serializer.serialize_struct("AgentData", 1)?;
        state.serialize_field("agent", &PublicAgent(self.agent.as_ref()))?;
        state.end()
    }
}

/// Retrieve a fresh agent for the authenticated user's wallet.
///
/// Stops at the first unmet precondition: no identity yields `UNAUTHORIZED`,
/// no wallet yields `WALLET_NOT_FOUND`. Lookup, decryption and construction
/// failures are returned as `Err`, not as envelope codes. Nothing is cached.
#[instrument(skip_all)]
pub async fn retrieve_agent(
    ctx: &RequestContext,
    wallets: &dyn WalletRepository,
    vault: &dyn CredentialVault,
    factory: &dyn AgentFactory,
    config: &AgentConfig,
) -> Result<ActionResponse<AgentData>> {
    let Some(user_id) = ctx.user_id() else {
        return Ok(ActionResponse::failure(ActionErrorCode::Unauthorized));
    };

    let wallet = wallets
        .find_by_owner(user_id)
        .await
        .context("wallet lookup failed")?;
    let Some(wallet) = wallet else {
        return Ok(ActionResponse::failure(ActionErrorCode::WalletNotFound));
    };

    info!(public_key = %wallet.public_key, "retrieved wallet");

    let secret = vault
        .decrypt(&wallet.encrypted_private_key)
        .await
        .context("decrypting wallet private key")?;
    let agent = factory
        .build(&secret, config)
        .with_context(|| format!("building {} agent", factory.name()))?;

    if agent.public_key() != wallet.public_key {
        warn!(
            stored = %wallet.public_key,
            derived = %agent.public_key(),
            "decrypted key does not match stored public key"
        );
    }

    Ok(ActionResponse::success(AgentData { agent }))
}
