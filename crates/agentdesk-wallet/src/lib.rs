//! Solana wallet agents: built from a decrypted keypair plus RPC/model configuration.

pub mod keypair;

use std::{fmt, sync::Arc, time::Duration};

use agentdesk_core::{
    agent::{AgentConfig, AgentFactory, AgentHandle, WalletAgent},
    vault::SecretKey,
};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use solana_client::nonblocking::rpc_client::RpcClient;
use tracing::{debug, instrument};

pub use keypair::{KeypairError, WalletKeypair};

const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds [`SolanaAgent`]s.
#[derive(Debug, Clone)]
pub struct SolanaAgentFactory {
    rpc_timeout: Duration,
}

impl Default for SolanaAgentFactory {
    fn default() -> Self {
        Self {
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

impl SolanaAgentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rpc_timeout(rpc_timeout: Duration) -> Self {
        Self { rpc_timeout }
    }
}

impl AgentFactory for SolanaAgentFactory {
    fn name(&self) -> &'static str {
        "solana"
    }

    #[instrument(skip_all)]
    fn build(&self, secret: &SecretKey, config: &AgentConfig) -> Result<AgentHandle> {
        let agent = SolanaAgent::new(secret, config, self.rpc_timeout)?;
        debug!(public_key = %agent.public_key, "agent constructed");
        Ok(Arc::new(agent))
    }
}

/// Agent acting for one wallet against one RPC endpoint.
pub struct SolanaAgent {
    keypair: WalletKeypair,
    public_key: String,
    rpc_url: Url,
    model_api_key: String,
    rpc: RpcClient,
}

impl SolanaAgent {
    pub fn new(secret: &SecretKey, config: &AgentConfig, rpc_timeout: Duration) -> Result<Self> {
        let keypair =
            WalletKeypair::parse(secret.expose_secret()).context("parsing wallet keypair")?;
        let rpc_url = parse_rpc_url(&config.rpc_url)?;
        if config.model_api_key.trim().is_empty() {
            bail!("model api key is not configured");
        }

        Ok(Self {
            public_key: keypair.public_key(),
            keypair,
            rpc: RpcClient::new_with_timeout(rpc_url.to_string(), rpc_timeout),
            rpc_url,
            model_api_key: config.model_api_key.clone(),
        })
    }

    pub fn keypair(&self) -> &WalletKeypair {
        &self.keypair
    }
}

impl fmt::Debug for SolanaAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaAgent")
            .field("public_key", &self.public_key)
            .field("rpc_host", &self.rpc_url.host_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletAgent for SolanaAgent {
    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn rpc_url(&self) -> &str {
        self.rpc_url.as_str()
    }

    fn model_api_key(&self) -> &str {
        &self.model_api_key
    }

    #[instrument(skip_all, fields(public_key = %self.public_key))]
    async fn balance(&self) -> Result<u64> {
        let lamports = self
            .rpc
            .get_balance(&self.keypair.pubkey())
            .await
            .context("getBalance request failed")?;
        debug!(lamports, "balance fetched");
        Ok(lamports)
    }
}

fn parse_rpc_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("rpc endpoint is not configured");
    }
    let url = Url::parse(raw).context("invalid rpc endpoint")?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("unsupported rpc scheme: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> WalletKeypair {
        WalletKeypair::from_seed([9u8; 32])
    }

    fn secret() -> SecretKey {
        SecretKey::new(keypair().to_base58())
    }

    fn config() -> AgentConfig {
        AgentConfig {
            rpc_url: "https://mainnet.helius-rpc.com/?api-key=abc".into(),
            model_api_key: "sk-test".into(),
        }
    }

    #[test]
    fn builds_agent_with_derived_public_key() {
        let agent = SolanaAgentFactory::new()
            .build(&secret(), &config())
            .expect("agent");
        assert_eq!(agent.public_key(), keypair().public_key());
        assert!(agent.rpc_url().starts_with("https://mainnet.helius-rpc.com/"));
        assert_eq!(agent.model_api_key(), "sk-test");
    }

    #[test]
    fn every_build_is_a_new_agent() {
        let factory = SolanaAgentFactory::new();
        let a = factory.build(&secret(), &config()).expect("a");
        let b = factory.build(&secret(), &config()).expect("b");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn rejects_missing_or_invalid_configuration() {
        let factory = SolanaAgentFactory::new();
        let cases = [
            (
                AgentConfig {
                    rpc_url: String::new(),
                    ..config()
                },
                "rpc endpoint is not configured",
            ),
            (
                AgentConfig {
                    rpc_url: "ws://localhost:8900".into(),
                    ..config()
                },
                "unsupported rpc scheme",
            ),
            (
                AgentConfig {
                    model_api_key: " ".into(),
                    ..config()
                },
                "model api key is not configured",
            ),
        ];
        for (cfg, expected) in cases {
            let err = factory.build(&secret(), &cfg).expect_err("should fail");
            assert!(
                format!("{err:#}").contains(expected),
                "unexpected error: {err:#}"
            );
        }
    }

    #[test]
    fn rejects_invalid_secret() {
        let factory = SolanaAgentFactory::new();
        let err = factory
            .build(&SecretKey::new("not-a-keypair"), &config())
            .expect_err("bad secret");
        assert!(format!("{err:#}").contains("parsing wallet keypair"));

        let mut inconsistent = [9u8; 64];
        inconsistent[32..].copy_from_slice(&[7u8; 32]);
        let err = factory
            .build(
                &SecretKey::new(bs58::encode(inconsistent).into_string()),
                &config(),
            )
            .expect_err("mismatched halves");
        assert!(format!("{err:#}").contains("does not match"));
    }

    #[test]
    fn debug_output_has_no_secrets() {
        let agent = SolanaAgent::new(&secret(), &config(), DEFAULT_RPC_TIMEOUT).expect("agent");
        let printed = format!("{agent:?}");
        assert!(!printed.contains("sk-test"));
        assert!(!printed.contains("api-key=abc"));
        assert!(!printed.contains(&agent.keypair().to_base58()));
    }

    #[tokio::test]
    async fn unreachable_rpc_is_a_balance_error() {
        let factory = SolanaAgentFactory::with_rpc_timeout(Duration::from_secs(2));
        let agent = factory
            .build(
                &secret(),
                &AgentConfig {
                    rpc_url: "http://127.0.0.1:9".into(),
                    ..config()
                },
            )
            .expect("agent");
        let err = agent.balance().await.expect_err("nothing listens on port 9");
        assert!(format!("{err:#}").contains("getBalance request failed"));
    }
}
