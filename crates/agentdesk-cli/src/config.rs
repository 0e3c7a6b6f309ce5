use std::{
    fs,
    path::{Path, PathBuf},
};

use agentdesk_core::agent::AgentConfig;
use agentdesk_model::openai::{OpenAiSettings, DEFAULT_MODEL};
use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

/// User-level configuration loaded from `~/.config/agentdesk/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for data directory (encrypted store).
    pub data_dir: Option<PathBuf>,
    /// Identity used when `--user` is not given.
    pub user_id: Option<String>,
    /// Model provider config.
    pub openai: Option<OpenAiConfig>,
    /// Chain access for wallet agents.
    pub solana: Option<SolanaConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct SolanaConfig {
    pub rpc_url: Option<String>,
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("agentdesk").join("config.toml"))
}

/// Write the config to the default path unless a file already exists there.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    write_to_path_if_missing(config, &default_path()?)
}

fn write_to_path_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}

/// Source of environment fallbacks; a closure in tests, `std::env::var` in production.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn process_env(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

/// Blank values count as unset, in the file and in the environment.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn first_env(env: EnvLookup<'_>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env(name))
}

/// OpenAI settings from config, falling back to the environment. `None` without a key.
pub fn resolve_openai_settings(config: &Config, env: EnvLookup<'_>) -> Option<OpenAiSettings> {
    let key = non_blank(config.openai.as_ref().and_then(|c| c.api_key.clone()))
        .or_else(|| first_env(env, &["AGENTDESK_OPENAI_API_KEY", "OPENAI_API_KEY"]));

    let model = non_blank(config.openai.as_ref().and_then(|c| c.model.clone()))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let api_base = non_blank(config.openai.as_ref().and_then(|c| c.endpoint.clone()));

    key.map(|api_key| OpenAiSettings {
        api_key,
        model,
        api_base,
    })
}

/// Agent configuration. Missing values stay empty; agent construction rejects them.
pub fn resolve_agent_config(config: &Config, env: EnvLookup<'_>) -> AgentConfig {
    let rpc_url = non_blank(config.solana.as_ref().and_then(|s| s.rpc_url.clone()))
        .or_else(|| first_env(env, &["AGENTDESK_RPC_URL", "HELIUS_RPC_URL", "SOLANA_RPC_URL"]))
        .unwrap_or_default();
    let model_api_key = resolve_openai_settings(config, env)
        .map(|settings| settings.api_key)
        .unwrap_or_default();

    AgentConfig {
        rpc_url,
        model_api_key,
    }
}
