mod cli;
mod config;
mod storage;
mod wallet;

use std::sync::Arc;

use agentdesk_core::{
    context::{Identity, RequestContext},
    conversation::RenameConversation,
    dispatch::ActionDispatcher,
    storage::SecureStore,
    title::ChatMessage,
};
use agentdesk_records::SecureStoreWalletRepo;
use agentdesk_storage::{key_provider::KeyringProvider, vault::AesGcmVault};
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Command, ConfigCommand, WalletCommand};

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    let ctx = request_context(cli.user.clone(), &config);

    match cli.command {
        Command::Version => print_version(),
        Command::Health => run_health_check(&config).await?,
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
        Command::Title { message } => {
            let dispatcher = storage::dispatcher_from_config(&config, &config::process_env)?;
            let title = run_title(&dispatcher, message.join(" ")).await?;
            println!("{title}");
        }
        Command::Rename { id, title } => {
            let dispatcher = storage::dispatcher_from_config(&config, &config::process_env)?;
            println!("{}", run_rename(&dispatcher, id, title).await?);
        }
        Command::Agent { balance } => {
            let dispatcher = storage::dispatcher_from_config(&config, &config::process_env)?;
            run_agent(&dispatcher, &ctx, balance).await?
        }
        Command::Wallet(WalletCommand::Import { private_key }) => {
            let store = Arc::new(storage::store_from_config(&config)?);
            let wallets = SecureStoreWalletRepo::new(store);
            let vault = AesGcmVault::new(KeyringProvider::vault_key());
            let wallet = wallet::import_wallet(&ctx, &wallets, &vault, &private_key).await?;
            println!("Imported wallet {} for {}", wallet.public_key, wallet.owner_id);
        }
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("agentdesk {}", env!("CARGO_PKG_VERSION"));
}

/// `--user` wins over the configured user; neither means anonymous.
fn request_context(flag: Option<String>, config: &config::Config) -> RequestContext {
    flag.or_else(|| config.user_id.clone())
        .map(Identity::new)
        .into()
}

/// Runs a quick health check of the encrypted storage path.
async fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store).await?;
    println!("Storage: ok ({})", store.root().display());
    Ok(())
}

async fn run_store_health<S: SecureStore>(store: &S) -> Result<()> {
    let probe_key = "health/probe";
    let payload = b"ok";
    store
        .put(probe_key, payload)
        .await
        .map_err(|e| eyre!(e.to_string()))?;
    let round_trip = store
        .get(probe_key)
        .await
        .map_err(|e| eyre!(e.to_string()))?;
    store
        .delete(probe_key)
        .await
        .map_err(|e| eyre!(e.to_string()))?;

    if round_trip != payload {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

async fn run_title(dispatcher: &ActionDispatcher, message: String) -> Result<String> {
    tracing::debug!(model = dispatcher.model_name(), "generating title");
    dispatcher
        .generate_title(&ChatMessage::user(message))
        .await
        .map_err(|e| eyre!("{e:#}"))
}

async fn run_rename(dispatcher: &ActionDispatcher, id: String, title: String) -> Result<String> {
    let response = dispatcher
        .rename_conversation(RenameConversation::new(id, title))
        .await?;
    to_json(&response)
}

async fn run_agent(dispatcher: &ActionDispatcher, ctx: &RequestContext, balance: bool) -> Result<()> {
    let response = dispatcher
        .retrieve_agent(ctx)
        .await
        .map_err(|e| eyre!("{e:#}"))?;
    println!("{}", to_json(&response)?);

    if let (true, Some(data)) = (balance, response.data()) {
        let lamports = data.agent.balance().await.map_err(|e| eyre!("{e:#}"))?;
        println!(
            "Balance: {:.9} SOL ({lamports} lamports)",
            lamports as f64 / LAMPORTS_PER_SOL
        );
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
