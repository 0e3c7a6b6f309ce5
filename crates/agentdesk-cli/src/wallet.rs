use agentdesk_core::{
    context::RequestContext,
    vault::{CredentialVault, SecretKey},
    wallet::{Wallet, WalletRepository},
};
use agentdesk_wallet::WalletKeypair;
use color_eyre::{eyre::eyre, Result};
use tracing::info;

/// Encrypt a private key and register it as the current user's wallet.
/// The stored secret is the canonical base58 form regardless of the input format.
pub async fn import_wallet(
    ctx: &RequestContext,
    wallets: &dyn WalletRepository,
    vault: &dyn CredentialVault,
    private_key: &str,
) -> Result<Wallet> {
    let owner = ctx
        .user_id()
        .ok_or_else(|| eyre!("no user configured; pass --user or set user_id in the config"))?;
    let keypair = WalletKeypair::parse(private_key).map_err(|e| eyre!(e.to_string()))?;

    let encrypted = vault
        .encrypt(&SecretKey::new(keypair.to_base58()))
        .await
        .map_err(|e| eyre!(e.to_string()))?;
    let wallet = wallets
        .insert(Wallet::new(owner, keypair.public_key(), encrypted))
        .await
        .map_err(|e| eyre!(e.to_string()))?;

    info!(public_key = %wallet.public_key, "wallet imported");
    Ok(wallet)
}
