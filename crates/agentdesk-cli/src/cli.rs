use clap::{Parser, Subcommand};

/// CLI surface definition: one subcommand per action plus housekeeping.
#[derive(Parser, Debug)]
#[command(
    name = "agentdesk",
    about = "Conversation and wallet-agent actions for chat assistants",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Act as this user (overrides `user_id` in the config file).
    #[arg(long, global = true, env = "AGENTDESK_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print version and exit.
    Version,
    /// Run a health check against the encrypted store.
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate a conversation title from a first user message.
    Title {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Rename a conversation.
    Rename { id: String, title: String },
    /// Retrieve the wallet agent for the current user.
    Agent {
        /// Also query the wallet balance over RPC.
        #[arg(long)]
        balance: bool,
    },
    /// Manage the current user's wallet.
    #[command(subcommand)]
    Wallet(WalletCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WalletCommand {
    /// Encrypt and store a private key (base58 or JSON byte array).
    Import {
        #[arg(env = "AGENTDESK_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_health_subcommand() {
        let cli = Cli::try_parse_from(["agentdesk", "health"]).expect("parse should succeed");
        assert_eq!(cli.command, Command::Health);
    }

    #[test]
    fn parses_config_init_subcommand() {
        let cli =
            Cli::try_parse_from(["agentdesk", "config", "init"]).expect("parse should succeed");
        assert_eq!(cli.command, Command::Config(ConfigCommand::Init));
    }

    #[test]
    fn title_joins_free_text() {
        let cli = Cli::try_parse_from(["agentdesk", "title", "Plan", "a", "trip"])
            .expect("parse should succeed");
        assert_eq!(
            cli.command,
            Command::Title {
                message: vec!["Plan".into(), "a".into(), "trip".into()]
            }
        );
    }

    #[test]
    fn title_requires_a_message() {
        assert!(Cli::try_parse_from(["agentdesk", "title"]).is_err());
    }

    #[test]
    fn rename_takes_id_and_title() {
        let cli = Cli::try_parse_from(["agentdesk", "rename", "c1", "Trip to Japan"])
            .expect("parse should succeed");
        assert_eq!(
            cli.command,
            Command::Rename {
                id: "c1".into(),
                title: "Trip to Japan".into()
            }
        );
    }

    #[test]
    fn user_flag_is_global() {
        let cli = Cli::try_parse_from(["agentdesk", "agent", "--balance", "--user", "u1"])
            .expect("parse should succeed");
        assert_eq!(cli.user.as_deref(), Some("u1"));
        assert_eq!(cli.command, Command::Agent { balance: true });
    }
}
