//! Wallet session CLI
//!
//! Inspect and maintain the persisted wallet session outside the browser.

use clap::{Parser, Subcommand};
use marketplace_wallet::account_source::{AccountSource, GraphqlAccountSource};
use marketplace_wallet::provider::EvmProviderFactory;
use marketplace_wallet::session::{FileSessionStore, SessionStore, WalletSession};
use marketplace_wallet::signature::reorder_rsv_to_vrs;
use marketplace_wallet::{Address, Config, Result, RpcConfig, Wallet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "wallet-session")]
#[command(about = "Inspect and maintain marketplace wallet sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the chains of the current network mode
    Chains,

    /// Inspect or delete the persisted session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Reorder an RSV signature into VRS form
    Reorder {
        /// 0x-prefixed 65-byte signature
        signature: String,
    },

    /// Look up an account on the account source
    Account {
        /// Account address
        address: String,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Print the persisted session
    Show,
    /// Forget all accounts and providers
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_env_overrides()?;

    match cli.command {
        Commands::Chains => list_chains(&config),
        Commands::Session { action } => match action {
            SessionAction::Show => show_session(&config).await?,
            SessionAction::Clear => clear_session(config).await?,
        },
        Commands::Reorder { signature } => {
            println!("{}", reorder_rsv_to_vrs(&signature)?);
        }
        Commands::Account { address } => lookup_account(&config, address).await?,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            let rpc = RpcConfig::from_env();
            for chain in config.network_mode.chains() {
                if let Some(url) = rpc.get(*chain) {
                    println!("{:<20} {}", chain.display_name(), url);
                }
            }
        }
    }

    Ok(())
}

fn list_chains(config: &Config) {
    tracing::debug!(mode = ?config.network_mode, "Listing chains");
    for chain in config.network_mode.chains() {
        let network_id = chain
            .network_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let counterpart = chain
            .counterpart()
            .map(|c| c.display_name())
            .unwrap_or("-");
        println!(
            "{:<20} {:>10}  {}",
            chain.display_name(),
            network_id,
            counterpart
        );
    }
}

async fn show_session(config: &Config) -> Result<()> {
    let store = FileSessionStore::new(&config.session_dir);
    let key = config.network_mode.session_key();
    match store.read(key).await? {
        Some(blob) => {
            let session: WalletSession = serde_json::from_str(&blob)?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        None => println!("No session stored under {}", key),
    }
    Ok(())
}

async fn clear_session(config: Config) -> Result<()> {
    let source = GraphqlAccountSource::new(&config.account_source)?;
    // providers live in the browser; nothing to reconnect here
    let factory = EvmProviderFactory::new(RpcConfig::from_env(), |_, _| None);
    let wallet = Wallet::load(
        config.network_mode,
        Arc::new(FileSessionStore::new(&config.session_dir)),
        Arc::new(source),
        Arc::new(factory),
    )
    .await?;

    let accounts = wallet.accounts().await.len();
    wallet.clear().await?;
    println!("Cleared session ({} accounts)", accounts);
    Ok(())
}

async fn lookup_account(config: &Config, address: String) -> Result<()> {
    let source = GraphqlAccountSource::new(&config.account_source)?.with_env_api_key();
    let address = Address::new(address);

    tracing::info!(address = %address, endpoint = %config.account_source.endpoint, "Fetching account");

    match source.fetch(&address).await? {
        Some(account) => {
            println!("{}", serde_json::to_string_pretty(&account)?);
            println!("Display name: {}", account.display_name());
        }
        None => println!("No account found for {}", address),
    }
    Ok(())
}
