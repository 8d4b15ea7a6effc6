//! Demo driver: runs the wallet workflows against an in-process cluster
//! with a local keypair wallet.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use wallet_tester::{
    init_logging, load_config, ActionDispatcher, ActionOutcome, Command, KeypairWallet,
    LocalCluster, WalletCapabilities, WalletTesterConfig, KEYPAIR_SEED_ENV_VAR,
};

/// Exercise every wallet capability with a mock proposal transaction.
#[derive(Parser, Debug)]
#[command(name = "wallet-tester", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Workflows to run, in order. Runs all of them when omitted.
    commands: Vec<Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => WalletTesterConfig::default(),
    };

    init_logging(&config.logging.filter).context("installing tracing subscriber")?;

    tracing::info!(
        cluster = %config.cluster,
        endpoint = config.endpoint(),
        "wallet-tester starting"
    );

    let wallet = match std::env::var_os(KEYPAIR_SEED_ENV_VAR) {
        Some(_) => KeypairWallet::from_env(KEYPAIR_SEED_ENV_VAR)?,
        None => KeypairWallet::generate(),
    };
    let wallet = WalletCapabilities::from_adapter(Arc::new(wallet));
    tracing::info!(supported = ?wallet.supported(), "wallet connected");

    let cluster = Arc::new(LocalCluster::new());
    let dispatcher = ActionDispatcher::new(cluster, wallet).with_config(config.actions);

    let commands = if cli.commands.is_empty() {
        Command::ALL.to_vec()
    } else {
        cli.commands
    };

    for command in commands {
        match dispatcher.dispatch(command).await {
            Ok(ActionOutcome::Sent(txids)) => {
                tracing::info!(%command, count = txids.len(), "completed");
            }
            Ok(ActionOutcome::MessageSigned(signature)) => {
                tracing::info!(%command, bytes = signature.len(), "completed");
            }
            Ok(ActionOutcome::Skipped) => {
                tracing::warn!(%command, "wallet does not support this action");
            }
            Err(e) => {
                tracing::error!(%command, error = %e, "action failed");
                return Err(e.into());
            }
        }
    }

    Ok(())
}
