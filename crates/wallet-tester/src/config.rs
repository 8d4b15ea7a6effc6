//! Configuration loaded from a TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! a working configuration.

use std::fmt;
use std::fs;
use std::path::Path;

use chain_sol::CommitmentLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::SendTransactionOptions;
use crate::connection::SendOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletTesterConfig {
    pub cluster: Cluster,

    /// Custom RPC endpoint overriding the cluster's public one.
    pub rpc_url: Option<String>,

    pub actions: ActionsConfig,

    pub logging: LoggingConfig,
}

impl WalletTesterConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn endpoint(&self) -> &str {
        self.rpc_url.as_deref().unwrap_or_else(|| self.cluster.api_url())
    }

    /// Collect every problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.actions.batch_size == 0 {
            errors.push("actions.batch_size must be at least 1".to_string());
        }
        if self.actions.message.is_empty() {
            errors.push("actions.message must not be empty".to_string());
        }
        if self.actions.proposal_name.trim().is_empty() {
            errors.push("actions.proposal_name must not be empty".to_string());
        }
        if let Some(url) = &self.rpc_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!("rpc_url must be an http(s) URL, got {url:?}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<WalletTesterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    WalletTesterConfig::from_toml_str(&content)
}

/// Public Solana clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    pub fn api_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        })
    }
}

/// Knobs for the four wallet workflows.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Name passed to the wallet's send-transaction prompt.
    pub proposal_name: String,

    /// Payload for the sign-message workflow.
    pub message: String,

    /// Copies of the envelope handed to sign-all.
    pub batch_size: usize,

    pub blockhash_commitment: CommitmentLevel,

    pub skip_preflight: bool,

    pub preflight_commitment: CommitmentLevel,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            proposal_name: "Mock proposal".to_string(),
            message: "buffer".to_string(),
            batch_size: 3,
            blockhash_commitment: CommitmentLevel::Finalized,
            skip_preflight: true,
            preflight_commitment: CommitmentLevel::Confirmed,
        }
    }
}

impl ActionsConfig {
    pub fn send_options(&self) -> SendOptions {
        SendOptions {
            skip_preflight: self.skip_preflight,
            preflight_commitment: Some(self.preflight_commitment),
        }
    }

    pub fn send_transaction_options(&self) -> SendTransactionOptions {
        SendTransactionOptions {
            name: Some(self.proposal_name.clone()),
            send: SendOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "wallet_tester=info".to_string(),
        }
    }
}
