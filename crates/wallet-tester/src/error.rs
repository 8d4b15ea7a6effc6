use chain_sol::SolError;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures surfaced by the envelope builder, the workflows and the local
/// collaborators.
///
/// A missing wallet capability is not an error. The workflow reports it as
/// [`crate::dispatcher::ActionOutcome::Skipped`].
#[derive(Debug, Error)]
pub enum WalletTesterError {
    /// The blockhash read failed.
    #[error("RPC request failed: {0}")]
    Rpc(String),

    /// The user (or wallet) declined a prompt.
    #[error("Wallet rejected the request: {0}")]
    WalletRejected(String),

    /// The node refused a raw transaction.
    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    #[error("Transaction error: {0}")]
    Transaction(#[from] SolError),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}
