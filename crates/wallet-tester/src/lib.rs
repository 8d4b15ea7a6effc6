//! Wallet capability tester for Solana.
//!
//! Builds a transaction envelope around a fixed instruction and drives it
//! through whatever a connected wallet supports: sign-and-send, sign then
//! broadcast, message signing, and batch signing. The network and the wallet
//! are both injected, so the same workflows run against a real node, a
//! browser wallet bridge, or the in-process [`cluster::LocalCluster`] and
//! [`keypair::KeypairWallet`].

pub mod capability;
pub mod cluster;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod instructions;
pub mod keypair;
pub mod observability;

pub use capability::{
    Identity, SendTransaction, SendTransactionOptions, SignAllTransactions, SignMessage,
    SignTransaction, WalletCapabilities,
};
pub use cluster::{LocalCluster, ProcessedTransaction, BLOCKHASH_VALIDITY};
pub use config::{load_config, ActionsConfig, Cluster, ConfigError, LoggingConfig, WalletTesterConfig};
pub use connection::{Connection, SendOptions};
pub use dispatcher::{ActionDispatcher, ActionOutcome, Command};
pub use envelope::make_transaction;
pub use error::WalletTesterError;
pub use instructions::REFERENCE_INSTRUCTIONS;
pub use keypair::{KeypairWallet, KEYPAIR_SEED_ENV_VAR};
pub use observability::{init_logging, ActivitySink, TracingSink};
