//! The network collaborator: blockhash reads and raw broadcasts.
//!
//! No transport lives here. Implementations decide how to reach a node;
//! [`crate::cluster::LocalCluster`] answers in-process.

use async_trait::async_trait;
use chain_sol::{CommitmentLevel, LatestBlockhash, Signature};
use serde::{Deserialize, Serialize};

use crate::error::WalletTesterError;

/// Broadcast policy for a raw transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    /// Skip the simulation step before broadcasting.
    pub skip_preflight: bool,
    /// Commitment used for the simulation when it runs.
    pub preflight_commitment: Option<CommitmentLevel>,
}

#[async_trait]
pub trait Connection: Send + Sync {
    /// Most recent blockhash at `commitment`, with its expiry height.
    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentLevel,
    ) -> Result<LatestBlockhash, WalletTesterError>;

    /// Submit a signed wire transaction and return its identifier.
    async fn send_raw_transaction(
        &self,
        wire_transaction: &[u8],
        options: &SendOptions,
    ) -> Result<Signature, WalletTesterError>;
}
