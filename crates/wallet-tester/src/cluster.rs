//! An in-process cluster that answers [`Connection`] calls.
//!
//! It keeps a block height, hands out blockhashes that expire
//! [`BLOCKHASH_VALIDITY`] blocks after issue, and checks every raw
//! transaction it receives: wire format, signatures, and blockhash age.
//! Accepted transactions are kept in an in-memory ledger.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chain_sol::{Blockhash, CommitmentLevel, LatestBlockhash, Signature, WireTransaction};
use rand::RngCore;
use tracing::{debug, warn};

use crate::connection::{Connection, SendOptions};
use crate::error::WalletTesterError;

/// Blocks a blockhash stays usable after it is issued.
pub const BLOCKHASH_VALIDITY: u64 = 150;

/// A transaction the cluster accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedTransaction {
    pub signature: Signature,
    pub slot: u64,
    pub transaction: WireTransaction,
}

#[derive(Debug)]
struct IssuedBlockhash {
    blockhash: Blockhash,
    last_valid_block_height: u64,
}

#[derive(Debug, Default)]
struct ClusterState {
    block_height: u64,
    issued: Vec<IssuedBlockhash>,
    /// Accepted signatures with the expiry height of their blockhash.
    seen: HashMap<Signature, u64>,
    ledger: Vec<ProcessedTransaction>,
}

/// In-process [`Connection`] with a blockhash window and a ledger.
#[derive(Debug, Default)]
pub struct LocalCluster {
    state: Mutex<ClusterState>,
}

impl LocalCluster {
    /// Empty cluster at block height zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the chain forward. The next blockhash read issues a new hash.
    pub fn advance_blocks(&self, blocks: u64) {
        let mut state = self.lock();
        state.block_height = state.block_height.saturating_add(blocks);
        debug!(block_height = state.block_height, "advanced local cluster");
    }

    /// Current block height.
    pub fn block_height(&self) -> u64 {
        self.lock().block_height
    }

    /// Accepted transactions in arrival order.
    pub fn processed(&self) -> Vec<ProcessedTransaction> {
        self.lock().ledger.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClusterState {
    /// Serve the newest blockhash, issuing a new one when the chain has
    /// moved since the last issue. Issuing also drops expired hashes and
    /// the signatures that depended on them.
    fn current_blockhash(&mut self) -> LatestBlockhash {
        let height = self.block_height;
        let expiry = height.saturating_add(BLOCKHASH_VALIDITY);

        if let Some(latest) = self
            .issued
            .last()
            .filter(|issued| issued.last_valid_block_height == expiry)
        {
            return LatestBlockhash {
                blockhash: latest.blockhash.clone(),
                last_valid_block_height: expiry,
            };
        }

        self.issued.retain(|issued| issued.last_valid_block_height >= height);
        self.seen.retain(|_, last_valid| *last_valid >= height);

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let blockhash = Blockhash::from_bytes(&bytes);
        self.issued.push(IssuedBlockhash {
            blockhash: blockhash.clone(),
            last_valid_block_height: expiry,
        });

        LatestBlockhash {
            blockhash,
            last_valid_block_height: expiry,
        }
    }

    /// Expiry height of `blockhash`, if it is known and not yet expired.
    /// Hashes pruned after expiry are reported as not found.
    fn check_blockhash(&self, blockhash: &Blockhash) -> Result<u64, WalletTesterError> {
        let issued = self
            .issued
            .iter()
            .find(|issued| &issued.blockhash == blockhash)
            .ok_or_else(|| WalletTesterError::Broadcast(format!("blockhash not found: {blockhash}")))?;

        if self.block_height > issued.last_valid_block_height {
            return Err(WalletTesterError::Broadcast(format!(
                "block height exceeded: blockhash {blockhash} expired at {}, current height {}",
                issued.last_valid_block_height, self.block_height
            )));
        }
        Ok(issued.last_valid_block_height)
    }
}

#[async_trait]
impl Connection for LocalCluster {
    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentLevel,
    ) -> Result<LatestBlockhash, WalletTesterError> {
        let latest = self.lock().current_blockhash();
        debug!(%commitment, blockhash = %latest.blockhash, "served blockhash");
        Ok(latest)
    }

    async fn send_raw_transaction(
        &self,
        wire_transaction: &[u8],
        options: &SendOptions,
    ) -> Result<Signature, WalletTesterError> {
        let transaction = WireTransaction::decode(wire_transaction)
            .map_err(|e| WalletTesterError::Broadcast(format!("malformed transaction: {e}")))?;

        let invalid = transaction.invalid_signers();
        if !invalid.is_empty() {
            let keys: Vec<_> = invalid.iter().map(ToString::to_string).collect();
            return Err(WalletTesterError::Broadcast(format!(
                "signature verification failed for {}",
                keys.join(", ")
            )));
        }

        let mut state = self.lock();
        let blockhash = Blockhash::from_bytes(&transaction.message.recent_blockhash);
        let last_valid = state.check_blockhash(&blockhash)?;

        let signature = transaction.id();
        if state.seen.insert(signature, last_valid).is_some() {
            if !options.skip_preflight {
                return Err(WalletTesterError::Broadcast(format!(
                    "transaction {signature} already processed"
                )));
            }
            warn!(%signature, "duplicate transaction dropped by cluster");
            return Ok(signature);
        }

        let slot = state.block_height;
        state.ledger.push(ProcessedTransaction {
            signature,
            slot,
            transaction,
        });
        debug!(%signature, slot, "transaction processed");
        Ok(signature)
    }
}
