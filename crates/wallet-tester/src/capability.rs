//! Optional wallet capabilities.
//!
//! Browser wallets differ in what they support: one may sign messages but
//! not batches, another may only sign-and-send. [`WalletCapabilities`] models
//! that as a record of optional slots. Callers match on a slot before using
//! it; an empty slot is a normal state, not an error.
//!
//! Every call may prompt the user and may be declined, which surfaces as
//! [`WalletTesterError::WalletRejected`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chain_sol::{Pubkey, Signature, Transaction};
use serde::{Deserialize, Serialize};

use crate::connection::{Connection, SendOptions};
use crate::error::WalletTesterError;

/// Options for a wallet-driven sign-and-send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionOptions {
    /// Label the wallet may show in its approval prompt.
    pub name: Option<String>,
    #[serde(flatten)]
    pub send: SendOptions,
}

/// Wallet-side identity.
pub trait Identity: Send + Sync {
    /// `None` while no account is connected.
    fn public_key(&self) -> Option<Pubkey>;
}

#[async_trait]
pub trait SendTransaction: Send + Sync {
    /// Sign `transaction` and broadcast it through `connection`.
    async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn Connection,
        options: &SendTransactionOptions,
    ) -> Result<Signature, WalletTesterError>;
}

#[async_trait]
pub trait SignTransaction: Send + Sync {
    async fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, WalletTesterError>;
}

#[async_trait]
pub trait SignAllTransactions: Send + Sync {
    /// Sign a batch behind a single approval. Output order matches input.
    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletTesterError>;
}

#[async_trait]
pub trait SignMessage: Send + Sync {
    /// Detached signature over arbitrary bytes.
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletTesterError>;
}

/// The capability record handed to the action dispatcher.
#[derive(Clone, Default)]
pub struct WalletCapabilities {
    pub public_key: Option<Pubkey>,
    pub send_transaction: Option<Arc<dyn SendTransaction>>,
    pub sign_transaction: Option<Arc<dyn SignTransaction>>,
    pub sign_all_transactions: Option<Arc<dyn SignAllTransactions>>,
    pub sign_message: Option<Arc<dyn SignMessage>>,
}

impl WalletCapabilities {
    /// No wallet connected: every slot empty.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Fill every slot from one adapter supporting them all.
    pub fn from_adapter<W>(wallet: Arc<W>) -> Self
    where
        W: Identity
            + SendTransaction
            + SignTransaction
            + SignAllTransactions
            + SignMessage
            + 'static,
    {
        Self {
            public_key: wallet.public_key(),
            send_transaction: Some(wallet.clone()),
            sign_transaction: Some(wallet.clone()),
            sign_all_transactions: Some(wallet.clone()),
            sign_message: Some(wallet),
        }
    }

    pub fn with_public_key(mut self, public_key: Option<Pubkey>) -> Self {
        self.public_key = public_key;
        self
    }

    pub fn with_send_transaction(mut self, slot: Option<Arc<dyn SendTransaction>>) -> Self {
        self.send_transaction = slot;
        self
    }

    pub fn with_sign_transaction(mut self, slot: Option<Arc<dyn SignTransaction>>) -> Self {
        self.sign_transaction = slot;
        self
    }

    pub fn with_sign_all_transactions(
        mut self,
        slot: Option<Arc<dyn SignAllTransactions>>,
    ) -> Self {
        self.sign_all_transactions = slot;
        self
    }

    pub fn with_sign_message(mut self, slot: Option<Arc<dyn SignMessage>>) -> Self {
        self.sign_message = slot;
        self
    }

    /// Names of the capabilities present, for logging.
    pub fn supported(&self) -> Vec<&'static str> {
        [
            ("sendTransaction", self.send_transaction.is_some()),
            ("signTransaction", self.sign_transaction.is_some()),
            ("signAllTransactions", self.sign_all_transactions.is_some()),
            ("signMessage", self.sign_message.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

impl fmt::Debug for WalletCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletCapabilities")
            .field("public_key", &self.public_key)
            .field("supported", &self.supported())
            .finish()
    }
}
