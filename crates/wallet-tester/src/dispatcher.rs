//! The four wallet workflows and the command table that triggers them.
//!
//! Each workflow builds its own envelope, so concurrent invocations share
//! nothing. Within a workflow the steps run strictly in order: build, sign,
//! serialize, broadcast. Nothing is caught locally; every failure is
//! returned to the caller.
//!
//! Before any external call a workflow checks that the wallet slot it needs
//! is filled. When it is not, the workflow does nothing and reports
//! [`ActionOutcome::Skipped`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chain_sol::{Instruction, Signature, Transaction};
use tracing::{debug, info};

use crate::capability::WalletCapabilities;
use crate::config::ActionsConfig;
use crate::connection::Connection;
use crate::envelope::make_transaction;
use crate::error::WalletTesterError;
use crate::instructions::REFERENCE_INSTRUCTIONS;
use crate::observability::{ActivitySink, TracingSink};

/// A user-triggerable workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Wallet signs and sends in one call.
    CreateProposal,
    /// Wallet signs, we broadcast.
    SignTransaction,
    SignMessage,
    /// Wallet signs a batch, we broadcast each.
    SignAllTransactions,
}

impl Command {
    /// In the order the demo presents them.
    pub const ALL: [Command; 4] = [
        Command::CreateProposal,
        Command::SignTransaction,
        Command::SignMessage,
        Command::SignAllTransactions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::CreateProposal => "create-proposal",
            Command::SignTransaction => "sign-transaction",
            Command::SignMessage => "sign-message",
            Command::SignAllTransactions => "sign-all-transactions",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = WalletTesterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| WalletTesterError::UnknownCommand(s.to_string()))
    }
}

/// What a workflow did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Transactions broadcast, in broadcast order.
    Sent(Vec<Signature>),
    /// Detached message signature.
    MessageSigned(Vec<u8>),
    /// The wallet lacks the capability; nothing was called.
    Skipped,
}

/// Runs workflows against one connection and one wallet.
pub struct ActionDispatcher {
    connection: Arc<dyn Connection>,
    wallet: WalletCapabilities,
    sink: Arc<dyn ActivitySink>,
    config: ActionsConfig,
    instructions: Vec<Instruction>,
}

impl ActionDispatcher {
    /// Dispatcher with default actions config, the proposal instruction and
    /// a [`TracingSink`].
    pub fn new(connection: Arc<dyn Connection>, wallet: WalletCapabilities) -> Self {
        Self {
            connection,
            wallet,
            sink: Arc::new(TracingSink),
            config: ActionsConfig::default(),
            instructions: REFERENCE_INSTRUCTIONS.clone(),
        }
    }

    /// Send workflow results to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn ActivitySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the actions config.
    pub fn with_config(mut self, config: ActionsConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the instructions every envelope carries.
    pub fn with_instructions(mut self, instructions: Vec<Instruction>) -> Self {
        self.instructions = instructions;
        self
    }

    /// The wallet currently in use.
    pub fn wallet(&self) -> &WalletCapabilities {
        &self.wallet
    }

    /// Swap the wallet, e.g. after a reconnect to another account.
    pub fn set_wallet(&mut self, wallet: WalletCapabilities) {
        self.wallet = wallet;
    }

    /// Run the workflow bound to `command`.
    pub async fn dispatch(&self, command: Command) -> Result<ActionOutcome, WalletTesterError> {
        match command {
            Command::CreateProposal => self.create_proposal().await,
            Command::SignTransaction => self.sign_transaction().await,
            Command::SignMessage => self.sign_message().await,
            Command::SignAllTransactions => self.sign_all_transactions().await,
        }
    }

    async fn build(&self) -> Result<Transaction, WalletTesterError> {
        make_transaction(
            self.connection.as_ref(),
            &self.instructions,
            self.wallet.public_key,
            self.config.blockhash_commitment,
        )
        .await
    }

    /// Build an envelope and let the wallet sign and send it.
    pub async fn create_proposal(&self) -> Result<ActionOutcome, WalletTesterError> {
        let Some(sender) = &self.wallet.send_transaction else {
            debug!("wallet cannot send transactions, skipping");
            return Ok(ActionOutcome::Skipped);
        };

        let transaction = self.build().await?;
        let txid = sender
            .send_transaction(
                transaction,
                self.connection.as_ref(),
                &self.config.send_transaction_options(),
            )
            .await?;

        info!(%txid, command = "create-proposal", "wallet sent transaction");
        self.sink.log(&txid.to_string());
        Ok(ActionOutcome::Sent(vec![txid]))
    }

    /// Build an envelope, have the wallet sign it, broadcast the raw bytes.
    pub async fn sign_transaction(&self) -> Result<ActionOutcome, WalletTesterError> {
        let Some(signer) = &self.wallet.sign_transaction else {
            debug!("wallet cannot sign transactions, skipping");
            return Ok(ActionOutcome::Skipped);
        };

        let transaction = self.build().await?;
        let signed = signer.sign_transaction(transaction).await?;
        let txid = self.broadcast(&signed).await?;
        Ok(ActionOutcome::Sent(vec![txid]))
    }

    /// Sign the configured message bytes. Nothing is broadcast.
    pub async fn sign_message(&self) -> Result<ActionOutcome, WalletTesterError> {
        let Some(signer) = &self.wallet.sign_message else {
            debug!("wallet cannot sign messages, skipping");
            return Ok(ActionOutcome::Skipped);
        };

        let signature = signer.sign_message(self.config.message.as_bytes()).await?;
        let encoded = bs58::encode(&signature).into_string();

        info!(signature = %encoded, command = "sign-message", "wallet signed message");
        self.sink.log(&encoded);
        Ok(ActionOutcome::MessageSigned(signature))
    }

    /// Build one envelope, hand `batch_size` copies to the wallet in one
    /// request, then broadcast each signed copy in sequence.
    ///
    /// The copies share one blockhash and are byte-identical once signed, so
    /// a real cluster lands the first and treats the rest as duplicates.
    pub async fn sign_all_transactions(&self) -> Result<ActionOutcome, WalletTesterError> {
        let Some(signer) = &self.wallet.sign_all_transactions else {
            debug!("wallet cannot sign transaction batches, skipping");
            return Ok(ActionOutcome::Skipped);
        };

        let transaction = self.build().await?;
        let batch = vec![transaction; self.config.batch_size];
        let signed = signer.sign_all_transactions(batch).await?;
        info!(
            count = signed.len(),
            command = "sign-all-transactions",
            "wallet signed transaction batch"
        );

        let mut txids = Vec::with_capacity(signed.len());
        for transaction in &signed {
            txids.push(self.broadcast(transaction).await?);
        }
        Ok(ActionOutcome::Sent(txids))
    }

    async fn broadcast(&self, signed: &Transaction) -> Result<Signature, WalletTesterError> {
        let wire = signed.serialize()?;
        let txid = self
            .connection
            .send_raw_transaction(&wire, &self.config.send_options())
            .await?;

        info!(%txid, bytes = wire.len(), "broadcast raw transaction");
        self.sink.log(&txid.to_string());
        self.sink.notify(&format!("New transaction created {txid}"));
        Ok(txid)
    }
}
