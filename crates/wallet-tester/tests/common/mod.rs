//! Recording collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chain_sol::{
    AccountMeta, Blockhash, CommitmentLevel, Instruction, LatestBlockhash, Pubkey, Signature,
    Transaction, WireTransaction,
};
use wallet_tester::{
    ActivitySink, Connection, Identity, KeypairWallet, SendOptions, SendTransaction,
    SendTransactionOptions, SignAllTransactions, SignMessage, SignTransaction, WalletCapabilities,
    WalletTesterError,
};

/// A step observed by one of the recording collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BlockhashRead(CommitmentLevel),
    SendTransaction(Option<String>),
    SignTransaction,
    SignAll(usize),
    SignMessage(Vec<u8>),
    Broadcast(Vec<u8>, SendOptions),
}

/// Ordered log shared by every collaborator in a test.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn broadcasts(&self) -> Vec<(Vec<u8>, SendOptions)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Broadcast(wire, options) => Some((wire, options)),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, wanted: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events().iter().position(wanted)
    }
}

/// Serves a fixed blockhash (or a failure) and accepts every broadcast.
pub struct MockConnection {
    pub journal: Journal,
    blockhash: Blockhash,
    fail_reads: bool,
}

impl MockConnection {
    /// Serves the literal `"abc123"`, which cannot be compiled into a
    /// message. Good for envelope checks that stop before signing.
    pub fn new(journal: Journal) -> Self {
        Self::with_blockhash(journal, Blockhash::from("abc123"))
    }

    /// Serves a real 32-byte blockhash so envelopes can be signed.
    pub fn signable(journal: Journal) -> Self {
        Self::with_blockhash(journal, Blockhash::from_bytes(&[0x5A; 32]))
    }

    pub fn with_blockhash(journal: Journal, blockhash: Blockhash) -> Self {
        Self {
            journal,
            blockhash,
            fail_reads: false,
        }
    }

    pub fn failing(journal: Journal) -> Self {
        Self {
            fail_reads: true,
            ..Self::new(journal)
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentLevel,
    ) -> Result<LatestBlockhash, WalletTesterError> {
        self.journal.push(Event::BlockhashRead(commitment));
        if self.fail_reads {
            return Err(WalletTesterError::Rpc("connection reset".into()));
        }
        Ok(LatestBlockhash {
            blockhash: self.blockhash.clone(),
            last_valid_block_height: 4_242,
        })
    }

    async fn send_raw_transaction(
        &self,
        wire_transaction: &[u8],
        options: &SendOptions,
    ) -> Result<Signature, WalletTesterError> {
        self.journal
            .push(Event::Broadcast(wire_transaction.to_vec(), *options));
        let decoded = WireTransaction::decode(wire_transaction)?;
        Ok(decoded.id())
    }
}

/// Signs with a real keypair and records each request. Can be told to
/// decline every prompt.
pub struct RecordingWallet {
    pub journal: Journal,
    inner: KeypairWallet,
    reject: bool,
}

impl RecordingWallet {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            inner: KeypairWallet::from_seed(&[0x24; 32]),
            reject: false,
        }
    }

    pub fn rejecting(journal: Journal) -> Self {
        Self {
            reject: true,
            ..Self::new(journal)
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.inner.pubkey()
    }

    fn check(&self) -> Result<(), WalletTesterError> {
        if self.reject {
            return Err(WalletTesterError::WalletRejected("user declined".into()));
        }
        Ok(())
    }
}

impl Identity for RecordingWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.pubkey())
    }
}

#[async_trait]
impl SendTransaction for RecordingWallet {
    async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn Connection,
        options: &SendTransactionOptions,
    ) -> Result<Signature, WalletTesterError> {
        self.journal.push(Event::SendTransaction(options.name.clone()));
        self.check()?;
        self.inner
            .send_transaction(transaction, connection, options)
            .await
    }
}

#[async_trait]
impl SignTransaction for RecordingWallet {
    async fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, WalletTesterError> {
        self.journal.push(Event::SignTransaction);
        self.check()?;
        self.inner.sign_transaction(transaction).await
    }
}

#[async_trait]
impl SignAllTransactions for RecordingWallet {
    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletTesterError> {
        self.journal.push(Event::SignAll(transactions.len()));
        self.check()?;
        self.inner.sign_all_transactions(transactions).await
    }
}

#[async_trait]
impl SignMessage for RecordingWallet {
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletTesterError> {
        self.journal.push(Event::SignMessage(message.to_vec()));
        self.check()?;
        self.inner.sign_message(message).await
    }
}

/// Captures what workflows report.
#[derive(Debug, Default)]
pub struct RecordingSink {
    logs: Mutex<Vec<String>>,
    notifications: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().unwrap().clone()
    }
}

impl ActivitySink for RecordingSink {
    fn log(&self, entry: &str) {
        self.logs.lock().unwrap().push(entry.to_string());
    }

    fn notify(&self, message: &str) {
        self.notifications.lock().unwrap().push(message.to_string());
    }
}

/// Wallet, connection and sink wired to one journal.
pub struct Harness {
    pub journal: Journal,
    pub connection: Arc<MockConnection>,
    pub wallet: Arc<RecordingWallet>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        let journal = Journal::default();
        Self {
            connection: Arc::new(MockConnection::signable(journal.clone())),
            wallet: Arc::new(RecordingWallet::new(journal.clone())),
            sink: Arc::new(RecordingSink::default()),
            journal,
        }
    }

    pub fn with_connection(mut self, connection: MockConnection) -> Self {
        self.connection = Arc::new(connection);
        self
    }

    pub fn with_wallet(mut self, wallet: RecordingWallet) -> Self {
        self.wallet = Arc::new(wallet);
        self
    }

    /// Every slot filled from the recording wallet.
    pub fn capabilities(&self) -> WalletCapabilities {
        WalletCapabilities::from_adapter(self.wallet.clone())
    }
}

pub fn instruction(tag: u8) -> Instruction {
    Instruction::new_with_bytes(
        Pubkey::new_from_array([tag; 32]),
        &[tag, tag],
        vec![
            AccountMeta::new(Pubkey::new_from_array([tag.wrapping_add(100); 32]), false),
            AccountMeta::new_readonly(Pubkey::new_from_array([0xEE; 32]), false),
        ],
    )
}
