//! A wallet backed by a local Ed25519 keypair.
//!
//! It fills every capability slot and approves every request without a
//! prompt, which makes it the stand-in for a browser wallet in the demo
//! binary and the integration tests.
//!
//! # Security
//! The seed is zeroized as soon as the signing key is built. Keys are never
//! logged; only the public key is.

use std::fmt;

use async_trait::async_trait;
use chain_sol::{Pubkey, Signature, Transaction};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::capability::{
    Identity, SendTransaction, SendTransactionOptions, SignAllTransactions, SignMessage,
    SignTransaction,
};
use crate::connection::Connection;
use crate::error::WalletTesterError;

/// Environment variable read by [`KeypairWallet::from_env`].
pub const KEYPAIR_SEED_ENV_VAR: &str = "WALLET_TESTER_SEED";

/// Wallet that signs every request with one local key.
pub struct KeypairWallet {
    signing_key: SigningKey,
}

impl fmt::Debug for KeypairWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

impl KeypairWallet {
    /// Fresh random keypair from the OS RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let wallet = Self { signing_key };
        tracing::info!(pubkey = %wallet.pubkey(), "generated ephemeral wallet keypair");
        wallet
    }

    /// Build from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut seed = *seed;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self { signing_key }
    }

    /// Build from a hex seed (with or without `0x`) in the environment
    /// variable `var`.
    pub fn from_env(var: &str) -> Result<Self, WalletTesterError> {
        let mut value = std::env::var(var)
            .map_err(|e| WalletTesterError::InvalidKey(format!("{var}: {e}")))?;
        let result = Self::from_hex_seed(&value);
        value.zeroize();
        result
    }

    /// Build from a 64-character hex seed, `0x` prefix optional.
    pub fn from_hex_seed(seed_hex: &str) -> Result<Self, WalletTesterError> {
        let trimmed = seed_hex.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut bytes = hex::decode(trimmed)
            .map_err(|e| WalletTesterError::InvalidKey(format!("seed is not hex: {e}")))?;

        let result = <[u8; 32]>::try_from(bytes.as_slice())
            .map(|seed| Self::from_seed(&seed))
            .map_err(|_| {
                WalletTesterError::InvalidKey(format!("expected 32 seed bytes, got {}", bytes.len()))
            });
        bytes.zeroize();
        result
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::from(&self.signing_key.verifying_key())
    }

    fn sign_envelope(&self, mut transaction: Transaction) -> Result<Transaction, WalletTesterError> {
        transaction.partial_sign(&[&self.signing_key])?;
        Ok(transaction)
    }
}

impl Identity for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.pubkey())
    }
}

#[async_trait]
impl SignTransaction for KeypairWallet {
    async fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, WalletTesterError> {
        self.sign_envelope(transaction)
    }
}

#[async_trait]
impl SignAllTransactions for KeypairWallet {
    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletTesterError> {
        transactions
            .into_iter()
            .map(|tx| self.sign_envelope(tx))
            .collect()
    }
}

#[async_trait]
impl SignMessage for KeypairWallet {
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletTesterError> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }
}

#[async_trait]
impl SendTransaction for KeypairWallet {
    async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn Connection,
        options: &SendTransactionOptions,
    ) -> Result<Signature, WalletTesterError> {
        if let Some(name) = &options.name {
            tracing::debug!(%name, "approving send request");
        }
        let signed = self.sign_envelope(transaction)?;
        let wire = signed.serialize()?;
        connection.send_raw_transaction(&wire, &options.send).await
    }
}
