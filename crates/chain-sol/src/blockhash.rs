//! Recent blockhashes and commitment levels.
//!
//! A blockhash is kept in the Base58 form the node hands out and is only
//! decoded to its 32 raw bytes when a message is compiled. A malformed value
//! therefore survives envelope assembly and fails at compile/sign time,
//! the same place a node would reject it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SolError;

/// Base58-encoded recent blockhash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blockhash(String);

impl Blockhash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(bs58::encode(bytes).into_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode into the 32 bytes that go on the wire.
    pub fn to_bytes(&self) -> Result<[u8; 32], SolError> {
        let bytes = bs58::decode(&self.0)
            .into_vec()
            .map_err(|e| SolError::InvalidBlockhash(format!("base58 decode failed: {e}")))?;

        bytes.try_into().map_err(|v: Vec<u8>| {
            SolError::InvalidBlockhash(format!("expected 32 bytes, got {}", v.len()))
        })
    }
}

impl From<&str> for Blockhash {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a latest-blockhash read: the hash plus the last block height at
/// which a transaction referencing it is still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: Blockhash,
    pub last_valid_block_height: u64,
}

/// How settled a block must be before a read or simulation uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentLevel {
    Processed,
    Confirmed,
    #[default]
    Finalized,
}

impl CommitmentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentLevel::Processed => "processed",
            CommitmentLevel::Confirmed => "confirmed",
            CommitmentLevel::Finalized => "finalized",
        }
    }
}

impl fmt::Display for CommitmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
