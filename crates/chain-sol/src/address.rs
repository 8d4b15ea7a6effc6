//! Solana public keys and address encoding.
//!
//! A Solana address is the Base58 encoding of a raw 32-byte Ed25519 public
//! key. There is no hashing step, so the key bytes ARE the address bytes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SolError;

/// A 32-byte account or program identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<&ed25519_dalek::VerifyingKey> for Pubkey {
    fn from(key: &ed25519_dalek::VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Pubkey {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        address_to_bytes(s).map(Self)
    }
}

impl TryFrom<String> for Pubkey {
    type Error = SolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pubkey> for String {
    fn from(key: Pubkey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bytes_to_address(&self.0))
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

/// Decode a Solana address string to its 32-byte representation.
///
/// Returns an error if the address is not valid Base58 or does not decode
/// to exactly 32 bytes.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidPublicKey(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidPublicKey(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Encode 32 bytes as a Solana address (Base58 string).
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}
