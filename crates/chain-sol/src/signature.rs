//! Ed25519 signatures as they appear in Solana transactions.
//!
//! A transaction's identifier is the Base58 encoding of its first signature,
//! the one produced by the fee payer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::Pubkey;
use crate::error::SolError;

pub const SIGNATURE_BYTES: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature([u8; SIGNATURE_BYTES]);

impl Signature {
    pub const fn from_array(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_BYTES] {
        self.0
    }

    /// Check this signature over `message` against `signer`.
    pub fn verify(&self, signer: &Pubkey, message: &[u8]) -> bool {
        let Ok(key) = ed25519_dalek::VerifyingKey::from_bytes(signer.as_bytes()) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(&self.0);
        key.verify_strict(message, &sig).is_ok()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; SIGNATURE_BYTES])
    }
}

impl From<ed25519_dalek::Signature> for Signature {
    fn from(sig: ed25519_dalek::Signature) -> Self {
        Self(sig.to_bytes())
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = SolError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; SIGNATURE_BYTES] = bytes.try_into().map_err(|_| {
            SolError::InvalidSignature(format!(
                "expected {SIGNATURE_BYTES} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl FromStr for Signature {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidSignature(format!("base58 decode failed: {e}")))?;
        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<String> for Signature {
    type Error = SolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_string()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}
