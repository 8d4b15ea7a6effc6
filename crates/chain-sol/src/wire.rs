//! Decoding of signed transactions received as raw bytes.

use crate::address::Pubkey;
use crate::error::SolError;
use crate::message::{Message, Reader};
use crate::signature::{Signature, SIGNATURE_BYTES};

/// A transaction parsed from its wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireTransaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
    message_bytes: Vec<u8>,
}

impl WireTransaction {
    /// Parse `compact-u16(n) | n * 64-byte signatures | message`.
    pub fn decode(raw: &[u8]) -> Result<Self, SolError> {
        let mut reader = Reader::new(raw);
        let num_signatures = reader.compact_u16()?;
        if num_signatures == 0 {
            return Err(SolError::SerializationError(
                "transaction has zero signatures".into(),
            ));
        }

        let signatures = (0..num_signatures)
            .map(|_| -> Result<Signature, SolError> {
                Signature::try_from(reader.bytes(SIGNATURE_BYTES)?)
            })
            .collect::<Result<Vec<_>, SolError>>()?;

        let message_bytes = reader.rest().to_vec();
        let message = Message::deserialize(&message_bytes)?;

        if usize::from(message.header.num_required_signatures) != signatures.len() {
            return Err(SolError::SerializationError(format!(
                "message requires {} signatures, transaction carries {}",
                message.header.num_required_signatures,
                signatures.len()
            )));
        }

        Ok(Self {
            signatures,
            message,
            message_bytes,
        })
    }

    pub fn message_bytes(&self) -> &[u8] {
        &self.message_bytes
    }

    /// The first signature, which identifies the transaction.
    pub fn id(&self) -> Signature {
        self.signatures[0]
    }

    pub fn fee_payer(&self) -> Pubkey {
        self.message.account_keys[0]
    }

    /// Signer keys whose slot is empty or holds a signature that does not
    /// verify over the message.
    pub fn invalid_signers(&self) -> Vec<Pubkey> {
        self.message
            .signer_keys()
            .iter()
            .zip(&self.signatures)
            .filter(|(key, sig)| !sig.verify(key, &self.message_bytes))
            .map(|(key, _)| *key)
            .collect()
    }
}
