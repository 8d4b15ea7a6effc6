//! The transaction envelope: instructions, fee payer, recent blockhash and
//! the signatures collected over the compiled message.
//!
//! ```text
//! Transaction wire format:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message                 (see `message`)
//! ```
//!
//! The envelope stays editable until it is signed. Signatures are stored by
//! signer key and laid out in message order at serialization time, so an
//! envelope edited after signing fails verification instead of silently
//! shipping a stale signature.

use ed25519_dalek::{Signer, SigningKey};

use crate::address::Pubkey;
use crate::blockhash::Blockhash;
use crate::error::SolError;
use crate::instruction::Instruction;
use crate::message::Message;
use crate::short_vec::write_len;
use crate::signature::{Signature, SIGNATURE_BYTES};

/// A signer key and its signature, if one has been collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignaturePair {
    pub pubkey: Pubkey,
    pub signature: Option<Signature>,
}

/// Checks applied by [`Transaction::serialize_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeConfig {
    /// Fail if any required signer has not signed.
    pub require_all_signatures: bool,
    /// Fail if any present signature does not verify.
    pub verify_signatures: bool,
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            require_all_signatures: true,
            verify_signatures: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Executed on-chain in this order.
    pub instructions: Vec<Instruction>,
    pub recent_blockhash: Option<Blockhash>,
    /// Last block height at which `recent_blockhash` is accepted.
    pub last_valid_block_height: Option<u64>,
    pub fee_payer: Option<Pubkey>,
    signatures: Vec<SignaturePair>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    pub fn signatures(&self) -> &[SignaturePair] {
        &self.signatures
    }

    /// The fee payer's signature, which doubles as the transaction id.
    pub fn signature(&self) -> Option<Signature> {
        let payer = self.fee_payer?;
        self.signatures
            .iter()
            .find(|pair| pair.pubkey == payer)
            .and_then(|pair| pair.signature)
    }

    /// Compile the envelope into a message.
    ///
    /// Fails without a fee payer or blockhash; there is no default for
    /// either.
    pub fn compile_message(&self) -> Result<Message, SolError> {
        let fee_payer = self.fee_payer.ok_or(SolError::MissingFeePayer)?;
        let blockhash = self
            .recent_blockhash
            .as_ref()
            .ok_or(SolError::MissingBlockhash)?
            .to_bytes()?;

        if self.instructions.is_empty() {
            return Err(SolError::TransactionBuildError(
                "no instructions provided".into(),
            ));
        }

        Message::compile(&self.instructions, &fee_payer, blockhash)
    }

    /// The bytes each signer signs.
    pub fn serialize_message(&self) -> Result<Vec<u8>, SolError> {
        self.compile_message()?.serialize()
    }

    /// Sign with every key in `signers`, discarding previous signatures.
    pub fn sign(&mut self, signers: &[&SigningKey]) -> Result<(), SolError> {
        let message = self.compile_message()?;
        self.signatures = empty_slots(&message);
        self.sign_message(&message, signers)
    }

    /// Add signatures from `signers`, keeping the ones already collected.
    pub fn partial_sign(&mut self, signers: &[&SigningKey]) -> Result<(), SolError> {
        let message = self.compile_message()?;
        let mut slots = empty_slots(&message);
        for slot in &mut slots {
            slot.signature = self
                .signatures
                .iter()
                .find(|pair| pair.pubkey == slot.pubkey)
                .and_then(|pair| pair.signature);
        }
        self.signatures = slots;
        self.sign_message(&message, signers)
    }

    fn sign_message(&mut self, message: &Message, signers: &[&SigningKey]) -> Result<(), SolError> {
        let message_bytes = message.serialize()?;
        for signer in signers {
            let pubkey = Pubkey::from(&signer.verifying_key());
            let slot = self
                .signatures
                .iter_mut()
                .find(|pair| pair.pubkey == pubkey)
                .ok_or_else(|| SolError::SigningError(format!("unknown signer {pubkey}")))?;
            slot.signature = Some(Signature::from(signer.sign(&message_bytes)));
        }
        Ok(())
    }

    /// Attach a signature produced elsewhere (a hardware or browser wallet).
    pub fn add_signature(&mut self, pubkey: &Pubkey, signature: Signature) -> Result<(), SolError> {
        let message = self.compile_message()?;
        if !message.signer_keys().contains(pubkey) {
            return Err(SolError::SigningError(format!("unknown signer {pubkey}")));
        }
        if !signature.verify(pubkey, &message.serialize()?) {
            return Err(SolError::InvalidSignature(format!(
                "signature does not verify for {pubkey}"
            )));
        }

        if self.signatures.iter().all(|pair| pair.pubkey != *pubkey) {
            let previous = std::mem::take(&mut self.signatures);
            self.signatures = empty_slots(&message);
            for pair in previous {
                if let Some(slot) = self.signatures.iter_mut().find(|s| s.pubkey == pair.pubkey) {
                    slot.signature = pair.signature;
                }
            }
        }
        if let Some(slot) = self.signatures.iter_mut().find(|s| s.pubkey == *pubkey) {
            slot.signature = Some(signature);
        }
        Ok(())
    }

    /// True when every required signer has a signature that verifies.
    pub fn verify_signatures(&self) -> Result<bool, SolError> {
        let message = self.compile_message()?;
        let message_bytes = message.serialize()?;
        Ok(message.signer_keys().iter().all(|key| {
            self.lookup(key)
                .is_some_and(|sig| sig.verify(key, &message_bytes))
        }))
    }

    /// Serialize into wire format, requiring every signature and verifying
    /// each one.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        self.serialize_with(SerializeConfig::default())
    }

    pub fn serialize_with(&self, config: SerializeConfig) -> Result<Vec<u8>, SolError> {
        let message = self.compile_message()?;
        let message_bytes = message.serialize()?;
        let signer_keys = message.signer_keys();

        let mut wire =
            Vec::with_capacity(3 + signer_keys.len() * SIGNATURE_BYTES + message_bytes.len());
        write_len(&mut wire, signer_keys.len(), "signatures")?;

        for key in signer_keys {
            match self.lookup(key) {
                Some(sig) => {
                    if config.verify_signatures && !sig.verify(key, &message_bytes) {
                        return Err(SolError::InvalidSignature(format!(
                            "signature does not verify for {key}"
                        )));
                    }
                    wire.extend_from_slice(&sig.to_bytes());
                }
                None if config.require_all_signatures => {
                    return Err(SolError::SigningError(format!("missing signature for {key}")));
                }
                None => wire.extend_from_slice(&[0u8; SIGNATURE_BYTES]),
            }
        }

        wire.extend_from_slice(&message_bytes);
        Ok(wire)
    }

    fn lookup(&self, key: &Pubkey) -> Option<Signature> {
        self.signatures
            .iter()
            .find(|pair| pair.pubkey == *key)
            .and_then(|pair| pair.signature)
    }
}

fn empty_slots(message: &Message) -> Vec<SignaturePair> {
    message
        .signer_keys()
        .iter()
        .map(|key| SignaturePair {
            pubkey: *key,
            signature: None,
        })
        .collect()
}
