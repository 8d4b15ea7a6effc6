//! Legacy message compilation and its wire layout.
//!
//! ```text
//! Message:
//!   num_required_sigs     u8
//!   num_readonly_signed   u8
//!   num_readonly_unsigned u8
//!   num_accounts          compact-u16
//!   account_keys          32 bytes * num_accounts
//!   recent_blockhash      32 bytes
//!   num_instructions      compact-u16
//!   instructions[]
//!
//! CompiledInstruction:
//!   program_id_index      u8
//!   num_accounts          compact-u16
//!   account_indices       u8 * num_accounts
//!   data_len              compact-u16
//!   data                  u8 * data_len
//! ```

use crate::address::Pubkey;
use crate::error::SolError;
use crate::instruction::Instruction;
use crate::short_vec::{decode_compact_u16, write_len};

/// Signer and read-only counts that prefix every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    /// The first `num_required_signatures` account keys must sign.
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction whose accounts have been replaced by indices into
/// [`Message::account_keys`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// The signed portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    /// Canonical order: writable signers (fee payer first), read-only
    /// signers, writable non-signers, read-only non-signers.
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

struct AccountEntry {
    pubkey: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

impl AccountEntry {
    fn rank(&self) -> u8 {
        match (self.is_signer, self.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }
}

impl Message {
    /// Compile `instructions` for `fee_payer` against `recent_blockhash`.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        recent_blockhash: [u8; 32],
    ) -> Result<Self, SolError> {
        // Account lists are tiny, a linear scan beats hashing here.
        let mut entries: Vec<AccountEntry> = Vec::new();
        let mut upsert = |pubkey: Pubkey, signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(AccountEntry {
                    pubkey,
                    is_signer: signer,
                    is_writable: writable,
                });
            }
        };

        upsert(*fee_payer, true, true);
        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        // Stable sort keeps insertion order inside each class, so the fee
        // payer (inserted first, writable signer) stays at index 0.
        entries.sort_by_key(AccountEntry::rank);

        if entries.len() > usize::from(u8::MAX) {
            return Err(SolError::TransactionBuildError(format!(
                "too many accounts: {}",
                entries.len()
            )));
        }

        let count = |pred: fn(&AccountEntry) -> bool| entries.iter().filter(|e| pred(e)).count() as u8;
        let header = MessageHeader {
            num_required_signatures: count(|e| e.is_signer),
            num_readonly_signed_accounts: count(|e| e.is_signer && !e.is_writable),
            num_readonly_unsigned_accounts: count(|e| !e.is_signer && !e.is_writable),
        };

        let account_keys: Vec<Pubkey> = entries.into_iter().map(|e| e.pubkey).collect();
        let index_of = |key: &Pubkey| -> Result<u8, SolError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| SolError::TransactionBuildError(format!("account {key} not in account keys")))
        };

        let compiled = instructions
            .iter()
            .map(|ix| -> Result<CompiledInstruction, SolError> {
                Ok(CompiledInstruction {
                    program_id_index: index_of(&ix.program_id)?,
                    account_indices: ix
                        .accounts
                        .iter()
                        .map(|meta| index_of(&meta.pubkey))
                        .collect::<Result<_, SolError>>()?,
                    data: ix.data.clone(),
                })
            })
            .collect::<Result<Vec<_>, SolError>>()?;

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    /// Account keys that must provide a signature, in signature-slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        let n = usize::from(self.header.num_required_signatures).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    pub fn is_writable(&self, index: usize) -> bool {
        let h = &self.header;
        let num_signers = usize::from(h.num_required_signatures);
        if index < num_signers {
            index < num_signers.saturating_sub(usize::from(h.num_readonly_signed_accounts))
        } else {
            index
                < self
                    .account_keys
                    .len()
                    .saturating_sub(usize::from(h.num_readonly_unsigned_accounts))
        }
    }

    /// Serialize the message; these are the bytes every signer signs.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        write_len(&mut buf, self.account_keys.len(), "account keys")?;
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(&self.recent_blockhash);

        write_len(&mut buf, self.instructions.len(), "instructions")?;
        for ix in &self.instructions {
            buf.push(ix.program_id_index);
            write_len(&mut buf, ix.account_indices.len(), "instruction accounts")?;
            buf.extend_from_slice(&ix.account_indices);
            write_len(&mut buf, ix.data.len(), "instruction data bytes")?;
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }

    /// Parse a serialized message. Trailing bytes are an error.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SolError> {
        let mut reader = Reader::new(bytes);

        let header = MessageHeader {
            num_required_signatures: reader.u8()?,
            num_readonly_signed_accounts: reader.u8()?,
            num_readonly_unsigned_accounts: reader.u8()?,
        };

        let num_accounts = reader.compact_u16()?;
        let account_keys = (0..num_accounts)
            .map(|_| reader.array::<32>().map(Pubkey::new_from_array))
            .collect::<Result<Vec<_>, _>>()?;

        let recent_blockhash = reader.array::<32>()?;

        let num_instructions = reader.compact_u16()?;
        let mut instructions = Vec::with_capacity(usize::from(num_instructions));
        for _ in 0..num_instructions {
            let program_id_index = reader.u8()?;
            let n = reader.compact_u16()?;
            let account_indices = reader.bytes(usize::from(n))?.to_vec();
            let len = reader.compact_u16()?;
            let data = reader.bytes(usize::from(len))?.to_vec();
            instructions.push(CompiledInstruction {
                program_id_index,
                account_indices,
                data,
            });
        }

        if !reader.is_empty() {
            return Err(SolError::SerializationError(format!(
                "{} trailing bytes after message",
                reader.remaining()
            )));
        }

        if usize::from(header.num_required_signatures) > account_keys.len() {
            return Err(SolError::SerializationError(
                "more required signatures than account keys".into(),
            ));
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }
}

/// Bounds-checked cursor over wire bytes.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub(crate) fn u8(&mut self) -> Result<u8, SolError> {
        Ok(self.bytes(1)?[0])
    }

    pub(crate) fn compact_u16(&mut self) -> Result<u16, SolError> {
        let (value, used) = decode_compact_u16(self.rest())?;
        self.pos += used;
        Ok(value)
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8], SolError> {
        if len > self.remaining() {
            return Err(SolError::SerializationError(format!(
                "need {len} bytes at offset {}, {} left",
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], SolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }
}
