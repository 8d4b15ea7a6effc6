//! Solana transaction envelopes without `solana-sdk`.
//!
//! Public keys, blockhashes, instructions, legacy message compilation and
//! the compact binary wire format are implemented by hand, using
//! `ed25519-dalek` for signatures and `bs58` for Base58 encoding.

pub mod address;
pub mod blockhash;
pub mod error;
pub mod instruction;
pub mod message;
pub mod short_vec;
pub mod signature;
pub mod transaction;
pub mod wire;

// Re-export key public types for ergonomic imports.
pub use address::Pubkey;
pub use blockhash::{Blockhash, CommitmentLevel, LatestBlockhash};
pub use error::SolError;
pub use instruction::{AccountMeta, Instruction};
pub use message::{CompiledInstruction, Message, MessageHeader};
pub use short_vec::{decode_compact_u16, encode_compact_u16};
pub use signature::Signature;
pub use transaction::{SerializeConfig, SignaturePair, Transaction};
pub use wire::WireTransaction;
