//! Envelope assembly.

use chain_sol::{CommitmentLevel, Instruction, Pubkey, SolError, Transaction};
use tracing::debug;

use crate::connection::Connection;
use crate::error::WalletTesterError;

/// Build a fresh transaction envelope.
///
/// Instructions are appended in input order, then exactly one blockhash read
/// is made and its hash and expiry height stamped on the envelope, followed by
/// the fee payer. The read happens after the instruction list is final, so
/// the envelope is ready for signing as returned.
///
/// A `None` fee payer is accepted here; signing the envelope later fails
/// with [`SolError::MissingFeePayer`]. A failed read is returned unchanged
/// with no retry.
pub async fn make_transaction(
    connection: &dyn Connection,
    instructions: &[Instruction],
    fee_payer: Option<Pubkey>,
    commitment: CommitmentLevel,
) -> Result<Transaction, WalletTesterError> {
    if instructions.is_empty() {
        return Err(SolError::TransactionBuildError("no instructions provided".into()).into());
    }

    let mut transaction = Transaction::new();
    for instruction in instructions {
        transaction.add(instruction.clone());
    }

    let latest = connection.get_latest_blockhash(commitment).await?;
    debug!(
        blockhash = %latest.blockhash,
        last_valid_block_height = latest.last_valid_block_height,
        %commitment,
        "fetched latest blockhash"
    );

    transaction.recent_blockhash = Some(latest.blockhash);
    transaction.last_valid_block_height = Some(latest.last_valid_block_height);
    transaction.fee_payer = fee_payer;

    Ok(transaction)
}
