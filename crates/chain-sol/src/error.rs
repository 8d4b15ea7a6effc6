use thiserror::Error;

/// Solana envelope and wire-format errors.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid blockhash: {0}")]
    InvalidBlockhash(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("transaction has no fee payer")]
    MissingFeePayer,

    #[error("transaction has no recent blockhash")]
    MissingBlockhash,

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}
