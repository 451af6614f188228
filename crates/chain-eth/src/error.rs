use thiserror::Error;

/// Ethereum verification errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid typed data: {0}")]
    InvalidTypedData(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("transaction type {tx_type} is not supported by the {hardfork} hardfork")]
    UnsupportedTransactionType { tx_type: u8, hardfork: &'static str },

    #[error("chain id mismatch: expected {expected}, got {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("{scheme} signature verification failed for account '{expected}' (got '{recovered}')")]
    SignatureMismatch {
        scheme: &'static str,
        expected: String,
        recovered: String,
    },
}
