use chain_eth::EthError;
use mpc_client::RemoteError;
use thiserror::Error;

/// Keyring errors surfaced to the caller.
#[derive(Debug, Error)]
pub enum KeyringError {
    #[error("Account '{0}' not found")]
    NotFound(String),

    #[error("Account address already in use: {0}")]
    DuplicateAddress(String),

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("EVM method '{0}' not supported")]
    UnsupportedMethod(String),

    #[error("method '{0}' not found")]
    MethodNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid account options: {0}")]
    InvalidOptions(String),

    #[error("non 200 status code received from remote signer: {status}, response body: {body}")]
    RemoteApi { status: u16, body: String },

    #[error("no signature returned by remote signer")]
    NoSignatureReturned,

    #[error("{scheme} signature verification failed for account '{expected}' (got '{recovered}')")]
    SignatureMismatch {
        scheme: &'static str,
        expected: String,
        recovered: String,
    },

    #[error("remote signer unavailable: {0}")]
    Transport(String),

    #[error("verification error: {0}")]
    Verification(String),

    #[error("event emission failed: {0}")]
    Event(String),

    #[error("state storage error: {0}")]
    Storage(String),
}

impl From<EthError> for KeyringError {
    fn from(err: EthError) -> Self {
        match err {
            EthError::SignatureMismatch {
                scheme,
                expected,
                recovered,
            } => KeyringError::SignatureMismatch {
                scheme,
                expected,
                recovered,
            },
            other => KeyringError::Verification(other.to_string()),
        }
    }
}

impl From<RemoteError> for KeyringError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Api { status, body } => KeyringError::RemoteApi { status, body },
            RemoteError::NoSignatureReturned => KeyringError::NoSignatureReturned,
            RemoteError::InvalidTransaction(msg) => KeyringError::InvalidRequest(msg),
            RemoteError::Eth(e) => e.into(),
            transport @ (RemoteError::Transport(_) | RemoteError::InvalidResponse(_)) => {
                KeyringError::Transport(transport.to_string())
            }
        }
    }
}
