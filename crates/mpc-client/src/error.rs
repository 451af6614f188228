use chain_eth::EthError;
use thiserror::Error;

/// Errors returned by the remote signing backend client.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Non-200 status, or a 200 response whose body carries an `error` field.
    #[error("non 200 status code received from remote signer: {status}, response body: {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no signature returned by remote signer")]
    NoSignatureReturned,

    #[error("invalid response from remote signer: {0}")]
    InvalidResponse(String),

    #[error("invalid transaction request: {0}")]
    InvalidTransaction(String),

    #[error(transparent)]
    Eth(#[from] EthError),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}
