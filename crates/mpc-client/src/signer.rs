use async_trait::async_trait;
use chain_eth::SignedTransaction;
use serde_json::Value;

use crate::credential::RefreshToken;
use crate::error::RemoteError;
use crate::types::TransactionRequest;

/// A remote MPC signing backend.
///
/// Implementations authenticate every call with the account's refresh token.
/// Signatures are returned unverified; checking them is the caller's job.
#[async_trait]
pub trait RemoteSigner: Send + Sync {
    /// Signs a message (`message`) or structured payload (`payload`) for `from`.
    async fn sign_data(
        &self,
        from: &str,
        message: &str,
        payload: &Value,
        refresh_token: &RefreshToken,
    ) -> Result<String, RemoteError>;

    /// Signs a transaction and returns it reconstructed from the serialized form.
    async fn sign_transaction(
        &self,
        tx: &TransactionRequest,
        refresh_token: &RefreshToken,
    ) -> Result<SignedTransaction, RemoteError>;
}
