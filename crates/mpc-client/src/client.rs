use async_trait::async_trait;
use chain_eth::json::is_truthy;
use chain_eth::{Hardfork, SignedTransaction};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::credential::RefreshToken;
use crate::error::RemoteError;
use crate::signer::RemoteSigner;
use crate::types::{SignRequest, SignResponse, TokenRequest, TokenResponse, TransactionRequest};

const TOKEN_PATH: &str = "/snaps/token";
const SIGN_DATA_PATH: &str = "/snaps/sign/sync";
const SIGN_TX_PATH: &str = "/snaps/tx/sync";

/// HTTP client for the remote MPC signing API.
///
/// Each signing call first exchanges the refresh token for a bearer token,
/// then posts the request. Tokens are not cached between calls.
#[derive(Debug, Clone)]
pub struct RemoteSigningClient {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSigningClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client with a preconfigured `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn access_token(&self, refresh_token: &RefreshToken) -> Result<SecretString, RemoteError> {
        let response = self
            .client
            .post(format!("{}{TOKEN_PATH}", self.base_url))
            .json(&TokenRequest {
                refresh_token: refresh_token.expose(),
            })
            .send()
            .await?;

        let body = read_body(TOKEN_PATH, response).await?;
        let token: TokenResponse =
            serde_json::from_value(body).map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        match token.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(SecretString::from(access_token)),
            _ => Err(RemoteError::InvalidResponse(
                "token response has no access_token".into(),
            )),
        }
    }

    async fn execute<T: Serialize + ?Sized>(
        &self,
        path: &str,
        access_token: &SecretString,
        body: &T,
    ) -> Result<SignResponse, RemoteError> {
        debug!(path, "sending request to remote signer");
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(access_token.expose_secret())
            .json(body)
            .send()
            .await?;

        let body = read_body(path, response).await?;
        serde_json::from_value(body).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

/// Applies the response contract shared by every endpoint: only 200 is a
/// success, and a 200 body with a truthy `error` field is still a failure.
async fn read_body(path: &str, response: reqwest::Response) -> Result<Value, RemoteError> {
    let status = response.status();
    let text = response.text().await?;

    if status != StatusCode::OK {
        warn!(path, status = status.as_u16(), "remote signer rejected request");
        return Err(RemoteError::Api {
            status: status.as_u16(),
            body: text,
        });
    }

    let json: Value =
        serde_json::from_str(&text).map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
    if json.get("error").is_some_and(is_truthy) {
        warn!(path, "remote signer returned an error body");
        return Err(RemoteError::Api {
            status: status.as_u16(),
            body: text,
        });
    }

    Ok(json)
}

#[async_trait]
impl RemoteSigner for RemoteSigningClient {
    async fn sign_data(
        &self,
        from: &str,
        message: &str,
        payload: &Value,
        refresh_token: &RefreshToken,
    ) -> Result<String, RemoteError> {
        let access_token = self.access_token(refresh_token).await?;
        let request = SignRequest {
            from,
            message,
            payload,
        };
        let response = self.execute(SIGN_DATA_PATH, &access_token, &request).await?;

        response
            .signature
            .filter(|signature| !signature.is_empty())
            .ok_or(RemoteError::NoSignatureReturned)
    }

    async fn sign_transaction(
        &self,
        tx: &TransactionRequest,
        refresh_token: &RefreshToken,
    ) -> Result<SignedTransaction, RemoteError> {
        let tx = tx.normalized()?;
        let chain_id = tx.chain_id_number()?;

        let access_token = self.access_token(refresh_token).await?;
        let response = self.execute(SIGN_TX_PATH, &access_token, &tx).await?;

        let raw = response
            .signed_tx
            .filter(|signed_tx| !signed_tx.is_empty())
            .ok_or(RemoteError::NoSignatureReturned)?;

        let hardfork = Hardfork::for_fee_market(tx.has_fee_market_fields());
        debug!(chain_id, hardfork = hardfork.name(), "decoding signed transaction");
        Ok(SignedTransaction::from_hex(&raw, chain_id, hardfork)?)
    }
}
