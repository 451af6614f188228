//! Request and response bodies exchanged with the remote signer.

use chain_eth::chains::{normalize_chain_id, parse_chain_id};
use chain_eth::json::is_truthy;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::RemoteError;

/// Transaction to be signed, as received from the wallet.
///
/// Only the fields the client inspects are typed; everything else is
/// forwarded to the remote signer verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: String,
    #[serde(deserialize_with = "chain_id_from_string_or_number")]
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionRequest {
    /// True when either EIP-1559 fee field is present and truthy.
    pub fn has_fee_market_fields(&self) -> bool {
        [&self.max_fee_per_gas, &self.max_priority_fee_per_gas]
            .into_iter()
            .any(|field| field.as_ref().is_some_and(is_truthy))
    }

    /// Returns a copy with `chainId` rewritten as 0x-prefixed hex.
    pub fn normalized(&self) -> Result<Self, RemoteError> {
        let chain_id = normalize_chain_id(&self.chain_id)
            .map_err(|e| RemoteError::InvalidTransaction(e.to_string()))?;
        Ok(Self {
            chain_id,
            ..self.clone()
        })
    }

    /// Numeric chain id.
    pub fn chain_id_number(&self) -> Result<u64, RemoteError> {
        parse_chain_id(&self.chain_id).map_err(|e| RemoteError::InvalidTransaction(e.to_string()))
    }
}

fn chain_id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "chainId must be a string or number, got {other}"
        ))),
    }
}

/// Body of `/snaps/sign/sync`.
#[derive(Debug, Clone, Serialize)]
pub struct SignRequest<'a> {
    pub from: &'a str,
    pub message: &'a str,
    pub payload: &'a Value,
}

/// Successful signing response. Fields the endpoint does not return are absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub signed_tx: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}
