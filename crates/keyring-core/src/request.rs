//! Signing requests and their typed form.

use chain_eth::TypedDataVersion;
use mpc_client::TransactionRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::account::EthMethod;
use crate::error::KeyringError;

/// A signing request routed to the keyring by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyringRequest {
    pub id: String,
    #[serde(default)]
    pub scope: String,
    pub account: String,
    pub request: RequestCall,
}

/// The wrapped JSON-RPC call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCall {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestCall {
    /// Positional params; absent means empty.
    pub fn params(&self) -> Result<&[Value], KeyringError> {
        match &self.params {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(KeyringError::InvalidRequest(format!(
                "params must be an array, got {other}"
            ))),
        }
    }
}

/// Result of a submitted request. The keyring always completes synchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequestResponse {
    pub pending: bool,
    pub result: Value,
}

impl SubmitRequestResponse {
    pub fn completed(result: Value) -> Self {
        Self {
            pending: false,
            result,
        }
    }
}

/// One variant per signing method family.
#[derive(Debug, Clone, PartialEq)]
pub enum SigningRequest {
    PersonalSign {
        message: String,
        from: String,
    },
    EthSign {
        from: String,
        data: String,
    },
    SignTransaction(TransactionRequest),
    SignTypedData {
        version: TypedDataVersion,
        from: String,
        data: Value,
    },
}

impl SigningRequest {
    pub fn parse(method: &str, params: &[Value]) -> Result<Self, KeyringError> {
        let method: EthMethod = method
            .parse()
            .map_err(KeyringError::UnsupportedMethod)?;

        let request = match method {
            EthMethod::PersonalSign => SigningRequest::PersonalSign {
                message: string_param(method, params, 0)?,
                from: string_param(method, params, 1)?,
            },
            EthMethod::Sign => SigningRequest::EthSign {
                from: string_param(method, params, 0)?,
                data: string_param(method, params, 1)?,
            },
            EthMethod::SignTransaction => {
                let tx = param(method, params, 0)?;
                let tx = serde_json::from_value(tx.clone()).map_err(|e| {
                    KeyringError::InvalidRequest(format!("{method}: invalid transaction: {e}"))
                })?;
                SigningRequest::SignTransaction(tx)
            }
            EthMethod::SignTypedDataV1 | EthMethod::SignTypedDataV3 | EthMethod::SignTypedDataV4 => {
                let version = match method {
                    EthMethod::SignTypedDataV1 => TypedDataVersion::V1,
                    EthMethod::SignTypedDataV3 => TypedDataVersion::V3,
                    _ => TypedDataVersion::V4,
                };
                SigningRequest::SignTypedData {
                    version,
                    from: string_param(method, params, 0)?,
                    data: param(method, params, 1)?.clone(),
                }
            }
        };
        Ok(request)
    }

    /// Address of the account asked to sign.
    pub fn from_address(&self) -> &str {
        match self {
            SigningRequest::PersonalSign { from, .. }
            | SigningRequest::EthSign { from, .. }
            | SigningRequest::SignTypedData { from, .. } => from,
            SigningRequest::SignTransaction(tx) => &tx.from,
        }
    }

    pub fn method(&self) -> EthMethod {
        match self {
            SigningRequest::PersonalSign { .. } => EthMethod::PersonalSign,
            SigningRequest::EthSign { .. } => EthMethod::Sign,
            SigningRequest::SignTransaction(_) => EthMethod::SignTransaction,
            SigningRequest::SignTypedData { version, .. } => match version {
                TypedDataVersion::V1 => EthMethod::SignTypedDataV1,
                TypedDataVersion::V3 => EthMethod::SignTypedDataV3,
                TypedDataVersion::V4 => EthMethod::SignTypedDataV4,
            },
        }
    }
}

fn param(method: EthMethod, params: &[Value], index: usize) -> Result<&Value, KeyringError> {
    params.get(index).ok_or_else(|| {
        KeyringError::InvalidRequest(format!("{method}: missing parameter {index}"))
    })
}

fn string_param(method: EthMethod, params: &[Value], index: usize) -> Result<String, KeyringError> {
    param(method, params, index)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            KeyringError::InvalidRequest(format!("{method}: parameter {index} must be a string"))
        })
}
