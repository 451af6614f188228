//! Keyring JSON-RPC methods.
//!
//! A call is parsed into either a [`KeyringQuery`], which only needs a shared
//! borrow of the keyring, or a [`KeyringMutation`], which needs an exclusive
//! one. Hosts lock accordingly.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::account::KeyringAccount;
use crate::error::KeyringError;
use crate::keyring::MpcKeyring;
use crate::request::KeyringRequest;

pub const INVALID_PARAMS: i64 = -32602;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const SERVER_ERROR: i64 = -32000;

/// Calls that read keyring state or sign with it.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyringQuery {
    ListAccounts,
    GetAccount { id: String },
    FilterAccountChains { id: String, chains: Vec<String> },
    SubmitRequest(KeyringRequest),
}

/// Calls that change the account registry.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyringMutation {
    CreateAccount { options: Map<String, Value> },
    UpdateAccount { account: KeyringAccount },
    DeleteAccount { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyringCall {
    Query(KeyringQuery),
    Mutation(KeyringMutation),
}

#[derive(Deserialize)]
struct IdParams {
    id: String,
}

#[derive(Deserialize)]
struct CreateParams {
    #[serde(default)]
    options: Map<String, Value>,
}

#[derive(Deserialize)]
struct FilterParams {
    id: String,
    chains: Vec<String>,
}

#[derive(Deserialize)]
struct UpdateParams {
    account: KeyringAccount,
}

fn decode<T: DeserializeOwned>(method: &str, params: Option<Value>) -> Result<T, KeyringError> {
    let params = params.unwrap_or_else(|| Value::Object(Map::new()));
    serde_json::from_value(params)
        .map_err(|e| KeyringError::InvalidRequest(format!("{method}: {e}")))
}

impl KeyringCall {
    pub fn parse(method: &str, params: Option<Value>) -> Result<Self, KeyringError> {
        let call = match method {
            "keyring_listAccounts" => KeyringCall::Query(KeyringQuery::ListAccounts),
            "keyring_getAccount" => {
                let IdParams { id } = decode(method, params)?;
                KeyringCall::Query(KeyringQuery::GetAccount { id })
            }
            "keyring_filterAccountChains" => {
                let FilterParams { id, chains } = decode(method, params)?;
                KeyringCall::Query(KeyringQuery::FilterAccountChains { id, chains })
            }
            "keyring_submitRequest" => {
                KeyringCall::Query(KeyringQuery::SubmitRequest(decode(method, params)?))
            }
            "keyring_createAccount" => {
                let CreateParams { options } = decode(method, params)?;
                KeyringCall::Mutation(KeyringMutation::CreateAccount { options })
            }
            "keyring_updateAccount" => {
                let UpdateParams { account } = decode(method, params)?;
                KeyringCall::Mutation(KeyringMutation::UpdateAccount { account })
            }
            "keyring_deleteAccount" => {
                let IdParams { id } = decode(method, params)?;
                KeyringCall::Mutation(KeyringMutation::DeleteAccount { id })
            }
            other => return Err(KeyringError::MethodNotFound(other.to_string())),
        };
        Ok(call)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, KeyringError> {
    serde_json::to_value(value).map_err(|e| KeyringError::InvalidRequest(e.to_string()))
}

impl KeyringQuery {
    pub async fn execute(self, keyring: &MpcKeyring) -> Result<Value, KeyringError> {
        match self {
            KeyringQuery::ListAccounts => to_json(&keyring.list_accounts()),
            KeyringQuery::GetAccount { id } => to_json(&keyring.get_account(&id)?),
            KeyringQuery::FilterAccountChains { id, chains } => {
                to_json(&keyring.filter_account_chains(&id, &chains))
            }
            KeyringQuery::SubmitRequest(request) => to_json(&keyring.submit_request(&request).await?),
        }
    }
}

impl KeyringMutation {
    pub async fn execute(self, keyring: &mut MpcKeyring) -> Result<Value, KeyringError> {
        match self {
            KeyringMutation::CreateAccount { options } => {
                to_json(&keyring.create_account(options).await?)
            }
            KeyringMutation::UpdateAccount { account } => {
                keyring.update_account(&account)?;
                Ok(Value::Null)
            }
            KeyringMutation::DeleteAccount { id } => {
                keyring.delete_account(&id).await?;
                Ok(Value::Null)
            }
        }
    }
}

/// JSON-RPC error code for a keyring error.
pub fn error_code(err: &KeyringError) -> i64 {
    match err {
        KeyringError::InvalidRequest(_) | KeyringError::InvalidOptions(_) => INVALID_PARAMS,
        KeyringError::MethodNotFound(_) => METHOD_NOT_FOUND,
        _ => SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn queries_and_mutations_are_separated() {
        assert_eq!(
            KeyringCall::parse("keyring_listAccounts", None).unwrap(),
            KeyringCall::Query(KeyringQuery::ListAccounts)
        );
        assert!(matches!(
            KeyringCall::parse("keyring_deleteAccount", Some(json!({ "id": "a" }))).unwrap(),
            KeyringCall::Mutation(KeyringMutation::DeleteAccount { id }) if id == "a"
        ));
        assert!(matches!(
            KeyringCall::parse(
                "keyring_createAccount",
                Some(json!({ "options": { "mpcAddress": "0xabc" } }))
            )
            .unwrap(),
            KeyringCall::Mutation(KeyringMutation::CreateAccount { .. })
        ));
    }

    #[test]
    fn filter_params_parse() {
        let call = KeyringCall::parse(
            "keyring_filterAccountChains",
            Some(json!({ "id": "a", "chains": ["eip155:1"] })),
        )
        .unwrap();
        assert_eq!(
            call,
            KeyringCall::Query(KeyringQuery::FilterAccountChains {
                id: "a".into(),
                chains: vec!["eip155:1".into()]
            })
        );
    }

    #[test]
    fn create_without_options_uses_empty_map() {
        let call = KeyringCall::parse("keyring_createAccount", None).unwrap();
        assert_eq!(
            call,
            KeyringCall::Mutation(KeyringMutation::CreateAccount {
                options: Map::new()
            })
        );
    }

    #[test]
    fn submit_request_params_parse() {
        let call = KeyringCall::parse(
            "keyring_submitRequest",
            Some(json!({
                "id": "req",
                "scope": "",
                "account": "acc",
                "request": { "method": "personal_sign", "params": ["0x00", "0xabc"] }
            })),
        )
        .unwrap();
        assert!(matches!(call, KeyringCall::Query(KeyringQuery::SubmitRequest(_))));
    }

    #[test]
    fn bad_params_map_to_invalid_params_code() {
        let err = KeyringCall::parse("keyring_getAccount", Some(json!({ "identifier": 1 })))
            .unwrap_err();
        assert!(matches!(err, KeyringError::InvalidRequest(_)));
        assert_eq!(error_code(&err), INVALID_PARAMS);
    }

    #[test]
    fn unknown_method_maps_to_method_not_found() {
        let err = KeyringCall::parse("keyring_exportAccount", None).unwrap_err();
        assert_eq!(error_code(&err), METHOD_NOT_FOUND);
        assert_eq!(error_code(&KeyringError::NotFound("a".into())), SERVER_ERROR);
    }
}
