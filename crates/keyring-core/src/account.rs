//! Account and registry model.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use mpc_client::RefreshToken;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Option key holding the remote signer credential. Stripped from stored options.
pub const REFRESH_TOKEN_OPTION: &str = "refreshToken";

/// Signing methods an account exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EthMethod {
    #[serde(rename = "personal_sign")]
    PersonalSign,
    #[serde(rename = "eth_sign")]
    Sign,
    #[serde(rename = "eth_signTransaction")]
    SignTransaction,
    #[serde(rename = "eth_signTypedData_v1")]
    SignTypedDataV1,
    #[serde(rename = "eth_signTypedData_v3")]
    SignTypedDataV3,
    #[serde(rename = "eth_signTypedData_v4")]
    SignTypedDataV4,
}

impl EthMethod {
    /// Every method, in the order accounts advertise them.
    pub const ALL: [EthMethod; 6] = [
        EthMethod::PersonalSign,
        EthMethod::Sign,
        EthMethod::SignTransaction,
        EthMethod::SignTypedDataV1,
        EthMethod::SignTypedDataV3,
        EthMethod::SignTypedDataV4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EthMethod::PersonalSign => "personal_sign",
            EthMethod::Sign => "eth_sign",
            EthMethod::SignTransaction => "eth_signTransaction",
            EthMethod::SignTypedDataV1 => "eth_signTypedData_v1",
            EthMethod::SignTypedDataV3 => "eth_signTypedData_v3",
            EthMethod::SignTypedDataV4 => "eth_signTypedData_v4",
        }
    }
}

impl fmt::Display for EthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EthMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Account type tag. Only externally owned EVM accounts exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EthAccountType {
    #[serde(rename = "eip155:eoa")]
    Eoa,
}

/// An account as exposed to the wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyringAccount {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub options: Map<String, Value>,
    pub methods: Vec<EthMethod>,
    #[serde(rename = "type")]
    pub account_type: EthAccountType,
}

impl KeyringAccount {
    /// Creates an account with a fresh v4 id and the full method set.
    ///
    /// The refresh token option, if present, is dropped.
    pub fn new(address: impl Into<String>, mut options: Map<String, Value>) -> Self {
        options.remove(REFRESH_TOKEN_OPTION);
        Self {
            id: Uuid::new_v4().to_string(),
            address: address.into(),
            options,
            methods: EthMethod::ALL.to_vec(),
            account_type: EthAccountType::Eoa,
        }
    }
}

/// A registered account together with its remote signer credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub account: KeyringAccount,
    pub refresh_token: RefreshToken,
}

/// Persisted registry: wallets keyed by account id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyringState {
    #[serde(default)]
    pub wallets: BTreeMap<String, Wallet>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn new_account_has_full_method_set_in_order() {
        let account = KeyringAccount::new("0xabc", Map::new());
        let methods = serde_json::to_value(&account.methods).unwrap();
        assert_eq!(
            methods,
            json!([
                "personal_sign",
                "eth_sign",
                "eth_signTransaction",
                "eth_signTypedData_v1",
                "eth_signTypedData_v3",
                "eth_signTypedData_v4"
            ])
        );
    }

    #[test]
    fn new_account_ids_are_unique_uuids() {
        let a = KeyringAccount::new("0xabc", Map::new());
        let b = KeyringAccount::new("0xabc", Map::new());
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn refresh_token_is_stripped_from_options() {
        let account = KeyringAccount::new(
            "0xabc",
            options(json!({ "mpcAddress": "0xabc", "refreshToken": "secret", "label": "ops" })),
        );
        assert!(!account.options.contains_key(REFRESH_TOKEN_OPTION));
        assert_eq!(account.options["label"], "ops");
        assert!(!serde_json::to_string(&account).unwrap().contains("secret"));
    }

    #[test]
    fn account_serializes_with_type_tag() {
        let account = KeyringAccount::new("0xabc", Map::new());
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["type"], "eip155:eoa");
        assert_eq!(value["address"], "0xabc");
    }

    #[test]
    fn method_names_parse() {
        assert_eq!("eth_signTypedData_v4".parse(), Ok(EthMethod::SignTypedDataV4));
        assert_eq!("personal_sign".parse(), Ok(EthMethod::PersonalSign));
        assert!("eth_sendTransaction".parse::<EthMethod>().is_err());
    }

    #[test]
    fn state_without_wallets_key_is_empty() {
        let state: KeyringState = serde_json::from_str("{}").unwrap();
        assert!(state.wallets.is_empty());
    }

    #[test]
    fn wallet_serializes_refresh_token_camel_case() {
        let wallet = Wallet {
            account: KeyringAccount::new("0xabc", Map::new()),
            refresh_token: RefreshToken::new("token"),
        };
        let value = serde_json::to_value(&wallet).unwrap();
        assert_eq!(value["refreshToken"], "token");

        let parsed: Wallet = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, wallet);
    }
}
