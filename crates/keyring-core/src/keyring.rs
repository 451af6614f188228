use std::sync::Arc;

use chain_eth::address::validate_address;
use chain_eth::chains::is_evm_chain;
use chain_eth::verify::{
    verify_personal_signature, verify_transaction_sender, verify_typed_signature,
};
use mpc_client::{RefreshToken, RemoteSigner};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::account::{KeyringAccount, KeyringState, Wallet, REFRESH_TOKEN_OPTION};
use crate::error::KeyringError;
use crate::events::{EventSink, KeyringEvent};
use crate::request::{KeyringRequest, SigningRequest, SubmitRequestResponse};
use crate::state::StateStore;
use crate::store::AccountStore;

const ADDRESS_OPTION: &str = "mpcAddress";
const ADDRESS_OPTION_ALIAS: &str = "address";

/// Keyring backed by a remote MPC signer.
///
/// Holds address-only accounts; every signature is produced remotely and
/// checked locally against the account address before it is returned.
/// Mutations take `&mut self`, so callers serialize them.
pub struct MpcKeyring {
    store: AccountStore,
    signer: Arc<dyn RemoteSigner>,
    state_store: Arc<dyn StateStore>,
    events: Arc<dyn EventSink>,
}

impl MpcKeyring {
    pub fn new(
        state: KeyringState,
        signer: Arc<dyn RemoteSigner>,
        state_store: Arc<dyn StateStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store: AccountStore::new(state),
            signer,
            state_store,
            events,
        }
    }

    /// Builds a keyring from the state currently held by `state_store`.
    pub async fn load(
        signer: Arc<dyn RemoteSigner>,
        state_store: Arc<dyn StateStore>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, KeyringError> {
        let state = state_store.load().await?;
        debug!(wallets = state.wallets.len(), "keyring state loaded");
        Ok(Self::new(state, signer, state_store, events))
    }

    pub fn state(&self) -> &KeyringState {
        self.store.state()
    }

    pub fn list_accounts(&self) -> Vec<KeyringAccount> {
        self.store.list()
    }

    pub fn get_account(&self, id: &str) -> Result<KeyringAccount, KeyringError> {
        self.store.get(id).cloned()
    }

    /// Registers an account for an address held by the remote signer.
    ///
    /// `options` must carry `mpcAddress` (or `address`) and `refreshToken`.
    /// The creation event is emitted before the account is stored; if it
    /// fails nothing is stored.
    pub async fn create_account(
        &mut self,
        options: Map<String, Value>,
    ) -> Result<KeyringAccount, KeyringError> {
        let address = options
            .get(ADDRESS_OPTION)
            .or_else(|| options.get(ADDRESS_OPTION_ALIAS))
            .and_then(Value::as_str)
            .ok_or_else(|| KeyringError::InvalidOptions(format!("{ADDRESS_OPTION} is required")))?
            .to_string();
        let refresh_token = options
            .get(REFRESH_TOKEN_OPTION)
            .and_then(Value::as_str)
            .map(RefreshToken::new)
            .ok_or_else(|| {
                KeyringError::InvalidOptions(format!("{REFRESH_TOKEN_OPTION} is required"))
            })?;

        validate_address(&address).map_err(|e| KeyringError::InvalidOptions(e.to_string()))?;
        if !self.store.is_unique_address(&address) {
            return Err(KeyringError::DuplicateAddress(address));
        }

        let account = KeyringAccount::new(address, options);
        let payload =
            serde_json::to_value(&account).map_err(|e| KeyringError::Event(e.to_string()))?;
        self.emit(KeyringEvent::AccountCreated, "account", payload).await?;
        self.store.insert(account.clone(), refresh_token)?;
        self.persist().await?;

        info!(account_id = %account.id, address = %account.address, "account created");
        Ok(account)
    }

    /// Keeps the EVM (`eip155:<id>`) chains. All accounts work on every EVM chain.
    pub fn filter_account_chains(&self, _id: &str, chains: &[String]) -> Vec<String> {
        chains
            .iter()
            .filter(|chain| is_evm_chain(chain))
            .cloned()
            .collect()
    }

    pub fn update_account(&self, _account: &KeyringAccount) -> Result<(), KeyringError> {
        Err(KeyringError::Unsupported("updateAccount"))
    }

    /// Deletes an account. Deleting an unknown id is not an error.
    pub async fn delete_account(&mut self, id: &str) -> Result<(), KeyringError> {
        self.emit(KeyringEvent::AccountDeleted, "id", Value::String(id.to_string()))
            .await?;
        let removed = self.store.remove(id);
        self.persist().await?;

        info!(account_id = %id, removed, "account deleted");
        Ok(())
    }

    /// Signs a request with the remote signer and verifies the result.
    pub async fn submit_request(
        &self,
        request: &KeyringRequest,
    ) -> Result<SubmitRequestResponse, KeyringError> {
        let signing = SigningRequest::parse(&request.request.method, request.request.params()?)?;
        debug!(
            request_id = %request.id,
            method = %signing.method(),
            "routing signing request"
        );

        let wallet = self.store.find_by_address(signing.from_address())?;
        let result = self.sign(wallet, signing).await.inspect_err(|e| {
            warn!(request_id = %request.id, account_id = %wallet.account.id, error = %e, "signing request failed");
        })?;
        Ok(SubmitRequestResponse::completed(result))
    }

    async fn sign(&self, wallet: &Wallet, request: SigningRequest) -> Result<Value, KeyringError> {
        let address = &wallet.account.address;
        let token = &wallet.refresh_token;

        match request {
            SigningRequest::PersonalSign { message, from } => {
                let signature = self
                    .signer
                    .sign_data(&from, &message, &Value::String(String::new()), token)
                    .await?;
                verify_personal_signature(&message, address, &signature)?;
                Ok(Value::String(signature))
            }
            // No local check is possible for raw hash signing.
            SigningRequest::EthSign { from, data } => {
                let signature = self
                    .signer
                    .sign_data(&from, "", &Value::String(data), token)
                    .await?;
                Ok(Value::String(signature))
            }
            SigningRequest::SignTransaction(tx) => {
                let signed = self.signer.sign_transaction(&tx, token).await?;
                verify_transaction_sender(&signed, &tx.from)?;
                Ok(signed.to_json()?)
            }
            SigningRequest::SignTypedData {
                version,
                from,
                data,
            } => {
                let signature = self.signer.sign_data(&from, "", &data, token).await?;
                verify_typed_signature(&data, version, address, &signature)?;
                Ok(Value::String(signature))
            }
        }
    }

    async fn emit(&self, event: KeyringEvent, key: &str, value: Value) -> Result<(), KeyringError> {
        let mut data = Map::new();
        data.insert(key.to_string(), value);
        self.events.emit(event, data).await
    }

    async fn persist(&self) -> Result<(), KeyringError> {
        self.state_store.save(self.store.state()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TracingEventSink;
    use crate::state::MemoryStateStore;
    use async_trait::async_trait;
    use chain_eth::SignedTransaction;
    use mpc_client::{RemoteError, TransactionRequest};
    use serde_json::json;

    const ADDRESS: &str = "0x6f83e67551C5eB8E3f684D2D61F46BF739ACB5dC";

    struct UnusedSigner;

    #[async_trait]
    impl RemoteSigner for UnusedSigner {
        async fn sign_data(
            &self,
            _from: &str,
            _message: &str,
            _payload: &Value,
            _refresh_token: &RefreshToken,
        ) -> Result<String, RemoteError> {
            Err(RemoteError::Transport("offline".into()))
        }

        async fn sign_transaction(
            &self,
            _tx: &TransactionRequest,
            _refresh_token: &RefreshToken,
        ) -> Result<SignedTransaction, RemoteError> {
            Err(RemoteError::Transport("offline".into()))
        }
    }

    fn keyring() -> (MpcKeyring, Arc<MemoryStateStore>) {
        let store = Arc::new(MemoryStateStore::new());
        let keyring = MpcKeyring::new(
            KeyringState::default(),
            Arc::new(UnusedSigner),
            store.clone(),
            Arc::new(TracingEventSink),
        );
        (keyring, store)
    }

    fn options(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn create_requires_address_and_token() {
        let (mut keyring, _) = keyring();
        let missing_token = keyring
            .create_account(options(json!({ "mpcAddress": ADDRESS })))
            .await;
        assert!(matches!(missing_token, Err(KeyringError::InvalidOptions(_))));

        let missing_address = keyring
            .create_account(options(json!({ "refreshToken": "t" })))
            .await;
        assert!(matches!(missing_address, Err(KeyringError::InvalidOptions(_))));
        assert!(keyring.list_accounts().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_malformed_address() {
        let (mut keyring, _) = keyring();
        let err = keyring
            .create_account(options(json!({ "mpcAddress": "0x1234", "refreshToken": "t" })))
            .await
            .unwrap_err();
        assert!(matches!(err, KeyringError::InvalidOptions(_)));
    }

    #[tokio::test]
    async fn create_accepts_address_alias() {
        let (mut keyring, store) = keyring();
        let account = keyring
            .create_account(options(json!({ "address": ADDRESS, "refreshToken": "t" })))
            .await
            .unwrap();
        assert_eq!(account.address, ADDRESS);

        let saved = store.saved().await.unwrap();
        assert_eq!(saved.wallets[&account.id].refresh_token.expose(), "t");
    }

    #[test]
    fn filter_keeps_evm_chains() {
        let (keyring, _) = keyring();
        let chains = vec!["eip155:1".to_string(), "cosmos:zenrock".to_string()];
        assert_eq!(keyring.filter_account_chains("any", &chains), vec!["eip155:1"]);
    }

    #[tokio::test]
    async fn update_is_unsupported() {
        let (mut keyring, _) = keyring();
        let account = keyring
            .create_account(options(json!({ "mpcAddress": ADDRESS, "refreshToken": "t" })))
            .await
            .unwrap();

        let mut changed = account.clone();
        changed.address = "0x000000000000000000000000000000000000dEaD".into();
        assert!(matches!(
            keyring.update_account(&changed),
            Err(KeyringError::Unsupported(_))
        ));
        assert_eq!(keyring.get_account(&account.id).unwrap(), account);
    }
}
