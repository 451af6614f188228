use chain_eth::address::addresses_match;
use mpc_client::RefreshToken;

use crate::account::{KeyringAccount, KeyringState, Wallet};
use crate::error::KeyringError;

/// In-memory account registry.
///
/// Addresses are unique under case-insensitive comparison.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    state: KeyringState,
}

impl AccountStore {
    pub fn new(state: KeyringState) -> Self {
        Self { state }
    }

    /// Snapshot for persistence.
    pub fn state(&self) -> &KeyringState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.wallets.is_empty()
    }

    pub fn list(&self) -> Vec<KeyringAccount> {
        self.state
            .wallets
            .values()
            .map(|wallet| wallet.account.clone())
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<&KeyringAccount, KeyringError> {
        self.state
            .wallets
            .get(id)
            .map(|wallet| &wallet.account)
            .ok_or_else(|| KeyringError::NotFound(id.to_string()))
    }

    /// Looks a wallet up by account address, ignoring case.
    pub fn find_by_address(&self, address: &str) -> Result<&Wallet, KeyringError> {
        self.state
            .wallets
            .values()
            .find(|wallet| addresses_match(&wallet.account.address, address))
            .ok_or_else(|| KeyringError::NotFound(address.to_string()))
    }

    pub fn is_unique_address(&self, address: &str) -> bool {
        self.find_by_address(address).is_err()
    }

    pub fn insert(
        &mut self,
        account: KeyringAccount,
        refresh_token: RefreshToken,
    ) -> Result<(), KeyringError> {
        if !self.is_unique_address(&account.address) {
            return Err(KeyringError::DuplicateAddress(account.address));
        }
        self.state.wallets.insert(
            account.id.clone(),
            Wallet {
                account,
                refresh_token,
            },
        );
        Ok(())
    }

    /// Removes the wallet with `id`. Returns whether one was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.state.wallets.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    const ADDRESS: &str = "0x6f83e67551C5eB8E3f684D2D61F46BF739ACB5dC";

    fn store_with_account() -> (AccountStore, KeyringAccount) {
        let mut store = AccountStore::default();
        let account = KeyringAccount::new(ADDRESS, Map::new());
        store
            .insert(account.clone(), RefreshToken::new("token"))
            .unwrap();
        (store, account)
    }

    #[test]
    fn get_returns_inserted_account() {
        let (store, account) = store_with_account();
        assert_eq!(store.get(&account.id).unwrap(), &account);
        assert_eq!(store.list(), vec![account]);
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = AccountStore::default();
        assert!(matches!(store.get("nope"), Err(KeyringError::NotFound(id)) if id == "nope"));
    }

    #[test]
    fn find_by_address_ignores_case() {
        let (store, account) = store_with_account();
        let wallet = store.find_by_address(&ADDRESS.to_uppercase().replace("0X", "0x")).unwrap();
        assert_eq!(wallet.account.id, account.id);
        assert_eq!(wallet.refresh_token.expose(), "token");
    }

    #[test]
    fn duplicate_address_in_any_case_is_rejected() {
        let (mut store, _) = store_with_account();
        let duplicate = KeyringAccount::new(ADDRESS.to_lowercase(), Map::new());
        let err = store
            .insert(duplicate, RefreshToken::new("other"))
            .unwrap_err();
        assert!(matches!(err, KeyringError::DuplicateAddress(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let (mut store, account) = store_with_account();
        assert!(store.remove(&account.id));
        assert!(!store.remove(&account.id));
        assert!(store.is_empty());
        assert!(store.is_unique_address(ADDRESS));
    }
}
