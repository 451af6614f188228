//! MPC signing keyring.
//!
//! Keeps a registry of address-only accounts, routes signing requests to the
//! remote MPC signer and verifies every returned signature locally.

pub mod account;
pub mod error;
pub mod events;
pub mod keyring;
pub mod request;
pub mod rpc;
pub mod state;
pub mod store;

pub use account::{EthAccountType, EthMethod, KeyringAccount, KeyringState, Wallet};
pub use error::KeyringError;
pub use events::{ChannelEventSink, EmittedEvent, EventSink, KeyringEvent, TracingEventSink};
pub use keyring::MpcKeyring;
pub use request::{KeyringRequest, RequestCall, SigningRequest, SubmitRequestResponse};
pub use rpc::{KeyringCall, KeyringMutation, KeyringQuery};
pub use state::{JsonFileStateStore, MemoryStateStore, StateStore};
pub use store::AccountStore;
