//! Client for the remote MPC signing backend.
//!
//! The backend exposes an OAuth-style token exchange plus two signing
//! endpoints (`/snaps/sign/sync` and `/snaps/tx/sync`). [`RemoteSigner`] is
//! the seam the keyring depends on; [`RemoteSigningClient`] implements it
//! over HTTP.

pub mod client;
pub mod credential;
pub mod error;
pub mod signer;
pub mod types;

pub use client::RemoteSigningClient;
pub use credential::RefreshToken;
pub use error::RemoteError;
pub use signer::RemoteSigner;
pub use types::{SignRequest, SignResponse, TransactionRequest};
