//! Ethereum primitives for the MPC keyring.
//!
//! This crate provides:
//! - Address parsing, validation and EIP-55 checksums
//! - secp256k1 public key recovery from 65-byte signatures
//! - EIP-191 `personal_sign` and typed data (v1, v3, v4) hashing
//! - Signed transaction decoding and sender recovery
//! - Signer verification for each of the above
//! - CAIP-2 chain id helpers

pub mod address;
pub mod chains;
pub mod error;
pub mod json;
pub mod message;
pub mod packed;
pub mod recover;
pub mod transaction;
pub mod typed_data;
pub mod verify;

pub use error::EthError;
pub use transaction::{Hardfork, SignedTransaction};
pub use typed_data::TypedDataVersion;
