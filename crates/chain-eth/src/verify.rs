//! Checks that a signature was produced by the expected account.
//!
//! Each check recovers the signer independently and returns the recovered
//! (checksummed) address on success.

use serde_json::Value;

use crate::address::addresses_match;
use crate::error::EthError;
use crate::message::{decode_message, recover_personal_signature};
use crate::transaction::SignedTransaction;
use crate::typed_data::{recover_typed_signature, TypedDataVersion};

fn ensure_signer(
    scheme: &'static str,
    expected: &str,
    recovered: String,
) -> Result<String, EthError> {
    if addresses_match(expected, &recovered) {
        Ok(recovered)
    } else {
        Err(EthError::SignatureMismatch {
            scheme,
            expected: expected.to_string(),
            recovered,
        })
    }
}

/// Verifies a `personal_sign` signature over `message` (hex or UTF-8).
pub fn verify_personal_signature(
    message: &str,
    expected: &str,
    signature: &str,
) -> Result<String, EthError> {
    let recovered = recover_personal_signature(&decode_message(message), signature)?;
    ensure_signer("Personal sign", expected, recovered)
}

/// Verifies an `eth_signTypedData` signature for the given version.
pub fn verify_typed_signature(
    data: &Value,
    version: TypedDataVersion,
    expected: &str,
    signature: &str,
) -> Result<String, EthError> {
    let recovered = recover_typed_signature(data, signature, version)?;
    ensure_signer("TypedData", expected, recovered)
}

/// Verifies that a signed transaction was sent by `expected`.
pub fn verify_transaction_sender(
    tx: &SignedTransaction,
    expected: &str,
) -> Result<String, EthError> {
    let recovered = tx.recover_sender()?;
    ensure_signer("Transaction", expected, recovered)
}
