//! EIP-191 `personal_sign` hashing and signer recovery.

use sha3::{Digest, Keccak256};

use crate::error::EthError;
use crate::recover::RecoverableSignature;

/// Decodes a `personal_sign` message parameter.
///
/// Hex digits are decoded with or without a `0x` prefix, odd-length input
/// gaining a leading zero. Anything else is treated as a plain UTF-8 string.
pub fn decode_message(message: &str) -> Vec<u8> {
    let digits = message
        .strip_prefix("0x")
        .or_else(|| message.strip_prefix("0X"))
        .unwrap_or(message);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return message.as_bytes().to_vec();
    }

    let decoded = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    };
    decoded.unwrap_or_else(|_| message.as_bytes().to_vec())
}

/// Hashes a message as keccak256("\x19Ethereum Signed Message:\n" + len(message) + message).
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Recovers the address that produced a `personal_sign` signature.
pub fn recover_personal_signature(message: &[u8], signature: &str) -> Result<String, EthError> {
    let sig = RecoverableSignature::from_hex(signature)?;
    sig.recover_address(&personal_message_hash(message))
}
