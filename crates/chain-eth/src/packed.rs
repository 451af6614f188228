//! Minimal Solidity "packed" encoding (`abi.encodePacked`) for legacy typed data.
//!
//! Scalars use their natural width; array elements are padded to 32-byte
//! ABI words. This covers what `eth_signTypedData_v1` needs without a full
//! ABI implementation.

use alloy_primitives::U256;

use crate::error::EthError;

/// A single packed value.
#[derive(Debug, Clone, PartialEq)]
pub enum PackedValue {
    /// UTF-8 bytes, no length prefix.
    String(String),
    /// Dynamic bytes, no length prefix.
    Bytes(Vec<u8>),
    /// A single 0x00/0x01 byte.
    Bool(bool),
    /// A 20-byte address.
    Address([u8; 20]),
    /// `uintN` / `intN`: the two's-complement value truncated to `bits / 8` bytes.
    Int { bits: usize, value: U256 },
    /// `bytesN`: right-padded to `size` bytes.
    FixedBytes { size: usize, bytes: Vec<u8> },
    /// Array of static scalars, each padded to a 32-byte word.
    Array(Vec<PackedValue>),
}

/// Concatenates the packed encodings of `values`.
pub fn encode_packed(values: &[PackedValue]) -> Result<Vec<u8>, EthError> {
    let mut out = Vec::new();
    for value in values {
        encode_value(value, &mut out)?;
    }
    Ok(out)
}

fn encode_value(value: &PackedValue, out: &mut Vec<u8>) -> Result<(), EthError> {
    match value {
        PackedValue::String(s) => out.extend_from_slice(s.as_bytes()),
        PackedValue::Bytes(bytes) => out.extend_from_slice(bytes),
        PackedValue::Bool(b) => out.push(u8::from(*b)),
        PackedValue::Address(addr) => out.extend_from_slice(addr),
        PackedValue::Int { bits, value } => {
            let word: [u8; 32] = value.to_be_bytes();
            out.extend_from_slice(&word[32 - bits / 8..]);
        }
        PackedValue::FixedBytes { size, bytes } => {
            let mut padded = bytes.clone();
            padded.resize(*size, 0);
            out.extend_from_slice(&padded);
        }
        PackedValue::Array(items) => {
            for item in items {
                out.extend_from_slice(&encode_word(item)?);
            }
        }
    }
    Ok(())
}

/// Encodes an array element as a 32-byte ABI word.
fn encode_word(value: &PackedValue) -> Result<[u8; 32], EthError> {
    let mut word = [0u8; 32];
    match value {
        PackedValue::Address(addr) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            word[12..].copy_from_slice(addr);
        }
        PackedValue::Bool(b) => word[31] = u8::from(*b),
        // Negative values are already sign-extended across the full word.
        PackedValue::Int { value, .. } => word = value.to_be_bytes(),
        other => {
            return Err(EthError::InvalidTypedData(format!(
                "unsupported array element {other:?}"
            )))
        }
    }
    Ok(word)
}
