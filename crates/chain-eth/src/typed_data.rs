//! Typed data hashing for `eth_signTypedData_v1`, `_v3` and `_v4`.
//!
//! V1 is the legacy array-of-fields scheme hashed with Solidity packed
//! encoding. V3 and V4 are EIP-712; V4 additionally allows arrays in the
//! type definitions.

use std::fmt;

use alloy_dyn_abi::TypedData;
use alloy_primitives::{B256, U256};
use serde_json::{Map, Value};
use sha3::{Digest, Keccak256};

use crate::address::parse_address;
use crate::error::EthError;
use crate::packed::{encode_packed, PackedValue};
use crate::recover::RecoverableSignature;
use crate::json::is_truthy;

const DOMAIN_TYPE: &str = "EIP712Domain";

/// Typed data signing scheme version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedDataVersion {
    V1,
    V3,
    V4,
}

impl fmt::Display for TypedDataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypedDataVersion::V1 => "V1",
            TypedDataVersion::V3 => "V3",
            TypedDataVersion::V4 => "V4",
        };
        f.write_str(name)
    }
}

/// Computes the 32-byte hash that a typed data signature commits to.
///
/// `data` may be the typed data itself or a JSON string encoding it.
pub fn typed_data_hash(data: &Value, version: TypedDataVersion) -> Result<[u8; 32], EthError> {
    let parsed;
    let data = match data {
        Value::String(encoded) => {
            parsed = serde_json::from_str::<Value>(encoded)
                .map_err(|e| EthError::InvalidTypedData(format!("invalid JSON: {e}")))?;
            &parsed
        }
        other => other,
    };

    match version {
        TypedDataVersion::V1 => legacy_typed_hash(data),
        TypedDataVersion::V3 => {
            reject_array_types(data)?;
            eip712_hash(data)
        }
        TypedDataVersion::V4 => eip712_hash(data),
    }
}

/// Recovers the address that produced a typed data signature.
pub fn recover_typed_signature(
    data: &Value,
    signature: &str,
    version: TypedDataVersion,
) -> Result<String, EthError> {
    let hash = typed_data_hash(data, version)?;
    RecoverableSignature::from_hex(signature)?.recover_address(&hash)
}

fn eip712_hash(data: &Value) -> Result<[u8; 32], EthError> {
    let typed = parse_typed_data(data.clone())?;
    let domain_separator = domain_separator(data)?;

    let mut hasher = Keccak256::new();
    hasher.update([0x19u8, 0x01]);
    hasher.update(domain_separator);
    if typed.primary_type != DOMAIN_TYPE {
        hasher.update(typed.hash_struct().map_err(invalid_typed_data)?);
    }
    Ok(hasher.finalize().into())
}

/// Hashes `domain` as a struct of the payload's own `EIP712Domain` type.
///
/// Field order and membership follow that declaration; domain fields it does
/// not declare are ignored. A payload without the type hashes `EIP712Domain()`.
fn domain_separator(data: &Value) -> Result<B256, EthError> {
    let mut types = data
        .get("types")
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| EthError::InvalidTypedData("missing `types`".into()))?;
    types
        .entry(DOMAIN_TYPE)
        .or_insert_with(|| Value::Array(Vec::new()));

    let domain = data
        .get("domain")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    let mut domain_struct = Map::new();
    domain_struct.insert("types".into(), Value::Object(types));
    domain_struct.insert("primaryType".into(), Value::String(DOMAIN_TYPE.into()));
    domain_struct.insert("domain".into(), Value::Object(Map::new()));
    domain_struct.insert("message".into(), domain);

    parse_typed_data(Value::Object(domain_struct))?
        .hash_struct()
        .map_err(invalid_typed_data)
}

fn parse_typed_data(data: Value) -> Result<TypedData, EthError> {
    serde_json::from_value(data).map_err(invalid_typed_data)
}

fn invalid_typed_data(e: impl fmt::Display) -> EthError {
    EthError::InvalidTypedData(e.to_string())
}

fn reject_array_types(data: &Value) -> Result<(), EthError> {
    let Some(types) = data.get("types").and_then(Value::as_object) else {
        return Ok(());
    };

    let has_array = types
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|field| field.get("type").and_then(Value::as_str))
        .any(|ty| ty.ends_with(']'));

    if has_array {
        return Err(EthError::InvalidTypedData(
            "arrays are unimplemented in V3, use V4".into(),
        ));
    }
    Ok(())
}

/// keccak256(keccak256(packed "type name" schema) || keccak256(packed values)).
fn legacy_typed_hash(data: &Value) -> Result<[u8; 32], EthError> {
    let entries = data
        .as_array()
        .filter(|entries| !entries.is_empty())
        .ok_or_else(|| EthError::InvalidTypedData("expected a non-empty array".into()))?;

    let mut schema = Vec::with_capacity(entries.len());
    let mut values = Vec::with_capacity(entries.len());

    for entry in entries {
        let field = |key: &str| {
            entry
                .get(key)
                .ok_or_else(|| EthError::InvalidTypedData(format!("entry is missing `{key}`")))
        };
        let ty = field("type")?
            .as_str()
            .ok_or_else(|| EthError::InvalidTypedData("`type` must be a string".into()))?;
        let name = field("name")?
            .as_str()
            .ok_or_else(|| EthError::InvalidTypedData("`name` must be a string".into()))?;

        schema.push(PackedValue::String(format!("{ty} {name}")));
        values.push(legacy_value(ty, field("value")?)?);
    }

    let schema_hash = Keccak256::digest(encode_packed(&schema)?);
    let values_hash = Keccak256::digest(encode_packed(&values)?);

    let mut hasher = Keccak256::new();
    hasher.update(schema_hash);
    hasher.update(values_hash);
    Ok(hasher.finalize().into())
}

fn legacy_value(ty: &str, value: &Value) -> Result<PackedValue, EthError> {
    if let Some(element_ty) = ty.strip_suffix("[]") {
        let items = value
            .as_array()
            .ok_or_else(|| EthError::InvalidTypedData(format!("`{ty}` expects an array")))?;
        return items
            .iter()
            .map(|item| legacy_value(element_ty, item))
            .collect::<Result<Vec<_>, _>>()
            .map(PackedValue::Array);
    }

    match ty {
        "string" => Ok(PackedValue::String(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
        "bytes" => hex_bytes(value, ty).map(PackedValue::Bytes),
        "bool" => Ok(PackedValue::Bool(is_truthy(value))),
        "address" => {
            let address = value
                .as_str()
                .ok_or_else(|| EthError::InvalidTypedData("`address` expects a string".into()))?;
            Ok(PackedValue::Address(parse_address(address)?))
        }
        _ => {
            if let Some(bits) = ty.strip_prefix("uint") {
                integer_value(ty, bits, value, false)
            } else if let Some(bits) = ty.strip_prefix("int") {
                integer_value(ty, bits, value, true)
            } else if let Some(size) = ty.strip_prefix("bytes") {
                let size: usize = size
                    .parse()
                    .ok()
                    .filter(|size| (1..=32).contains(size))
                    .ok_or_else(|| EthError::InvalidTypedData(format!("unsupported type `{ty}`")))?;
                let bytes = hex_bytes(value, ty)?;
                if bytes.len() > size {
                    return Err(EthError::InvalidTypedData(format!(
                        "`{ty}` value is {} bytes long",
                        bytes.len()
                    )));
                }
                Ok(PackedValue::FixedBytes { size, bytes })
            } else {
                Err(EthError::InvalidTypedData(format!("unsupported type `{ty}`")))
            }
        }
    }
}

fn integer_value(ty: &str, bits: &str, value: &Value, signed: bool) -> Result<PackedValue, EthError> {
    let bits: usize = if bits.is_empty() {
        256
    } else {
        bits.parse()
            .ok()
            .filter(|bits| bits % 8 == 0 && (8..=256).contains(bits))
            .ok_or_else(|| EthError::InvalidTypedData(format!("unsupported type `{ty}`")))?
    };

    let invalid = || EthError::InvalidTypedData(format!("invalid `{ty}` value {value}"));

    let (negative, magnitude) = match value {
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => (false, U256::from(u)),
            (None, Some(i)) => (true, U256::from(i.unsigned_abs())),
            _ => return Err(invalid()),
        },
        Value::String(s) => {
            let (negative, digits) = match s.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, s.as_str()),
            };
            let magnitude = match digits.strip_prefix("0x") {
                Some(hex_digits) => U256::from_str_radix(hex_digits, 16),
                None => U256::from_str_radix(digits, 10),
            }
            .map_err(|_| invalid())?;
            (negative, magnitude)
        }
        _ => return Err(invalid()),
    };

    if (negative && !signed) || magnitude.bit_len() > bits {
        return Err(invalid());
    }

    let value = if negative {
        U256::ZERO.wrapping_sub(magnitude)
    } else {
        magnitude
    };
    Ok(PackedValue::Int { bits, value })
}

fn hex_bytes(value: &Value, ty: &str) -> Result<Vec<u8>, EthError> {
    value
        .as_str()
        .and_then(|s| s.strip_prefix("0x"))
        .and_then(|hex_str| hex::decode(hex_str).ok())
        .ok_or_else(|| EthError::InvalidTypedData(format!("`{ty}` expects 0x-prefixed hex")))
}
