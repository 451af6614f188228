use alloy_consensus::{Signed, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Signature, TxKind, B256, U256};
use serde_json::{json, Map, Value};

use crate::error::EthError;
use crate::recover::RecoverableSignature;

const LEGACY_TX_TYPE: u8 = 0x00;
const EIP2930_TX_TYPE: u8 = 0x01;
const EIP1559_TX_TYPE: u8 = 0x02;

/// Hardfork profile used to reconstruct a signed transaction.
///
/// `Istanbul` predates typed transactions and only accepts legacy ones;
/// `London` adds EIP-2930 access lists and the EIP-1559 fee market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hardfork {
    Istanbul,
    London,
}

impl Hardfork {
    /// Chooses the profile from whether the request carried fee-market fields.
    pub fn for_fee_market(has_fee_market_fields: bool) -> Self {
        if has_fee_market_fields {
            Hardfork::London
        } else {
            Hardfork::Istanbul
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Hardfork::Istanbul => "istanbul",
            Hardfork::London => "london",
        }
    }

    fn supports(&self, tx_type: u8) -> bool {
        match self {
            Hardfork::Istanbul => tx_type == LEGACY_TX_TYPE,
            Hardfork::London => matches!(
                tx_type,
                LEGACY_TX_TYPE | EIP2930_TX_TYPE | EIP1559_TX_TYPE
            ),
        }
    }
}

/// A signed transaction reconstructed from its EIP-2718 serialization.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    envelope: TxEnvelope,
    raw: Vec<u8>,
    tx_type: u8,
    hardfork: Hardfork,
}

impl SignedTransaction {
    /// Decodes a 0x-prefixed hex serialization.
    pub fn from_hex(raw_hex: &str, chain_id: u64, hardfork: Hardfork) -> Result<Self, EthError> {
        let hex_str = raw_hex.strip_prefix("0x").unwrap_or(raw_hex);
        let raw = hex::decode(hex_str)
            .map_err(|e| EthError::InvalidTransaction(format!("invalid hex: {e}")))?;
        Self::decode(&raw, chain_id, hardfork)
    }

    /// Decodes raw bytes, checking the type against the hardfork profile and
    /// the embedded chain id (if any) against `chain_id`.
    pub fn decode(raw: &[u8], chain_id: u64, hardfork: Hardfork) -> Result<Self, EthError> {
        let first = *raw
            .first()
            .ok_or_else(|| EthError::InvalidTransaction("empty transaction".into()))?;

        // Legacy transactions start with an RLP list header (>= 0xc0).
        let tx_type = if first >= 0xc0 { LEGACY_TX_TYPE } else { first };
        if !hardfork.supports(tx_type) {
            return Err(EthError::UnsupportedTransactionType {
                tx_type,
                hardfork: hardfork.name(),
            });
        }

        let mut buf = raw;
        let envelope = TxEnvelope::decode_2718(&mut buf)
            .map_err(|e| EthError::InvalidTransaction(e.to_string()))?;
        if !buf.is_empty() {
            return Err(EthError::InvalidTransaction(format!(
                "{} trailing bytes after transaction",
                buf.len()
            )));
        }

        let signed = Self {
            envelope,
            raw: raw.to_vec(),
            tx_type,
            hardfork,
        };

        if let Some(actual) = signed.chain_id() {
            if actual != chain_id {
                return Err(EthError::ChainIdMismatch {
                    expected: chain_id,
                    actual,
                });
            }
        }

        Ok(signed)
    }

    pub fn tx_type(&self) -> u8 {
        self.tx_type
    }

    pub fn hardfork(&self) -> Hardfork {
        self.hardfork
    }

    pub fn envelope(&self) -> &TxEnvelope {
        &self.envelope
    }

    /// Serialized signed transaction bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    /// Chain id carried by the transaction. Pre-EIP-155 legacy transactions have none.
    pub fn chain_id(&self) -> Option<u64> {
        match &self.envelope {
            TxEnvelope::Legacy(signed) => signed.tx().chain_id,
            TxEnvelope::Eip2930(signed) => Some(signed.tx().chain_id),
            TxEnvelope::Eip1559(signed) => Some(signed.tx().chain_id),
            _ => None,
        }
    }

    /// Recovers the sender address from the embedded signature.
    ///
    /// The public key is recovered over the transaction's signing hash; the
    /// address is the last 20 bytes of its Keccak-256 hash.
    pub fn recover_sender(&self) -> Result<String, EthError> {
        let (hash, signature) = match &self.envelope {
            TxEnvelope::Legacy(signed) => signing_parts(signed),
            TxEnvelope::Eip2930(signed) => signing_parts(signed),
            TxEnvelope::Eip1559(signed) => signing_parts(signed),
            _ => return Err(self.unsupported()),
        };

        let recoverable = RecoverableSignature::from_parts(
            signature.r().to_be_bytes::<32>(),
            signature.s().to_be_bytes::<32>(),
            signature.v(),
        )?;
        recoverable.recover_address(&hash.0)
    }

    /// JSON view of the signed transaction: hex quantities, `type` as a number,
    /// absent fields omitted.
    pub fn to_json(&self) -> Result<Value, EthError> {
        let mut out = Map::new();
        out.insert("type".into(), json!(self.tx_type));

        let (kind, value, input, signature) = match &self.envelope {
            TxEnvelope::Legacy(signed) => {
                let tx = signed.tx();
                out.insert("nonce".into(), quantity(tx.nonce));
                out.insert("gasPrice".into(), quantity(tx.gas_price));
                out.insert("gasLimit".into(), quantity(tx.gas_limit));
                if let Some(chain_id) = tx.chain_id {
                    out.insert("chainId".into(), quantity(chain_id));
                }
                (&tx.to, tx.value, &tx.input[..], signed.signature())
            }
            TxEnvelope::Eip2930(signed) => {
                let tx = signed.tx();
                out.insert("nonce".into(), quantity(tx.nonce));
                out.insert("gasPrice".into(), quantity(tx.gas_price));
                out.insert("gasLimit".into(), quantity(tx.gas_limit));
                out.insert("chainId".into(), quantity(tx.chain_id));
                out.insert("accessList".into(), access_list_json(&tx.access_list));
                (&tx.to, tx.value, &tx.input[..], signed.signature())
            }
            TxEnvelope::Eip1559(signed) => {
                let tx = signed.tx();
                out.insert("nonce".into(), quantity(tx.nonce));
                out.insert(
                    "maxPriorityFeePerGas".into(),
                    quantity(tx.max_priority_fee_per_gas),
                );
                out.insert("maxFeePerGas".into(), quantity(tx.max_fee_per_gas));
                out.insert("gasLimit".into(), quantity(tx.gas_limit));
                out.insert("chainId".into(), quantity(tx.chain_id));
                out.insert("accessList".into(), access_list_json(&tx.access_list));
                (&tx.to, tx.value, &tx.input[..], signed.signature())
            }
            _ => return Err(self.unsupported()),
        };

        if let TxKind::Call(to) = kind {
            out.insert("to".into(), json!(format!("0x{}", hex::encode(to.as_slice()))));
        }
        out.insert("value".into(), json!(u256_quantity(value)));
        out.insert("data".into(), json!(format!("0x{}", hex::encode(input))));
        out.insert("v".into(), quantity(self.v_value(signature)));
        out.insert("r".into(), json!(u256_quantity(signature.r())));
        out.insert("s".into(), json!(u256_quantity(signature.s())));

        Ok(Value::Object(out))
    }

    // Legacy v folds the chain id in (EIP-155) or is 27/28; typed
    // transactions carry the bare y parity.
    fn v_value(&self, signature: &Signature) -> u128 {
        let parity = u128::from(signature.v());
        match &self.envelope {
            TxEnvelope::Legacy(signed) => match signed.tx().chain_id {
                Some(chain_id) => u128::from(chain_id) * 2 + 35 + parity,
                None => 27 + parity,
            },
            _ => parity,
        }
    }

    fn unsupported(&self) -> EthError {
        EthError::UnsupportedTransactionType {
            tx_type: self.tx_type,
            hardfork: self.hardfork.name(),
        }
    }
}

fn signing_parts<T>(signed: &Signed<T>) -> (B256, &Signature)
where
    T: alloy_consensus::SignableTransaction<Signature>,
{
    (signed.signature_hash(), signed.signature())
}

fn quantity<N: Into<u128>>(n: N) -> Value {
    json!(format!("0x{:x}", n.into()))
}

fn u256_quantity(n: U256) -> String {
    format!("0x{n:x}")
}

fn access_list_json(access_list: &AccessList) -> Value {
    let items: Vec<Value> = access_list
        .0
        .iter()
        .map(|item| {
            let keys: Vec<String> = item
                .storage_keys
                .iter()
                .map(|key| format!("0x{}", hex::encode(key.as_slice())))
                .collect();
            json!({
                "address": format!("0x{}", hex::encode(item.address.as_slice())),
                "storageKeys": keys,
            })
        })
        .collect();
    Value::Array(items)
}
