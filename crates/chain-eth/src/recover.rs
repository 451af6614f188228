use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::address::verifying_key_to_address;
use crate::error::EthError;

/// A 65-byte recoverable secp256k1 signature (`r || s || v`).
#[derive(Debug, Clone)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// Parses a hex signature, with or without the 0x prefix.
    pub fn from_hex(signature: &str) -> Result<Self, EthError> {
        let hex_str = signature
            .strip_prefix("0x")
            .or_else(|| signature.strip_prefix("0X"))
            .unwrap_or(signature);
        let bytes = hex::decode(hex_str)
            .map_err(|e| EthError::InvalidSignature(format!("invalid hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Parses `r[32] || s[32] || v[1]`, where v is 0/1 or 27/28.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EthError> {
        if bytes.len() != 65 {
            return Err(EthError::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }

        let v = bytes[64];
        let y_odd = match v {
            0 | 27 => false,
            1 | 28 => true,
            other => {
                return Err(EthError::InvalidSignature(format!(
                    "unsupported recovery byte {other}"
                )))
            }
        };

        let signature = Signature::from_slice(&bytes[..64])
            .map_err(|e| EthError::InvalidSignature(e.to_string()))?;
        Ok(Self::normalized(signature, y_odd))
    }

    /// Builds a signature from the scalar fields embedded in a signed transaction.
    pub fn from_parts(r: [u8; 32], s: [u8; 32], y_odd: bool) -> Result<Self, EthError> {
        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&r);
        rs[32..].copy_from_slice(&s);
        let signature =
            Signature::from_slice(&rs).map_err(|e| EthError::InvalidSignature(e.to_string()))?;
        Ok(Self::normalized(signature, y_odd))
    }

    // k256 only recovers low-s signatures. Negating s mirrors R, which flips
    // the y parity.
    fn normalized(signature: Signature, y_odd: bool) -> Self {
        match signature.normalize_s() {
            Some(low_s) => Self {
                signature: low_s,
                recovery_id: RecoveryId::new(!y_odd, false),
            },
            None => Self {
                signature,
                recovery_id: RecoveryId::new(y_odd, false),
            },
        }
    }

    /// Recovers the signing public key from a 32-byte prehash.
    pub fn recover_key(&self, prehash: &[u8; 32]) -> Result<VerifyingKey, EthError> {
        VerifyingKey::recover_from_prehash(prehash, &self.signature, self.recovery_id)
            .map_err(|e| EthError::InvalidSignature(format!("recovery failed: {e}")))
    }

    /// Recovers the checksummed signer address from a 32-byte prehash.
    pub fn recover_address(&self, prehash: &[u8; 32]) -> Result<String, EthError> {
        let key = self.recover_key(prehash)?;
        verifying_key_to_address(&key)
    }
}
