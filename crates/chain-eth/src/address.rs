use k256::ecdsa::VerifyingKey;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Derives an EIP-55 checksummed Ethereum address from an uncompressed secp256k1
/// public key (65 bytes, starting with 0x04).
///
/// The derivation takes the Keccak-256 hash of the 64-byte public key (without
/// the 0x04 prefix) and uses the last 20 bytes as the address.
pub fn pubkey_to_eth_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    let addr_hex = hex::encode(&hash[12..]);
    checksum_address(&format!("0x{addr_hex}"))
}

/// Address of a recovered verifying key.
pub fn verifying_key_to_address(key: &VerifyingKey) -> Result<String, EthError> {
    let encoded = key.to_encoded_point(false);
    let key_65: [u8; 65] = encoded.as_bytes().try_into().map_err(|_| {
        EthError::InvalidPublicKey("recovered key is not 65 bytes uncompressed".into())
    })?;
    pubkey_to_eth_address(&key_65)
}

/// Parses a 0x-prefixed hex address into its 20 raw bytes.
///
/// Letter case is ignored; use [`validate_address`] to enforce EIP-55.
pub fn parse_address(address: &str) -> Result<[u8; 20], EthError> {
    let hex_str = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_str.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_str.len()
        )));
    }

    let mut addr = [0u8; 20];
    hex::decode_to_slice(hex_str, &mut addr)
        .map_err(|_| EthError::InvalidAddress("address contains non-hex characters".into()))?;
    Ok(addr)
}

/// Validates an account address.
///
/// The address must be 0x + 40 hex characters. All-lowercase and
/// all-uppercase forms carry no checksum and are accepted; mixed case must
/// match the EIP-55 checksum.
pub fn validate_address(address: &str) -> Result<(), EthError> {
    parse_address(address)?;

    let hex_part = &address[2..];
    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(());
    }

    let checksummed = checksum_address(address)?;
    if &checksummed[2..] != hex_part {
        return Err(EthError::InvalidAddress(format!(
            "checksum mismatch, expected {checksummed}"
        )));
    }
    Ok(())
}

/// Case-insensitive address equality.
pub fn addresses_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Applies EIP-55 mixed-case checksum encoding to an Ethereum address.
///
/// Input case is ignored. Returns the checksummed version.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let raw = parse_address(address)?;
    let hex_part = hex::encode(raw);

    // EIP-55: hash the lowercase hex address (without 0x).
    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (i, c) in hex_part.chars().enumerate() {
        // High nibble for even positions, low nibble for odd ones.
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    Ok(checksummed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    #[test]
    fn eip55_checksum_known_addresses() {
        // Test vectors from EIP-55.
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];

        for expected in &cases {
            let lower = format!("0x{}", expected[2..].to_lowercase());
            let result = checksum_address(&lower).unwrap();
            assert_eq!(&result, expected, "checksum mismatch for {}", expected);
        }
    }

    #[test]
    fn checksum_keyring_test_address() {
        let result = checksum_address("0x6f83e67551c5eb8e3f684d2d61f46bf739acb5dc").unwrap();
        assert_eq!(result, "0x6f83e67551C5eB8E3f684D2D61F46BF739ACB5dC");
    }

    #[test]
    fn validate_checksummed_and_single_case_addresses() {
        assert!(validate_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_ok());
        assert!(validate_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_ok());
        assert!(validate_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").is_ok());
    }

    #[test]
    fn validate_bad_checksum_errors() {
        let addr = "0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(validate_address(addr).is_err());
    }

    #[test]
    fn validate_malformed_addresses_error() {
        assert!(validate_address("0x5aAeb6053F").is_err());
        assert!(validate_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
        assert!(validate_address("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn parse_address_ignores_case() {
        let lower = parse_address("0x000000000000000000000000000000000000dead").unwrap();
        let mixed = parse_address("0x000000000000000000000000000000000000dEaD").unwrap();
        assert_eq!(lower, mixed);
        assert_eq!(lower[18..], [0xde, 0xad]);
    }

    #[test]
    fn addresses_match_is_case_insensitive() {
        assert!(addresses_match(
            "0x6f83e67551C5eB8E3f684D2D61F46BF739ACB5dC",
            "0x6f83e67551c5eb8e3f684d2d61f46bf739acb5dc"
        ));
        assert!(!addresses_match(
            "0x6f83e67551C5eB8E3f684D2D61F46BF739ACB5dC",
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        ));
    }

    #[test]
    fn verifying_key_to_address_known_vector() {
        // Private key 0x00..01 maps to 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf.
        let mut privkey = [0u8; 32];
        privkey[31] = 1;

        let signing_key = SigningKey::from_bytes((&privkey).into()).expect("valid private key");
        let address = verifying_key_to_address(signing_key.verifying_key()).unwrap();
        assert_eq!(address, "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
    }

    #[test]
    fn invalid_uncompressed_prefix_errors() {
        let mut key = [0u8; 65];
        key[0] = 0x03;
        assert!(pubkey_to_eth_address(&key).is_err());
    }
}
