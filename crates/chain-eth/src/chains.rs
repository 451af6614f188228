use crate::error::EthError;

/// CAIP-2 namespace of EVM chains.
pub const EVM_NAMESPACE: &str = "eip155";

/// Returns true for CAIP-2 chain ids in the EVM namespace (`eip155:<number>`).
pub fn is_evm_chain(chain: &str) -> bool {
    chain
        .split_once(':')
        .is_some_and(|(namespace, reference)| {
            namespace == EVM_NAMESPACE
                && !reference.is_empty()
                && reference.chars().all(|c| c.is_ascii_digit())
        })
}

/// Parses a chain id given as 0x-prefixed hex or decimal.
pub fn parse_chain_id(chain_id: &str) -> Result<u64, EthError> {
    let parsed = match chain_id
        .strip_prefix("0x")
        .or_else(|| chain_id.strip_prefix("0X"))
    {
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
        None => chain_id.parse::<u64>(),
    };
    parsed.map_err(|_| EthError::InvalidChainId(chain_id.to_string()))
}

/// Returns the chain id as a 0x-prefixed hex string.
///
/// Hex input is returned unchanged; decimal input is converted.
pub fn normalize_chain_id(chain_id: &str) -> Result<String, EthError> {
    if chain_id.starts_with("0x") {
        parse_chain_id(chain_id)?;
        return Ok(chain_id.to_string());
    }
    let id = parse_chain_id(chain_id)?;
    Ok(format!("0x{id:x}"))
}
