//! Ether amount conversions and JSON-RPC quantity encoding

use alloy_primitives::utils::{format_ether, parse_ether};
use alloy_primitives::U256;

use crate::LedgerError;

/// Gas limit of a plain value transfer (`0x5208`)
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Parse a human ether amount ("0.01") into wei
///
/// Rejects empty, negative and zero amounts.
pub fn parse_amount(amount: &str) -> Result<U256, LedgerError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid_input("amount is empty"));
    }
    if trimmed.starts_with('-') {
        return Err(LedgerError::invalid_input(format!(
            "amount must be positive: {}",
            trimmed
        )));
    }

    let wei = parse_ether(trimmed)
        .map_err(|e| LedgerError::invalid_input(format!("invalid amount '{}': {}", trimmed, e)))?;

    if wei.is_zero() {
        return Err(LedgerError::invalid_input("amount must be greater than zero"));
    }
    Ok(wei)
}

/// Format wei as ether, trimming trailing zeros ("0.01", "1.0")
pub fn format_amount(wei: U256) -> String {
    let formatted = format_ether(wei);
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => format!("{}.0", formatted),
    }
}

/// Parse a JSON-RPC quantity, accepting `0x` hex or plain decimal
pub fn parse_quantity(value: &str) -> Result<U256, LedgerError> {
    let result = match value.strip_prefix("0x") {
        Some("") => Ok(U256::ZERO),
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(value, 10),
    };
    result.map_err(|e| LedgerError::malformed(format!("invalid quantity '{}': {}", value, e)))
}

/// Parse a quantity that must fit in a `u64` (chain id, nonce, gas)
pub fn parse_u64_quantity(value: &str) -> Result<u64, LedgerError> {
    let quantity = parse_quantity(value)?;
    u64::try_from(quantity)
        .map_err(|_| LedgerError::malformed(format!("quantity out of range: {}", value)))
}

/// Encode a quantity as a `0x` hex string
pub fn to_quantity(value: U256) -> String {
    format!("{:#x}", value)
}
