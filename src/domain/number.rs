//! Integer parsing for argument, value and gas fields

use alloy_primitives::{I256, U256};

/// Parse a decimal or 0x-prefixed hex unsigned integer
///
/// Only plain digits are accepted; separators such as `_` and a bare `0x` are rejected.
pub fn parse_uint(text: &str) -> Result<U256, String> {
    let text = text.trim();
    let not_uint = || format!("'{text}' is not an unsigned integer");
    match strip_hex_prefix(text) {
        Some(hex) if is_digits(hex, 16) => U256::from_str_radix(hex, 16).map_err(|_| not_uint()),
        Some(_) => Err(not_uint()),
        None => {
            let digits = text.strip_prefix('+').unwrap_or(text);
            if !is_digits(digits, 10) {
                return Err(not_uint());
            }
            U256::from_str_radix(digits, 10).map_err(|_| not_uint())
        }
    }
}

/// Parse a signed integer: optional `+`/`-`, then decimal digits or a 0x-prefixed hex magnitude
pub fn parse_int(text: &str) -> Result<I256, String> {
    let text = text.trim();
    let not_int = || format!("'{text}' is not an integer");
    let magnitude = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    let parsed = match strip_hex_prefix(magnitude) {
        Some(hex) if is_digits(hex, 16) => I256::from_hex_str(text),
        Some(_) => return Err(not_int()),
        None if is_digits(magnitude, 10) => I256::from_dec_str(text),
        None => return Err(not_int()),
    };
    parsed.map_err(|_| not_int())
}

fn strip_hex_prefix(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

fn is_digits(text: &str, radix: u32) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_digit(radix))
}
