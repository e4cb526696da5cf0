//! Hex quantity codec for node results.
//!
//! Quantities follow the node's encoding rules: a mandatory `0x` prefix, at least one
//! digit, and no leading zeros except for `0x0` itself. Contract call results are a
//! different shape (raw 32-byte words) and go through [`decode_uint_word`].

use num_bigint::BigUint;
use num_traits::Zero;
use thiserror::Error;

/// Maximum number of hex digits accepted for a big quantity (256 bits).
const MAX_BIG_DIGITS: usize = 64;

/// Maximum number of hex digits accepted for a `u64` quantity.
const MAX_U64_DIGITS: usize = 16;

/// Size of one ABI word in a contract call result.
const WORD_BYTES: usize = 32;

/// Error types for hex quantity parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("missing 0x prefix: {0}")]
    MissingPrefix(String),
    #[error("empty hex quantity")]
    Empty,
    #[error("hex quantity has leading zero digits: {0}")]
    LeadingZero(String),
    #[error("invalid hex digit in {0}")]
    InvalidDigit(String),
    #[error("hex quantity exceeds {bits} bits: {value}")]
    Overflow { bits: u32, value: String },
    #[error("call result is {0} bytes, not a whole number of 32-byte words")]
    WordLength(usize),
}

fn strip_quantity(input: &str) -> Result<&str, QuantityError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or_else(|| QuantityError::MissingPrefix(input.to_string()))?;

    if digits.is_empty() {
        return Err(QuantityError::Empty);
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(QuantityError::LeadingZero(input.to_string()));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(QuantityError::InvalidDigit(input.to_string()));
    }
    Ok(digits)
}

/// Decodes a hex quantity of up to 256 bits.
///
/// # Errors
///
/// Returns [`QuantityError`] when the input violates the quantity encoding rules.
pub fn decode_big(input: &str) -> Result<BigUint, QuantityError> {
    let digits = strip_quantity(input)?;
    if digits.len() > MAX_BIG_DIGITS {
        return Err(QuantityError::Overflow { bits: 256, value: input.to_string() });
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| QuantityError::InvalidDigit(input.to_string()))
}

/// Decodes a hex quantity that must fit in a `u64`.
///
/// # Errors
///
/// Returns [`QuantityError`] when the input is malformed or wider than 64 bits.
pub fn decode_u64(input: &str) -> Result<u64, QuantityError> {
    let digits = strip_quantity(input)?;
    if digits.len() > MAX_U64_DIGITS {
        return Err(QuantityError::Overflow { bits: 64, value: input.to_string() });
    }
    u64::from_str_radix(digits, 16).map_err(|_| QuantityError::InvalidDigit(input.to_string()))
}

/// Encodes a `u64` as a hex quantity. Zero is `0x0`.
#[must_use]
pub fn encode_u64(value: u64) -> String {
    format!("0x{value:x}")
}

/// Encodes an arbitrary-precision integer as a hex quantity. Zero is `0x0`.
#[must_use]
pub fn encode_big(value: &BigUint) -> String {
    if value.is_zero() {
        return "0x0".to_string();
    }
    format!("0x{}", value.to_str_radix(16))
}

/// Decodes the first 32-byte word of an `eth_call` style result as an unsigned integer.
///
/// Unlike quantities, call results are zero-padded byte strings. An empty result (`0x`)
/// is what a node returns for a call into an address with no code, and is rejected.
///
/// # Errors
///
/// Returns [`QuantityError`] for a missing prefix, empty payload or bad digit, and
/// [`QuantityError::WordLength`] when the payload is not whole 32-byte words.
pub fn decode_uint_word(input: &str) -> Result<BigUint, QuantityError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or_else(|| QuantityError::MissingPrefix(input.to_string()))?;

    if digits.is_empty() {
        return Err(QuantityError::Empty);
    }

    let bytes = hex::decode(digits).map_err(|_| QuantityError::InvalidDigit(input.to_string()))?;
    if bytes.len() % WORD_BYTES != 0 {
        return Err(QuantityError::WordLength(bytes.len()));
    }
    Ok(BigUint::from_bytes_be(&bytes[..WORD_BYTES]))
}
