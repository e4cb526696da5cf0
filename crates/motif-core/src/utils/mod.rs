//! Utility functions for wire encoding.
//!
//! ## Hex Quantities (`quantity`)
//! - Strict decoding of node quantities into `u64` and arbitrary-precision integers
//! - Canonical encoding back to `0x`-prefixed form
//! - Word decoding for contract call results

pub mod quantity;

pub use quantity::{decode_big, decode_u64, decode_uint_word, encode_big, encode_u64, QuantityError};
