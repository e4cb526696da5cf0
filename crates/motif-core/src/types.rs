//! Core type definitions shared by the adapter, cache and repository layers.
//!
//! # Type Categories
//!
//! ## JSON-RPC Protocol Types
//! - [`JsonRpcRequest`], [`JsonRpcResponse`], [`JsonRpcError`]: Protocol conformance
//!
//! ## Chain Primitives
//! - [`Address`]: 20-byte account or contract identifier
//! - [`HexBig`]: arbitrary-precision integer carried as a hex quantity on the wire
//! - [`BlockTag`]: block parameter attached to state queries

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{borrow::Cow, fmt, str::FromStr, sync::Arc};

use crate::utils::quantity;

/// JSON-RPC protocol version constant to avoid repeated allocations.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for JSON-RPC version - zero allocation for static usage.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

/// JSON-RPC 2.0 request structure.
///
/// `params` is always a positional array for the node methods this crate issues.
///
/// # Example
///
/// ```
/// use motif_core::types::JsonRpcRequest;
/// use serde_json::json;
///
/// let request = JsonRpcRequest::new("ftm_getBalance", json!(["0x00", "latest"]), 1);
///
/// assert_eq!(request.method, "ftm_getBalance");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub method: String,
    pub params: serde_json::Value,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request with zero allocation for the version string.
    #[must_use]
    pub fn new(method: impl Into<String>, params: serde_json::Value, id: u64) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, method: method.into(), params, id }
    }
}

/// JSON-RPC 2.0 response structure.
///
/// A response contains either a `result` or an `error`, never both. A response carrying
/// neither is treated as malformed by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: Arc<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Creates a successful JSON-RPC response.
    #[must_use]
    pub fn success(result: serde_json::Value, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_COW,
            result: Some(result),
            error: None,
            id: Arc::new(serde_json::Value::from(id)),
        }
    }

    /// Creates an error JSON-RPC response.
    #[must_use]
    pub fn error(code: i32, message: impl Into<String>, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_COW,
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
            id: Arc::new(serde_json::Value::from(id)),
        }
    }
}

/// JSON-RPC 2.0 error object.
///
/// - `-32700`: Parse error (invalid JSON)
/// - `-32600`: Invalid request (malformed JSON-RPC)
/// - `-32601`: Method not found
/// - `-32602`: Invalid params
/// - `-32603`: Internal error
/// - `-32000` to `-32099`: Server-defined errors, including execution reverts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Error type for address parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("missing 0x prefix")]
    MissingPrefix,
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("invalid length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// 20-byte account or contract address.
///
/// Parsing is case-insensitive (checksummed and lower-case forms are equal); equality is
/// byte-wise. The canonical textual form is lower-case with a `0x` prefix.
///
/// # Example
/// ```
/// use motif_core::types::Address;
///
/// let upper: Address = "0xA1EA42f737bb2E09b0AE4DE001eE06e3BC484fE5".parse().unwrap();
/// let lower: Address = "0xa1ea42f737bb2e09b0ae4de001ee06e3bc484fe5".parse().unwrap();
/// assert_eq!(upper, lower);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the address left-padded to a 32-byte ABI word.
    #[must_use]
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let hex_str = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .ok_or(AddressParseError::MissingPrefix)?;

        let bytes = hex::decode(hex_str).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;

        if bytes.len() != 20 {
            return Err(AddressParseError::InvalidLength(bytes.len()));
        }

        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Address(arr))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::try_from(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}

/// Arbitrary-precision unsigned integer transported as a hex quantity.
///
/// The decimal scale of the value is implied by the field it was read from (e.g. token
/// decimals or the DeFi digits correction); this type never truncates to a machine word.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HexBig(pub BigUint);

impl HexBig {
    #[must_use]
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

impl From<BigUint> for HexBig {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for HexBig {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for HexBig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quantity::encode_big(&self.0))
    }
}

impl fmt::Debug for HexBig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexBig({})", self.0)
    }
}

impl Serialize for HexBig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&quantity::encode_big(&self.0))
    }
}

impl<'de> Deserialize<'de> for HexBig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        quantity::decode_big(&s).map(HexBig).map_err(serde::de::Error::custom)
    }
}

/// Block parameter for state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
    /// The most recent block in the canonical chain
    Latest,
    /// The earliest/genesis block
    Earliest,
    /// A block in the pending state
    Pending,
    /// The most recent safe head block
    Safe,
    /// The most recent finalized block
    Finalized,
    /// Specific block number
    Number(u64),
}

impl BlockTag {
    /// Wire form of the tag as accepted by the node.
    #[must_use]
    pub fn to_param(&self) -> Cow<'static, str> {
        match self {
            Self::Latest => Cow::Borrowed("latest"),
            Self::Earliest => Cow::Borrowed("earliest"),
            Self::Pending => Cow::Borrowed("pending"),
            Self::Safe => Cow::Borrowed("safe"),
            Self::Finalized => Cow::Borrowed("finalized"),
            Self::Number(n) => Cow::Owned(quantity::encode_u64(*n)),
        }
    }
}
