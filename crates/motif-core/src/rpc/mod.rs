//! Node adapter: typed access to the full node's JSON-RPC interface.
//!
//! - [`RpcTransport`]: one request, one result; the seam tests replace
//! - [`HttpTransport`]: JSON-RPC over pooled HTTP with a concurrency cap
//! - [`NodeAdapter`]: balance, transaction count and read-only contract calls

pub mod adapter;
pub mod errors;
pub mod http_client;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{NodeAdapter, DEFAULT_NAMESPACE};
pub use errors::{RpcError, RpcErrorKind};
pub use http_client::{HttpClient, HttpClientConfig};
pub use transport::{HttpTransport, RpcTransport};
