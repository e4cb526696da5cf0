use async_trait::async_trait;
use serde_json::Value;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use crate::{
    rpc::{
        http_client::{HttpClient, HttpClientConfig},
        RpcError,
    },
    types::{JsonRpcRequest, JsonRpcResponse},
};

/// A single JSON-RPC round-trip to the node.
///
/// Implementations return the `result` member of a successful response. A JSON-RPC
/// error object becomes [`RpcError::Remote`]; a response with neither member becomes
/// [`RpcError::Decode`].
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Sends `method` with positional `params` and returns the raw result value.
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

/// JSON-RPC over HTTP POST.
pub struct HttpTransport {
    client: HttpClient,
    url: String,
    timeout: Duration,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        concurrent_limit: usize,
    ) -> Result<Self, RpcError> {
        let client = HttpClient::with_config(HttpClientConfig {
            concurrent_limit,
            ..HttpClientConfig::default()
        })?;
        Ok(Self { client, url: url.into(), timeout, next_id: AtomicU64::new(1) })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, id);
        let body = serde_json::to_vec(&request)
            .map_err(|e| RpcError::InvalidRequest(format!("failed to serialize request: {e}")))?;

        let raw = self.client.send_request(&self.url, bytes::Bytes::from(body), self.timeout).await?;

        let response: JsonRpcResponse = serde_json::from_slice(&raw)
            .map_err(|e| RpcError::Decode(format!("malformed JSON-RPC response: {e}")))?;

        if let Some(error) = response.error {
            return Err(RpcError::Remote { code: error.code, message: error.message });
        }

        match response.result {
            Some(Value::Null) | None => {
                Err(RpcError::Decode(format!("{method} response carried no result")))
            }
            Some(result) => Ok(result),
        }
    }
}
