use num_bigint::BigUint;
use serde_json::{json, Value};
use std::{fmt, sync::Arc, time::Instant};

use crate::{
    contracts::ContractCall,
    metrics,
    rpc::{RpcError, RpcTransport},
    types::{Address, BlockTag},
    utils::quantity,
};

/// Default method namespace of the node (`ftm_getBalance`, `ftm_call`, ...).
pub const DEFAULT_NAMESPACE: &str = "ftm";

/// Typed view over the node's state queries.
///
/// Every method issues exactly one request and never retries. Failures are logged here
/// with the queried address so the facade can stay quiet about them.
#[derive(Clone)]
pub struct NodeAdapter {
    transport: Arc<dyn RpcTransport>,
    namespace: Arc<str>,
}

impl fmt::Debug for NodeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeAdapter").field("namespace", &self.namespace).finish_non_exhaustive()
    }
}

impl NodeAdapter {
    #[must_use]
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self::with_namespace(transport, DEFAULT_NAMESPACE)
    }

    #[must_use]
    pub fn with_namespace(transport: Arc<dyn RpcTransport>, namespace: &str) -> Self {
        Self { transport, namespace: Arc::from(namespace) }
    }

    fn method(&self, name: &str) -> String {
        format!("{}_{name}", self.namespace)
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let start = Instant::now();
        let result = self.transport.call(method, params).await;
        let elapsed_ms = start.elapsed().as_millis();

        match &result {
            Ok(_) => {
                tracing::trace!(method = method, elapsed_ms = elapsed_ms, "node request completed");
                metrics::record_rpc_call(method, None);
            }
            Err(e) => {
                tracing::debug!(
                    method = method,
                    elapsed_ms = elapsed_ms,
                    error_kind = e.kind().as_str(),
                    error = %e,
                    "node request failed"
                );
                metrics::record_rpc_call(method, Some(e.kind()));
            }
        }
        result
    }

    fn expect_str(method: &str, value: &Value) -> Result<String, RpcError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| RpcError::Decode(format!("{method} result is not a string: {value}")))
    }

    /// Current native balance of `address` at `block`.
    ///
    /// # Errors
    ///
    /// Transport, remote and decode failures of the single node request.
    pub async fn balance(&self, address: &Address, block: BlockTag) -> Result<BigUint, RpcError> {
        let method = self.method("getBalance");
        let result = self
            .request(&method, json!([address.to_string(), block.to_param()]))
            .await
            .and_then(|value| {
                let raw = Self::expect_str(&method, &value)?;
                Ok(quantity::decode_big(&raw)?)
            });

        if let Err(e) = &result {
            tracing::error!(address = %address, error = %e, "can not get account balance");
        }
        result
    }

    /// Number of transactions sent from `address` as of `block`.
    ///
    /// # Errors
    ///
    /// Transport, remote and decode failures of the single node request.
    pub async fn transaction_count(
        &self,
        address: &Address,
        block: BlockTag,
    ) -> Result<u64, RpcError> {
        let method = self.method("getTransactionCount");
        let result = self
            .request(&method, json!([address.to_string(), block.to_param()]))
            .await
            .and_then(|value| {
                let raw = Self::expect_str(&method, &value)?;
                Ok(quantity::decode_u64(&raw)?)
            });

        if let Err(e) = &result {
            tracing::error!(address = %address, error = %e, "can not get account nonce");
        }
        result
    }

    /// Executes a read-only call against `contract` and decodes the first result word.
    ///
    /// An empty return (`0x`), which is what a call into an address without code yields,
    /// is a decode error.
    ///
    /// # Errors
    ///
    /// Transport, remote and decode failures of the single node request.
    pub async fn call_uint(
        &self,
        contract: &Address,
        call: ContractCall,
        block: BlockTag,
    ) -> Result<BigUint, RpcError> {
        let method = self.method("call");
        let params = json!([
            { "to": contract.to_string(), "data": call.encode_hex() },
            block.to_param()
        ]);

        let result = self.request(&method, params).await.and_then(|value| {
            let raw = Self::expect_str(&method, &value)?;
            Ok(quantity::decode_uint_word(&raw)?)
        });

        if let Err(e) = &result {
            tracing::debug!(
                contract = %contract,
                function = call.signature(),
                error = %e,
                "contract call failed"
            );
        }
        result
    }
}
