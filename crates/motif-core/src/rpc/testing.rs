//! Scripted in-process transport for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::rpc::{RpcError, RpcTransport};

type Handler = dyn Fn(&str, &Value) -> Result<Value, RpcError> + Send + Sync;

/// Transport that answers from a closure and counts calls per method.
pub struct ScriptedTransport {
    handler: Arc<Handler>,
    latency: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
    log: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, RpcError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            latency: None,
            calls: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Delays every answer, so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        *self.calls.lock().entry(method.to_string()).or_default() += 1;
        self.log.lock().push((method.to_string(), params.clone()));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        (self.handler)(method, &params)
    }
}

/// Pads a hex number to a 32-byte call result word.
pub fn word(hex_digits: &str) -> Value {
    Value::String(format!("0x{hex_digits:0>64}"))
}

/// Pulls the `to` and `data` members out of an `eth_call` style parameter list.
pub fn call_target(params: &Value) -> (String, String) {
    let call = &params[0];
    (
        call["to"].as_str().unwrap_or_default().to_string(),
        call["data"].as_str().unwrap_or_default().to_string(),
    )
}
