//! RPC Mock Builder for Opera JSON-RPC Testing
//!
//! Wraps mockito to answer the `ftm_*` methods the bridge issues. Unless a `_times`
//! variant is used, every mock expects exactly one matching request, which is what a
//! cached read should cost.

use mockito::{Matcher, Mock, Server, ServerGuard};
use motif_core::{contracts::ContractCall, Address};
use serde_json::{json, Value};

/// Formats `value` as a single 32-byte ABI word.
#[must_use]
pub fn uint_word(value: u128) -> String {
    format!("0x{value:064x}")
}

/// Builder for creating mock Opera RPC responses.
pub struct RpcMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
    namespace: String,
}

impl RpcMockBuilder {
    /// Creates a new RPC mock builder with a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new(), namespace: "ftm".to_string() }
    }

    /// Mocks methods under `namespace` instead of `ftm`.
    #[must_use]
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    fn method_matcher(&self, method: &str) -> Matcher {
        Matcher::Regex(format!(r#""method"\s*:\s*"{}_{method}""#, self.namespace))
    }

    fn call_matcher(&self, contract: Address, call: ContractCall) -> Matcher {
        Matcher::AllOf(vec![
            self.method_matcher("call"),
            Matcher::Regex(format!(r#""to"\s*:\s*"{contract}""#)),
            Matcher::Regex(format!(r#""data"\s*:\s*"{}""#, call.encode_hex())),
        ])
    }

    fn push(&mut self, matcher: Matcher, status: usize, body: String, hits: usize) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(matcher)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create();

        self.mocks.push(mock);
        self
    }

    fn result_body(result: &Value) -> String {
        json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
    }

    fn error_body(code: i64, message: &str) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {
                "code": code,
                "message": message
            }
        })
        .to_string()
    }

    /// Mocks a `<ns>_getBalance` request for `address`.
    pub fn mock_balance(&mut self, address: Address, balance: &str) -> &mut Self {
        let matcher = Matcher::AllOf(vec![
            self.method_matcher("getBalance"),
            Matcher::Regex(format!(r#""params"\s*:\s*\["{address}""#)),
        ]);
        self.push(matcher, 200, Self::result_body(&json!(balance)), 1)
    }

    /// Mocks a `<ns>_getTransactionCount` request for `address`.
    pub fn mock_nonce(&mut self, address: Address, nonce: &str) -> &mut Self {
        let matcher = Matcher::AllOf(vec![
            self.method_matcher("getTransactionCount"),
            Matcher::Regex(format!(r#""params"\s*:\s*\["{address}""#)),
        ]);
        self.push(matcher, 200, Self::result_body(&json!(nonce)), 1)
    }

    /// Mocks a `<ns>_call` of `call` against `contract` returning `value` as one word.
    pub fn mock_contract_call(
        &mut self,
        contract: Address,
        call: ContractCall,
        value: u128,
    ) -> &mut Self {
        self.mock_contract_call_times(contract, call, value, 1)
    }

    /// Like [`mock_contract_call`](Self::mock_contract_call), expecting `hits` requests.
    pub fn mock_contract_call_times(
        &mut self,
        contract: Address,
        call: ContractCall,
        value: u128,
        hits: usize,
    ) -> &mut Self {
        let matcher = self.call_matcher(contract, call);
        self.push(matcher, 200, Self::result_body(&json!(uint_word(value))), hits)
    }

    /// Mocks a `<ns>_call` that returns no data, as a call into an account without code does.
    pub fn mock_empty_call(&mut self, contract: Address, call: ContractCall) -> &mut Self {
        let matcher = self.call_matcher(contract, call);
        self.push(matcher, 200, Self::result_body(&json!("0x")), 1)
    }

    /// Mocks a `<ns>_call` that returns `data` verbatim, whatever its length.
    pub fn mock_call_raw(&mut self, contract: Address, call: ContractCall, data: &str) -> &mut Self {
        let matcher = self.call_matcher(contract, call);
        self.push(matcher, 200, Self::result_body(&json!(data)), 1)
    }

    /// Mocks a reverted `<ns>_call`.
    pub fn mock_call_revert(&mut self, contract: Address, call: ContractCall) -> &mut Self {
        let matcher = self.call_matcher(contract, call);
        self.push(matcher, 200, Self::error_body(-32000, "execution reverted"), 1)
    }

    /// Mocks an RPC error response for every request to `method` (namespace included).
    pub fn mock_rpc_error(&mut self, method: &str, code: i64, message: &str) -> &mut Self {
        let matcher = Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#));
        self.push(matcher, 200, Self::error_body(code, message), 1)
    }

    /// Mocks a server error (500) for `hits` requests of any kind.
    pub fn mock_server_error(&mut self, hits: usize) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .with_status(500)
            .with_body("Internal Server Error")
            .expect(hits)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks a generic JSON-RPC method (namespace included) with a custom result.
    pub fn mock_method(&mut self, method: &str, result: &Value) -> &mut Self {
        let matcher = Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#));
        self.push(matcher, 200, Self::result_body(result), 1)
    }

    /// Mocks a response body that is not JSON-RPC at all.
    pub fn mock_garbage(&mut self, method: &str) -> &mut Self {
        let matcher = Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#));
        self.push(matcher, 200, "<html>not json</html>".to_string(), 1)
    }

    /// Returns a reference to the underlying mockito server for advanced mocking.
    pub fn get_server(&mut self) -> &mut mockito::ServerGuard {
        &mut self.server
    }

    /// Verifies every mock saw exactly its expected number of requests.
    #[must_use]
    pub fn verify_all_called(&self) -> bool {
        self.mocks.iter().all(mockito::Mock::matched)
    }

    /// Gets the number of mocks whose expectation was met.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.mocks.iter().filter(|m| m.matched()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rpc_mock_builder_creation() {
        let mock = RpcMockBuilder::new().await;
        assert!(!mock.url().is_empty());
        assert!(mock.verify_all_called());
    }

    #[test]
    fn test_uint_word_is_one_abi_word() {
        let word = uint_word(0x2710);
        assert_eq!(word.len(), 66);
        assert!(word.ends_with("2710"));
    }

    #[tokio::test]
    async fn test_unused_mock_is_not_verified() {
        let mut mock = RpcMockBuilder::new().await;
        mock.mock_nonce(Address::ZERO, "0x1");

        assert!(!mock.verify_all_called());
        assert_eq!(mock.call_count(), 0);
    }
}
