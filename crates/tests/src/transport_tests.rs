//! Integration tests for the HTTP transport and node adapter against a mocked node.
//!
//! These exercise the real `reqwest` path: request framing, error-object mapping, HTTP
//! status handling and result decoding.

use motif_core::{
    contracts::ContractCall,
    rpc::{HttpTransport, NodeAdapter, RpcError, RpcErrorKind, RpcTransport},
    types::BlockTag,
};
use num_bigint::BigUint;
use serde_json::json;
use std::{sync::Arc, time::Duration};

use crate::mock_infrastructure::{addr, RpcMockBuilder, OWNER, TOKEN};

fn transport(url: &str) -> HttpTransport {
    HttpTransport::new(url, Duration::from_secs(5), 10).unwrap()
}

#[tokio::test]
async fn test_transport_returns_result_value() {
    let mut node = RpcMockBuilder::new().await;
    node.mock_method("ftm_getBalance", &json!("0x64"));

    let result =
        transport(&node.url()).call("ftm_getBalance", json!([OWNER, "latest"])).await.unwrap();

    assert_eq!(result, json!("0x64"));
    assert!(node.verify_all_called());
}

#[tokio::test]
async fn test_transport_maps_error_object_to_remote() {
    let mut node = RpcMockBuilder::new().await;
    node.mock_rpc_error("ftm_call", -32000, "execution reverted");

    let err = transport(&node.url()).call("ftm_call", json!([])).await.unwrap_err();

    assert_eq!(err, RpcError::Remote { code: -32000, message: "execution reverted".to_string() });
    assert_eq!(err.kind(), RpcErrorKind::Remote);
}

#[tokio::test]
async fn test_transport_http_error_is_transport_kind() {
    let mut node = RpcMockBuilder::new().await;
    node.mock_server_error(1);

    let err = transport(&node.url()).call("ftm_getBalance", json!([])).await.unwrap_err();

    assert!(matches!(err, RpcError::Http(500, _)), "unexpected error: {err:?}");
    assert_eq!(err.kind(), RpcErrorKind::Transport);
    assert!(node.verify_all_called(), "transport must not retry");
}

#[tokio::test]
async fn test_transport_rejects_non_json_body() {
    let mut node = RpcMockBuilder::new().await;
    node.mock_garbage("ftm_getBalance");

    let err = transport(&node.url()).call("ftm_getBalance", json!([])).await.unwrap_err();

    assert_eq!(err.kind(), RpcErrorKind::Decode);
}

#[tokio::test]
async fn test_transport_null_result_is_decode_error() {
    let mut node = RpcMockBuilder::new().await;
    node.mock_method("ftm_getTransactionCount", &json!(null));

    let err = transport(&node.url()).call("ftm_getTransactionCount", json!([])).await.unwrap_err();

    assert!(matches!(err, RpcError::Decode(_)));
}

#[tokio::test]
async fn test_transport_unreachable_node_is_transport_kind() {
    let err = transport("http://127.0.0.1:1").call("ftm_getBalance", json!([])).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_adapter_decodes_balance_and_nonce() {
    let owner = addr(OWNER);
    let mut node = RpcMockBuilder::new().await;
    node.mock_balance(owner, "0x1b1ae4d6e2ef500000").mock_nonce(owner, "0x2a");

    let adapter = NodeAdapter::new(Arc::new(transport(&node.url())));

    let balance = adapter.balance(&owner, BlockTag::Latest).await.unwrap();
    let nonce = adapter.transaction_count(&owner, BlockTag::Latest).await.unwrap();

    assert_eq!(balance, BigUint::from(500_000_000_000_000_000_000u128));
    assert_eq!(nonce, 42);
    assert!(node.verify_all_called());
}

#[tokio::test]
async fn test_adapter_rejects_malformed_quantity() {
    let owner = addr(OWNER);
    let mut node = RpcMockBuilder::new().await;
    node.mock_nonce(owner, "0x0042");

    let adapter = NodeAdapter::new(Arc::new(transport(&node.url())));
    let err = adapter.transaction_count(&owner, BlockTag::Latest).await.unwrap_err();

    assert_eq!(err.kind(), RpcErrorKind::Decode);
}

#[tokio::test]
async fn test_adapter_empty_call_return_is_decode_error() {
    let token = addr(TOKEN);
    let mut node = RpcMockBuilder::new().await;
    node.mock_empty_call(token, ContractCall::TotalSupply);

    let adapter = NodeAdapter::new(Arc::new(transport(&node.url())));
    let err = adapter.call_uint(&token, ContractCall::TotalSupply, BlockTag::Latest).await;

    assert_eq!(err.unwrap_err().kind(), RpcErrorKind::Decode);
}

#[tokio::test]
async fn test_adapter_uses_configured_namespace() {
    let token = addr(TOKEN);
    let mut node = RpcMockBuilder::new().await.with_namespace("eth");
    node.mock_contract_call(token, ContractCall::TotalSupply, 1_000);

    let adapter = NodeAdapter::with_namespace(Arc::new(transport(&node.url())), "eth");
    let supply =
        adapter.call_uint(&token, ContractCall::TotalSupply, BlockTag::Latest).await.unwrap();

    assert_eq!(supply, BigUint::from(1_000u32));
    assert!(node.verify_all_called());
}
