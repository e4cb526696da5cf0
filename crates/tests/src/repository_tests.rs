//! End-to-end repository tests: `BridgeRuntime` with its real `HttpTransport` pointed at a
//! mocked Opera node.
//!
//! Mock expectations double as cache assertions: each mock expects an exact number of
//! node requests, so a second read that reaches the node fails `verify_all_called`.

use futures::future::join_all;
use motif_core::{
    contracts::ContractCall,
    defi::DefiSlot,
    rpc::RpcErrorKind,
    BridgeRuntime, RepositoryError,
};
use num_bigint::BigUint;
use std::time::Duration;

use crate::mock_infrastructure::{
    addr, minter, node_config, node_config_with_ttl, RpcMockBuilder, NOT_A_TOKEN, OWNER,
    SPENDER, TOKEN,
};

fn runtime_for(node: &RpcMockBuilder) -> BridgeRuntime {
    BridgeRuntime::builder().with_config(node_config(&node.url())).build().unwrap()
}

fn mock_minter(node: &mut RpcMockBuilder) {
    let minter = minter();
    node.mock_contract_call(minter, ContractCall::MintFee4, 25)
        .mock_contract_call(minter, ContractCall::MinCollateralRatio4, 30_000)
        .mock_contract_call(minter, ContractCall::RewardCollateralRatio4, 40_000)
        .mock_contract_call(minter, ContractCall::FeeDigitsCorrection, 10_000);
}

#[tokio::test]
async fn test_account_balance_served_from_cache() {
    let owner = addr(OWNER);
    let mut node = RpcMockBuilder::new().await;
    node.mock_balance(owner, "0x3635c9adc5dea00000");

    let runtime = runtime_for(&node);
    let repository = runtime.repository();

    let first = repository.account_balance(owner).await.unwrap();
    let second = repository.account_balance(owner).await.unwrap();

    assert_eq!(first, BigUint::from(1_000_000_000_000_000_000_000u128));
    assert_eq!(first, second);
    assert!(node.verify_all_called());

    let stats = repository.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_reads_share_one_request() {
    let owner = addr(OWNER);
    let mut node = RpcMockBuilder::new().await;
    node.mock_nonce(owner, "0x7");

    let runtime = runtime_for(&node);
    let repository = runtime.repository();

    let results = join_all((0..10).map(|_| repository.account_nonce(owner))).await;

    assert!(results.iter().all(|r| matches!(r, Ok(7))));
    assert!(node.verify_all_called(), "exactly one node request expected");
    assert_eq!(repository.cache_stats().coalesced, 9);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_node_failure_is_not_cached() {
    let owner = addr(OWNER);
    let mut node = RpcMockBuilder::new().await;
    node.mock_server_error(2);

    let runtime = runtime_for(&node);
    let repository = runtime.repository();

    for _ in 0..2 {
        let err = repository.account_balance(owner).await.unwrap_err();
        assert_eq!(err.rpc_kind(), Some(RpcErrorKind::Transport));
    }

    assert!(node.verify_all_called());
    assert_eq!(repository.cache_stats().entries, 0);

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_erc20_token_probe_and_reads() {
    let token = addr(TOKEN);
    let owner = addr(OWNER);
    let mut node = RpcMockBuilder::new().await;
    node.mock_contract_call(token, ContractCall::TotalSupply, 1_000_000)
        .mock_contract_call(token, ContractCall::BalanceOf { owner }, 100);

    let runtime = runtime_for(&node);
    let repository = runtime.repository();

    let handle = repository.erc20_token(token).await.unwrap();
    assert_eq!(handle.address(), token);

    // The probe already cached the supply.
    assert_eq!(handle.total_supply().await.unwrap(), BigUint::from(1_000_000u32));
    assert_eq!(handle.balance_of(owner).await.unwrap(), BigUint::from(100u32));
    assert!(node.verify_all_called());

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_erc20_probe_of_plain_account_is_not_found() {
    let account = addr(NOT_A_TOKEN);
    let mut node = RpcMockBuilder::new().await;
    node.mock_empty_call(account, ContractCall::TotalSupply);

    let runtime = runtime_for(&node);
    let repository = runtime.repository();

    let err = repository.erc20_token(account).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(a) if a == account));

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_erc20_probe_short_return_is_not_found() {
    let account = addr(NOT_A_TOKEN);
    let mut node = RpcMockBuilder::new().await;
    node.mock_call_raw(account, ContractCall::TotalSupply, "0x01");

    let runtime = runtime_for(&node);

    let err = runtime.repository().erc20_token(account).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(a) if a == account));
    assert!(node.verify_all_called());

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_erc20_probe_revert_is_not_found() {
    let token = addr(TOKEN);
    let mut node = RpcMockBuilder::new().await;
    node.mock_call_revert(token, ContractCall::TotalSupply);

    let runtime = runtime_for(&node);

    let found = runtime.repository().find_erc20_token(token).await.unwrap();
    assert!(found.is_none());

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_erc20_probe_transport_failure_is_not_masked() {
    let mut node = RpcMockBuilder::new().await;
    node.mock_server_error(1);

    let runtime = runtime_for(&node);

    let err = runtime.repository().erc20_token(addr(TOKEN)).await.unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(err.rpc_kind(), Some(RpcErrorKind::Transport));

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_allowance_defaults_to_fmint_spender() {
    let token = addr(TOKEN);
    let owner = addr(OWNER);
    let spender = addr(SPENDER);
    let mut node = RpcMockBuilder::new().await;
    node.mock_contract_call(token, ContractCall::Allowance { owner, spender: minter() }, 300)
        .mock_contract_call(token, ContractCall::Allowance { owner, spender }, 200);

    let runtime = runtime_for(&node);
    let repository = runtime.repository();

    let to_fmint = repository.erc20_allowance(token, owner, None).await.unwrap();
    let explicit = repository.erc20_allowance(token, owner, Some(spender)).await.unwrap();
    let fmint_again = repository.erc20_allowance(token, owner, Some(minter())).await.unwrap();

    assert_eq!(to_fmint, BigUint::from(300u32));
    assert_eq!(explicit, BigUint::from(200u32));
    assert_eq!(fmint_again, to_fmint);
    assert!(node.verify_all_called());

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_logo_url_uses_configured_table() {
    let node = RpcMockBuilder::new().await;
    let mut config = node_config(&node.url());
    config.tokens.logos.insert(TOKEN.to_string(), "https://logos.example/token.png".to_string());

    let runtime = BridgeRuntime::builder().with_config(config).build().unwrap();
    let repository = runtime.repository();

    assert_eq!(repository.erc20_logo_url(&addr(TOKEN)), "https://logos.example/token.png");
    assert_eq!(
        repository.erc20_logo_url(&addr(NOT_A_TOKEN)),
        motif_core::config::DEFAULT_TOKEN_LOGO
    );

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_defi_configuration_aggregates_minter_slots() {
    let mut node = RpcMockBuilder::new().await;
    mock_minter(&mut node);

    let runtime = runtime_for(&node);
    let repository = runtime.repository();

    let settings = repository.defi_configuration().await.unwrap();
    assert_eq!(settings.addresses.fmint_contract, minter());
    assert_eq!(settings.mint_fee_4.as_biguint(), &BigUint::from(25u32));
    assert_eq!(settings.min_collateral_ratio_4.as_biguint(), &BigUint::from(30_000u32));
    assert_eq!(settings.reward_collateral_ratio_4.as_biguint(), &BigUint::from(40_000u32));
    assert_eq!(settings.decimals, 4);

    // Slots are cached individually; the second assembly makes no node requests.
    let again = repository.defi_configuration().await.unwrap();
    assert_eq!(again.decimals, 4);
    assert!(node.verify_all_called());

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_defi_configuration_reports_first_failing_slot() {
    let minter = minter();
    let mut node = RpcMockBuilder::new().await;
    node.mock_call_revert(minter, ContractCall::MintFee4)
        .mock_contract_call(minter, ContractCall::MinCollateralRatio4, 30_000)
        .mock_call_revert(minter, ContractCall::RewardCollateralRatio4)
        .mock_contract_call(minter, ContractCall::FeeDigitsCorrection, 10_000);

    let runtime = runtime_for(&node);

    let err = runtime.repository().defi_configuration().await.unwrap_err();
    match err {
        RepositoryError::Aggregation { slot, source } => {
            assert_eq!(slot, DefiSlot::MintFee4);
            assert_eq!(source.rpc_kind(), Some(RpcErrorKind::Remote));
        }
        other => panic!("Expected Aggregation error, got {other:?}"),
    }

    runtime.shutdown().await;
}

#[tokio::test]
async fn test_expired_entry_is_fetched_again() {
    let token = addr(TOKEN);
    let mut node = RpcMockBuilder::new().await;
    node.mock_contract_call_times(token, ContractCall::TotalSupply, 5, 2);

    let runtime = BridgeRuntime::builder()
        .with_config(node_config_with_ttl(&node.url(), 1, 0))
        .build()
        .unwrap();
    let repository = runtime.repository();

    assert_eq!(repository.erc20_total_supply(token).await.unwrap(), BigUint::from(5u32));
    tokio::time::sleep(Duration::from_millis(1_200)).await;
    assert_eq!(repository.erc20_total_supply(token).await.unwrap(), BigUint::from(5u32));

    assert!(node.verify_all_called());
    assert_eq!(repository.cache_stats().expirations, 1);

    runtime.shutdown().await;
}
