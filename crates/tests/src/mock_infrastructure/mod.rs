//! Mock infrastructure for testing the bridge against an Opera node.
//!
//! ## Components
//!
//! - `RpcMockBuilder`: Wraps mockito with JSON-RPC responses for the `ftm_*` methods
//! - Test helpers for configuration and fixed addresses
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::{RpcMockBuilder, node_config};
//!
//! let mut node = RpcMockBuilder::new().await;
//! node.mock_balance(OWNER, "0x64");
//!
//! let runtime = BridgeRuntime::builder().with_config(node_config(&node.url())).build()?;
//! ```

pub mod rpc_mock;
pub mod test_helpers;

pub use rpc_mock::{uint_word, RpcMockBuilder};
pub use test_helpers::*;
