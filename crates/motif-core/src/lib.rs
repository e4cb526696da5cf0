//! # Motif Core
//!
//! Read-side bridge between Opera/fMint consumers and an Opera node's JSON-RPC interface.
//!
//! This crate provides the foundational components for:
//!
//! - **[`rpc`]**: Typed node adapter over a pluggable [`rpc::RpcTransport`], with an HTTP
//!   transport built on `reqwest` and a bounded request semaphore.
//!
//! - **[`cache`]**: Size-bounded TTL cache with lazy expiry, nearest-expiry eviction and
//!   single-flight `fetch_or_compute`.
//!
//! - **[`defi`]**: Fail-fast aggregation of independent contract reads into the fMint
//!   [`defi::DefiSettings`] record.
//!
//! - **[`repository`]**: The facade consumers call for balances, nonces, ERC20 values,
//!   token logos and DeFi settings.
//!
//! - **[`runtime`]**: Explicit construction and shutdown of the repository and its
//!   background tasks.
//!
//! - **[`metrics`]**: Prometheus counters for node calls and cache activity.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         BridgeRuntime                        │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                       Repository                       │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  │  │
//! │  │  │   TtlCache   │  │ DeFi aggreg. │  │  TokenLogos  │  │  │
//! │  │  └──────┬───────┘  └──────┬───────┘  └──────────────┘  │  │
//! │  │         │   miss          │                            │  │
//! │  │  ┌──────▼─────────────────▼───────┐                    │  │
//! │  │  │          NodeAdapter           │                    │  │
//! │  │  └──────────────┬─────────────────┘                    │  │
//! │  └─────────────────┼──────────────────────────────────────┘  │
//! │           ┌────────▼────────┐        ┌──────────────────┐    │
//! │           │  RpcTransport   │        │  Expiry sweeper  │    │
//! │           │ (HttpTransport) │        │ (background task)│    │
//! │           └─────────────────┘        └──────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read Flow
//!
//! ```text
//! Repository call
//!       │
//!       ▼
//! ┌─────────────┐
//! │ Cache Check │ ─── Fresh hit ──► Cached value
//! └──────┬──────┘
//!        │ Miss / expired
//!        ▼
//! ┌─────────────┐
//! │ Fill pending│ ─── Yes ──► Await leader's outcome
//! └──────┬──────┘
//!        │ No (become leader)
//!        ▼
//! ┌─────────────┐
//! │ NodeAdapter │ ─── Error ──► Shared with waiters, nothing stored
//! └──────┬──────┘
//!        │ Ok
//!        ▼
//! ┌─────────────┐
//! │ Cache Insert│ ─── Over budget ──► Evict nearest expiry
//! └──────┬──────┘
//!        │
//!        ▼
//!   Value to caller(s)
//! ```

pub mod cache;
pub mod config;
pub mod contracts;
pub mod defi;
pub mod metrics;
pub mod repository;
pub mod rpc;
pub mod runtime;
pub mod types;
pub mod utils;

pub use repository::{Erc20Token, Repository, RepositoryError};
pub use runtime::{BridgeRuntime, BridgeRuntimeBuilder, RuntimeError};
pub use types::{Address, BlockTag, HexBig};
