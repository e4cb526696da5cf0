//! Bridge runtime initialization and lifecycle management.
//!
//! The runtime replaces a process-wide repository singleton: it is constructed explicitly,
//! hands out `Arc<Repository>` handles to whatever consumes them, and owns the background
//! tasks until [`BridgeRuntime::shutdown`] is called.
//!
//! # Example
//!
//! ```no_run
//! use motif_core::{config::AppConfig, runtime::BridgeRuntime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let runtime = BridgeRuntime::builder().with_config(config).build()?;
//!
//!     let repository = runtime.repository();
//!     let settings = repository.defi_configuration().await?;
//!     println!("fMint fee: {} ({} decimals)", settings.mint_fee_4, settings.decimals);
//!
//!     runtime.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod lifecycle;

pub use builder::{BridgeRuntimeBuilder, RuntimeError};
pub use lifecycle::BridgeRuntime;
