//! Repository facade: the public entry point for account, token and DeFi queries.
//!
//! Every operation follows the same path:
//!
//! ```text
//! operation(args)
//!     │
//!     ▼
//! FieldKey (entity, field, secondary)
//!     │
//!     ▼
//! TtlCache::fetch_or_compute ── hit ──► value
//!     │ miss (one fill per key)
//!     ▼
//! NodeAdapter call ──► decoded value cached for the TTL
//! ```
//!
//! DeFi settings are assembled from individually cached minter slots on every call; the
//! composite record itself is never cached.

mod erc20;
mod errors;
mod keys;


pub use erc20::Erc20Token;
pub use errors::RepositoryError;
pub use keys::{CachedValue, Field, FieldKey};

use futures::FutureExt;
use num_bigint::BigUint;
use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use crate::{
    cache::{CacheStats, TtlCache},
    contracts::ContractCall,
    defi::{aggregate_into, DefiAddresses, DefiSettings, DefiSettingsBuilder, DefiSlot, SlotLoader},
    rpc::{NodeAdapter, RpcError, RpcErrorKind},
    types::{Address, BlockTag},
};

/// Cache type shared by all repository operations.
pub type RepositoryCache = TtlCache<FieldKey, CachedValue, RepositoryError>;

/// Token logo lookup with a fallback for unknown tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenLogos {
    pub logos: HashMap<Address, String>,
    pub default_logo: String,
}

impl TokenLogos {
    #[must_use]
    pub fn logo_for(&self, token: &Address) -> &str {
        self.logos.get(token).map_or(self.default_logo.as_str(), String::as_str)
    }
}

/// Static inputs of the repository that come from configuration.
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    pub defi: DefiAddresses,
    pub token_logos: TokenLogos,
    /// TTL for cached fields; `None` uses the cache default.
    pub ttl: Option<Duration>,
}

/// Cached, read-only view of node state.
pub struct Repository {
    adapter: NodeAdapter,
    cache: Arc<RepositoryCache>,
    options: RepositoryOptions,
}

impl Repository {
    #[must_use]
    pub fn new(adapter: NodeAdapter, cache: Arc<RepositoryCache>, options: RepositoryOptions) -> Self {
        Self { adapter, cache, options }
    }

    async fn load<F, Fut>(&self, key: FieldKey, load: F) -> Result<CachedValue, RepositoryError>
    where
        F: FnOnce(NodeAdapter) -> Fut + Send + 'static,
        Fut: Future<Output = Result<CachedValue, RpcError>> + Send + 'static,
    {
        let adapter = self.adapter.clone();
        self.cache
            .fetch_or_compute(key, self.options.ttl, move || async move {
                load(adapter).await.map_err(RepositoryError::from)
            })
            .await
    }

    async fn load_amount(&self, key: FieldKey, call: ContractCall) -> Result<BigUint, RepositoryError> {
        let contract = key.entity;
        self.load(key, move |node| async move {
            node.call_uint(&contract, call, BlockTag::Latest).await.map(CachedValue::Amount)
        })
        .await?
        .into_amount()
    }

    /// Current native balance of `address`.
    ///
    /// # Errors
    ///
    /// Propagates node failures unchanged.
    pub async fn account_balance(&self, address: Address) -> Result<BigUint, RepositoryError> {
        self.load(FieldKey::new(address, Field::AccountBalance), move |node| async move {
            node.balance(&address, BlockTag::Latest).await.map(CachedValue::Amount)
        })
        .await?
        .into_amount()
    }

    /// Number of transactions sent from `address`.
    ///
    /// # Errors
    ///
    /// Propagates node failures unchanged.
    pub async fn account_nonce(&self, address: Address) -> Result<u64, RepositoryError> {
        self.load(FieldKey::new(address, Field::AccountNonce), move |node| async move {
            node.transaction_count(&address, BlockTag::Latest).await.map(CachedValue::Count)
        })
        .await?
        .into_count()
    }

    /// Resolves `token` to an ERC20 handle after probing its total supply.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotFound`] if the probe was answered with a remote error or an
    ///   undecodable result (no contract, or not a token)
    /// - [`RepositoryError::Rpc`] if the node could not be reached
    pub async fn erc20_token(self: &Arc<Self>, token: Address) -> Result<Erc20Token, RepositoryError> {
        match self.erc20_total_supply(token).await {
            Ok(_) => Ok(Erc20Token::new(token, Arc::clone(self))),
            Err(RepositoryError::Rpc(e))
                if matches!(e.kind(), RpcErrorKind::Remote | RpcErrorKind::Decode) =>
            {
                tracing::debug!(token = %token, error = %e, "address failed erc20 probe");
                Err(RepositoryError::NotFound(token))
            }
            Err(e) => {
                tracing::error!(token = %token, error = %e, "erc20 probe failed");
                Err(e)
            }
        }
    }

    /// Like [`erc20_token`](Self::erc20_token), with absence as `None`.
    ///
    /// # Errors
    ///
    /// Propagates every failure except not-found.
    pub async fn find_erc20_token(
        self: &Arc<Self>,
        token: Address,
    ) -> Result<Option<Erc20Token>, RepositoryError> {
        match self.erc20_token(token).await {
            Ok(handle) => Ok(Some(handle)),
            Err(RepositoryError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// Propagates node failures unchanged.
    pub async fn erc20_total_supply(&self, token: Address) -> Result<BigUint, RepositoryError> {
        self.load_amount(FieldKey::new(token, Field::Erc20TotalSupply), ContractCall::TotalSupply)
            .await
    }

    /// # Errors
    ///
    /// Propagates node failures unchanged.
    pub async fn erc20_balance_of(
        &self,
        token: Address,
        owner: Address,
    ) -> Result<BigUint, RepositoryError> {
        self.load_amount(
            FieldKey::with_secondary(token, Field::Erc20BalanceOf, owner),
            ContractCall::BalanceOf { owner },
        )
        .await
    }

    /// Amount `spender` may transfer from `owner`. Without a spender, the allowance
    /// granted to the fMint contract is returned.
    ///
    /// # Errors
    ///
    /// Propagates node failures unchanged.
    pub async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Option<Address>,
    ) -> Result<BigUint, RepositoryError> {
        let spender = spender.unwrap_or(self.options.defi.fmint_contract);
        self.load_amount(
            FieldKey::with_secondary(token, Field::Erc20Allowance { spender }, owner),
            ContractCall::Allowance { owner, spender },
        )
        .await
    }

    /// Logo URL for `token`, falling back to the default logo.
    #[must_use]
    pub fn erc20_logo_url(&self, token: &Address) -> String {
        self.options.token_logos.logo_for(token).to_string()
    }

    /// Assembles the DeFi settings from the configured addresses and the minter slots.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Aggregation`] naming the first failing slot in declared order.
    pub async fn defi_configuration(&self) -> Result<DefiSettings, RepositoryError> {
        let minter = self.options.defi.fmint_contract;

        let loaders: Vec<SlotLoader<'_, DefiSlot, BigUint, RepositoryError>> = DefiSlot::ALL
            .into_iter()
            .map(|slot| {
                let key = FieldKey::new(minter, Field::Defi(slot));
                (slot, self.load_amount(key, slot.call()).boxed())
            })
            .collect();

        let mut builder = DefiSettingsBuilder::new(self.options.defi);
        aggregate_into(&mut builder, loaders).await.map_err(|failure| {
            tracing::error!(
                slot = failure.slot.as_str(),
                error = %failure.error,
                "can not load defi configuration"
            );
            RepositoryError::Aggregation { slot: failure.slot, source: Box::new(failure.error) }
        })?;

        builder.build().map_err(|slot| RepositoryError::Aggregation {
            slot,
            source: Box::new(RpcError::Decode(format!("{slot} was not loaded")).into()),
        })
    }

    #[must_use]
    pub fn defi_addresses(&self) -> &DefiAddresses {
        &self.options.defi
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<RepositoryCache> {
        &self.cache
    }
}
