use thiserror::Error;

use crate::{
    cache::CacheError,
    defi::DefiSlot,
    rpc::{RpcError, RpcErrorKind},
    types::Address,
};

/// Errors returned by the repository facade.
///
/// Node failures pass through unchanged as [`RepositoryError::Rpc`]. The only conversion
/// the facade performs is turning a failed existence probe into
/// [`RepositoryError::NotFound`].
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The address did not answer the ERC20 probe.
    #[error("no ERC20 token at {0}")]
    NotFound(Address),

    /// A DeFi settings slot failed; no settings record was produced.
    #[error("failed to load DeFi setting {slot}: {source}")]
    Aggregation {
        slot: DefiSlot,
        #[source]
        source: Box<RepositoryError>,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl RepositoryError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Adapter error kind of the underlying node failure, if any.
    #[must_use]
    pub fn rpc_kind(&self) -> Option<RpcErrorKind> {
        match self {
            Self::Rpc(e) => Some(e.kind()),
            Self::Aggregation { source, .. } => source.rpc_kind(),
            _ => None,
        }
    }
}
