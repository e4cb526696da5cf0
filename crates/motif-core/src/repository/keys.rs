use num_bigint::BigUint;
use std::mem::size_of;

use crate::{
    cache::EstimateSize,
    defi::DefiSlot,
    repository::RepositoryError,
    rpc::RpcError,
    types::Address,
};

/// Field of an entity that is cached on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    AccountBalance,
    AccountNonce,
    Erc20TotalSupply,
    /// Secondary address is the owner.
    Erc20BalanceOf,
    /// Secondary address is the owner.
    Erc20Allowance { spender: Address },
    /// Slot of the fMint minter at the entity address.
    Defi(DefiSlot),
}

/// Cache key: (entity address, field, optional secondary address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub entity: Address,
    pub field: Field,
    pub secondary: Option<Address>,
}

impl FieldKey {
    #[must_use]
    pub fn new(entity: Address, field: Field) -> Self {
        Self { entity, field, secondary: None }
    }

    #[must_use]
    pub fn with_secondary(entity: Address, field: Field, secondary: Address) -> Self {
        Self { entity, field, secondary: Some(secondary) }
    }
}

impl EstimateSize for FieldKey {
    fn estimated_size(&self) -> usize {
        size_of::<FieldKey>()
    }
}

/// Decoded value stored in the repository cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    Amount(BigUint),
    Count(u64),
}

impl CachedValue {
    pub(crate) fn into_amount(self) -> Result<BigUint, RepositoryError> {
        match self {
            Self::Amount(value) => Ok(value),
            Self::Count(_) => {
                Err(RpcError::Decode("cached counter where an amount was expected".into()).into())
            }
        }
    }

    pub(crate) fn into_count(self) -> Result<u64, RepositoryError> {
        match self {
            Self::Count(value) => Ok(value),
            Self::Amount(_) => {
                Err(RpcError::Decode("cached amount where a counter was expected".into()).into())
            }
        }
    }
}

impl EstimateSize for CachedValue {
    fn estimated_size(&self) -> usize {
        match self {
            Self::Amount(value) => value.estimated_size(),
            Self::Count(value) => value.estimated_size(),
        }
    }
}
