use num_bigint::BigUint;
use std::{fmt, sync::Arc};

use crate::{
    repository::{Repository, RepositoryError},
    types::Address,
};

/// Handle to an address that answered the ERC20 probe.
///
/// Only [`Repository::erc20_token`] constructs it. Field reads go back through the
/// repository cache on every call.
#[derive(Clone)]
pub struct Erc20Token {
    address: Address,
    repo: Arc<Repository>,
}

impl fmt::Debug for Erc20Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Erc20Token").field("address", &self.address).finish_non_exhaustive()
    }
}

impl Erc20Token {
    pub(crate) fn new(address: Address, repo: Arc<Repository>) -> Self {
        Self { address, repo }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// # Errors
    ///
    /// Propagates node failures unchanged.
    pub async fn total_supply(&self) -> Result<BigUint, RepositoryError> {
        self.repo.erc20_total_supply(self.address).await
    }

    /// # Errors
    ///
    /// Propagates node failures unchanged.
    pub async fn balance_of(&self, owner: Address) -> Result<BigUint, RepositoryError> {
        self.repo.erc20_balance_of(self.address, owner).await
    }

    /// # Errors
    ///
    /// Propagates node failures unchanged.
    pub async fn allowance(
        &self,
        owner: Address,
        spender: Option<Address>,
    ) -> Result<BigUint, RepositoryError> {
        self.repo.erc20_allowance(self.address, owner, spender).await
    }

    #[must_use]
    pub fn logo_url(&self) -> String {
        self.repo.erc20_logo_url(&self.address)
    }
}
