use clap::Subcommand;
use motif_core::{types::HexBig, Address, Repository};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::utils::{print_json, CliResult};

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Native balance of an account
    Balance {
        /// Account address (0x-prefixed hex)
        address: Address,
    },

    /// Transaction count (nonce) of an account
    Nonce {
        /// Account address (0x-prefixed hex)
        address: Address,
    },

    /// Probe an ERC20 token and show its supply and logo
    Token {
        /// Token contract address
        address: Address,

        /// Also report the balance held by this owner
        #[arg(long)]
        owner: Option<Address>,
    },

    /// ERC20 allowance granted by an owner
    Allowance {
        /// Token contract address
        token: Address,

        /// Owner of the tokens
        owner: Address,

        /// Spender; defaults to the configured fMint contract
        #[arg(long)]
        spender: Option<Address>,
    },

    /// fMint DeFi settings
    Defi,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountBalance {
    address: Address,
    balance: HexBig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountNonce {
    address: Address,
    nonce: HexBig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenSummary {
    address: Address,
    total_supply: HexBig,
    logo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance: Option<HexBig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenAllowance {
    token: Address,
    owner: Address,
    spender: Address,
    allowance: HexBig,
}

pub async fn handle_query_command(
    command: QueryCommands,
    repository: &Arc<Repository>,
) -> CliResult<()> {
    match command {
        QueryCommands::Balance { address } => {
            let balance = repository.account_balance(address).await?;
            print_json(&AccountBalance { address, balance: balance.into() })
        }

        QueryCommands::Nonce { address } => {
            let nonce = repository.account_nonce(address).await?;
            print_json(&AccountNonce { address, nonce: nonce.into() })
        }

        QueryCommands::Token { address, owner } => {
            let token = repository.erc20_token(address).await?;
            debug!(token = %token.address(), "ERC20 probe succeeded");

            let total_supply = token.total_supply().await?;
            let balance = match owner {
                Some(owner) => Some(token.balance_of(owner).await?.into()),
                None => None,
            };

            print_json(&TokenSummary {
                address,
                total_supply: total_supply.into(),
                logo_url: token.logo_url(),
                owner,
                balance,
            })
        }

        QueryCommands::Allowance { token, owner, spender } => {
            let allowance = repository.erc20_allowance(token, owner, spender).await?;
            let spender = spender.unwrap_or(repository.defi_addresses().fmint_contract);
            print_json(&TokenAllowance { token, owner, spender, allowance: allowance.into() })
        }

        QueryCommands::Defi => {
            let settings = repository.defi_configuration().await?;
            print_json(&settings)
        }
    }
}
