//! ABI calldata for the read-only contract calls the repository issues.
//!
//! Only zero-argument getters and getters taking address arguments are needed, so the
//! encoder covers exactly that: a 4-byte Keccak-256 selector followed by 32-byte
//! left-padded address words.

use sha3::{Digest, Keccak256};

use crate::types::Address;

/// Computes the 4-byte function selector for a canonical signature such as
/// `balanceOf(address)`.
///
/// # Example
/// ```
/// use motif_core::contracts::selector;
///
/// assert_eq!(selector("totalSupply()"), [0x18, 0x16, 0x0d, 0xdd]);
/// ```
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// A read-only contract call returning a single `uint256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractCall {
    /// ERC20 `totalSupply()`
    TotalSupply,
    /// ERC20 `balanceOf(owner)`
    BalanceOf { owner: Address },
    /// ERC20 `allowance(owner, spender)`
    Allowance { owner: Address, spender: Address },
    /// fMint minter `getFMintFee4dec()`
    MintFee4,
    /// fMint minter `getCollateralLowestDebtRatio4dec()`
    MinCollateralRatio4,
    /// fMint minter `getRewardEligibilityRatio4dec()`
    RewardCollateralRatio4,
    /// fMint minter `fMintFeeDigitsCorrection()`
    FeeDigitsCorrection,
}

impl ContractCall {
    #[must_use]
    pub fn signature(&self) -> &'static str {
        match self {
            Self::TotalSupply => "totalSupply()",
            Self::BalanceOf { .. } => "balanceOf(address)",
            Self::Allowance { .. } => "allowance(address,address)",
            Self::MintFee4 => "getFMintFee4dec()",
            Self::MinCollateralRatio4 => "getCollateralLowestDebtRatio4dec()",
            Self::RewardCollateralRatio4 => "getRewardEligibilityRatio4dec()",
            Self::FeeDigitsCorrection => "fMintFeeDigitsCorrection()",
        }
    }

    /// Encodes selector and arguments into calldata bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(4 + 64);
        data.extend_from_slice(&selector(self.signature()));
        match self {
            Self::BalanceOf { owner } => data.extend_from_slice(&owner.to_word()),
            Self::Allowance { owner, spender } => {
                data.extend_from_slice(&owner.to_word());
                data.extend_from_slice(&spender.to_word());
            }
            _ => {}
        }
        data
    }

    /// Calldata as a `0x`-prefixed hex string.
    #[must_use]
    pub fn encode_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }
}
