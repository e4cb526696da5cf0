use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::Serialize;
use std::fmt;

use crate::{contracts::ContractCall, defi::aggregator::SlotSink, types::{Address, HexBig}};

/// Contract addresses of the fMint DeFi module, taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefiAddresses {
    pub fmint_contract: Address,
    pub fmint_address_provider: Address,
    pub fmint_token_registry: Address,
    pub fmint_reward_distribution: Address,
    pub fmint_collateral_pool: Address,
    pub fmint_debt_pool: Address,
    pub price_oracle_aggregate: Address,
}

/// Remote values read from the fMint minter, in declared aggregation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefiSlot {
    MintFee4,
    MinCollateralRatio4,
    RewardCollateralRatio4,
    /// Scale factor the `decimals` field is derived from.
    FeeDigitsCorrection,
}

impl DefiSlot {
    /// Every slot, in the order failures are reported.
    pub const ALL: [DefiSlot; 4] = [
        Self::MintFee4,
        Self::MinCollateralRatio4,
        Self::RewardCollateralRatio4,
        Self::FeeDigitsCorrection,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MintFee4 => "mint_fee_4",
            Self::MinCollateralRatio4 => "min_collateral_ratio_4",
            Self::RewardCollateralRatio4 => "reward_collateral_ratio_4",
            Self::FeeDigitsCorrection => "fee_digits_correction",
        }
    }

    /// Minter getter backing this slot.
    #[must_use]
    pub fn call(&self) -> ContractCall {
        match self {
            Self::MintFee4 => ContractCall::MintFee4,
            Self::MinCollateralRatio4 => ContractCall::MinCollateralRatio4,
            Self::RewardCollateralRatio4 => ContractCall::RewardCollateralRatio4,
            Self::FeeDigitsCorrection => ContractCall::FeeDigitsCorrection,
        }
    }
}

impl fmt::Display for DefiSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully populated DeFi module settings.
///
/// Ratio and fee fields carry `decimals` implied fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefiSettings {
    #[serde(flatten)]
    pub addresses: DefiAddresses,
    pub mint_fee_4: HexBig,
    pub min_collateral_ratio_4: HexBig,
    pub reward_collateral_ratio_4: HexBig,
    pub decimals: u32,
}

/// Number of decimal places represented by a power-of-ten scale factor.
///
/// Counts divisions by ten while the value stays above one. Exact for powers of ten
/// (`1 -> 0`, `10 -> 1`, `10000 -> 4`). Zero yields zero. Any other input produces an
/// approximation that is not detected here: `11 -> 1`, `20 -> 2`.
#[must_use]
pub fn decimal_places(scale: &BigUint) -> u32 {
    let ten = BigUint::from(10u8);
    let mut value = scale.clone();
    let mut places = 0;
    while !value.is_zero() && !value.is_one() {
        value /= &ten;
        places += 1;
    }
    places
}

/// Collects slot values; only [`build`](Self::build) produces a settings record.
#[derive(Debug, Clone)]
pub struct DefiSettingsBuilder {
    addresses: DefiAddresses,
    mint_fee_4: Option<BigUint>,
    min_collateral_ratio_4: Option<BigUint>,
    reward_collateral_ratio_4: Option<BigUint>,
    decimals: Option<u32>,
}

impl DefiSettingsBuilder {
    #[must_use]
    pub fn new(addresses: DefiAddresses) -> Self {
        Self {
            addresses,
            mint_fee_4: None,
            min_collateral_ratio_4: None,
            reward_collateral_ratio_4: None,
            decimals: None,
        }
    }

    pub fn apply(&mut self, slot: DefiSlot, value: BigUint) -> &mut Self {
        match slot {
            DefiSlot::MintFee4 => self.mint_fee_4 = Some(value),
            DefiSlot::MinCollateralRatio4 => self.min_collateral_ratio_4 = Some(value),
            DefiSlot::RewardCollateralRatio4 => self.reward_collateral_ratio_4 = Some(value),
            DefiSlot::FeeDigitsCorrection => self.decimals = Some(decimal_places(&value)),
        }
        self
    }

    /// # Errors
    ///
    /// Returns the first slot, in declared order, that has not been applied.
    pub fn build(self) -> Result<DefiSettings, DefiSlot> {
        Ok(DefiSettings {
            addresses: self.addresses,
            mint_fee_4: self.mint_fee_4.ok_or(DefiSlot::MintFee4)?.into(),
            min_collateral_ratio_4: self
                .min_collateral_ratio_4
                .ok_or(DefiSlot::MinCollateralRatio4)?
                .into(),
            reward_collateral_ratio_4: self
                .reward_collateral_ratio_4
                .ok_or(DefiSlot::RewardCollateralRatio4)?
                .into(),
            decimals: self.decimals.ok_or(DefiSlot::FeeDigitsCorrection)?,
        })
    }
}

impl SlotSink<DefiSlot, BigUint> for DefiSettingsBuilder {
    fn fill(&mut self, slot: DefiSlot, value: BigUint) {
        self.apply(slot, value);
    }
}
