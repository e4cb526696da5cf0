//! DeFi module settings and the contract value aggregator that assembles them.

pub mod aggregator;
pub mod settings;

pub use aggregator::{aggregate_into, SlotFailure, SlotLoader, SlotSink};
pub use settings::{decimal_places, DefiAddresses, DefiSettings, DefiSettingsBuilder, DefiSlot};
