use num_bigint::BigUint;
use std::mem::size_of;

use crate::types::Address;

/// Fixed per-entry bookkeeping charge: map slot, expiry index node and entry header.
pub const ENTRY_OVERHEAD: usize = 96;

/// Approximate heap plus inline footprint of a cached key or value.
///
/// Estimates only have to be consistent, not exact; they drive the cache budget.
pub trait EstimateSize {
    fn estimated_size(&self) -> usize;
}

impl EstimateSize for u64 {
    fn estimated_size(&self) -> usize {
        size_of::<u64>()
    }
}

impl EstimateSize for String {
    fn estimated_size(&self) -> usize {
        size_of::<String>() + self.capacity()
    }
}

impl EstimateSize for Address {
    fn estimated_size(&self) -> usize {
        size_of::<Address>()
    }
}

impl EstimateSize for BigUint {
    #[allow(clippy::cast_possible_truncation)]
    fn estimated_size(&self) -> usize {
        size_of::<BigUint>() + (self.bits() as usize).div_ceil(64) * size_of::<u64>()
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimated_size(&self) -> usize {
        size_of::<Option<T>>() + self.as_ref().map_or(0, EstimateSize::estimated_size)
    }
}
