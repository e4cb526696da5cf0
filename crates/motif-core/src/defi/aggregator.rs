//! Ordered, all-or-nothing aggregation of remote slot values.
//!
//! Loaders are polled concurrently. Results are only written into the destination once
//! every loader has succeeded; when several fail, the failure reported is the one whose
//! slot comes first in declared order, regardless of which finished first.

use futures::future::{join_all, BoxFuture};
use std::fmt::Debug;

/// A named slot and the future that produces its value.
pub type SlotLoader<'a, S, T, E> = (S, BoxFuture<'a, Result<T, E>>);

/// Destination that accepts one value per named slot.
pub trait SlotSink<S, T> {
    fn fill(&mut self, slot: S, value: T);
}

/// The first failing slot in declared order and its cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFailure<S, E> {
    pub slot: S,
    pub error: E,
}

/// Runs every loader and writes the results into `sink` in declared order.
///
/// Nothing is written unless all loaders succeed.
///
/// # Errors
///
/// Returns the [`SlotFailure`] of the earliest declared slot whose loader failed.
pub async fn aggregate_into<'a, S, T, E, K>(
    sink: &mut K,
    loaders: Vec<SlotLoader<'a, S, T, E>>,
) -> Result<(), SlotFailure<S, E>>
where
    S: Copy + Debug,
    K: SlotSink<S, T>,
{
    let (slots, futures): (Vec<S>, Vec<_>) = loaders.into_iter().unzip();
    let results = join_all(futures).await;

    let mut values = Vec::with_capacity(results.len());
    for (slot, result) in slots.into_iter().zip(results) {
        match result {
            Ok(value) => values.push((slot, value)),
            Err(error) => return Err(SlotFailure { slot, error }),
        }
    }

    for (slot, value) in values {
        sink.fill(slot, value);
    }
    Ok(())
}
