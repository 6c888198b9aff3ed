//! `proptest` strategies for domain types.

use eventsproject_core::{Logistics, Money};
use proptest::prelude::*;

/// Any logistics item with a price up to 10 000.00 and quantity up to 1 000.
///
/// Bounds keep sums of a few hundred items far from `u64` overflow.
pub fn logistics() -> impl Strategy<Value = Logistics> {
    (
        "[A-Za-z ]{1,24}",
        any::<bool>(),
        0u64..=1_000_000,
        0u32..=1_000,
    )
        .prop_map(|(description, reserved, cents, quantity)| {
            Logistics::new(description, reserved, Money::from_cents(cents), quantity)
        })
}

/// A logistics collection together with a shuffled copy of it.
pub fn logistics_and_permutation() -> impl Strategy<Value = (Vec<Logistics>, Vec<Logistics>)> {
    prop::collection::vec(logistics(), 0..32)
        .prop_flat_map(|items| (Just(items.clone()), Just(items).prop_shuffle()))
}
