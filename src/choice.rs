//! Uniform random choice from finite collections.
//!
//! Every generator funnels its randomness through these helpers, always with
//! an injected `Rng` so that a seeded generator reproduces the same output.
//! Choosing from an empty collection is a broken algorithm invariant, not a
//! user error, and panics.

use rand::Rng;

use crate::symbols::SymbolSet;

/// Picks a uniformly random member of a non-empty symbol set.
pub(crate) fn choose<R: Rng + ?Sized>(rng: &mut R, set: &SymbolSet) -> u8 {
    assert!(!set.is_empty(), "random choice from an empty symbol set");
    let i = rng.random_range(0..set.len());
    set.nth(i).expect("index is within set cardinality")
}

/// Picks a uniformly random index below `len`, `len > 0`.
pub(crate) fn choose_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    assert!(len > 0, "random choice from an empty sequence");
    rng.random_range(0..len)
}
