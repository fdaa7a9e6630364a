// src/selector.rs

use crate::entry::Entry;
use crate::error::InvalidStateError;
use rand::prelude::*;
use rand::rngs::StdRng;

/// Source of uniform random numbers for the selector.
///
/// Injected so tests can script exact draws.
pub trait RandomSource {
    /// Returns a uniformly distributed value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Seeded generator for reproducible sessions.
pub fn seeded_source(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Generator seeded from the thread-local RNG.
pub fn default_source() -> StdRng {
    StdRng::seed_from_u64(rand::rng().random::<u64>())
}

/// `weight / total * 100`, rounded to one decimal. `0.0` if `total` is zero.
pub fn percent_of(weight: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (weight / total * 1000.0).round() / 10.0
}

/// Picks one entry with probability `weight / total_weight`.
///
/// A value `r` is drawn in `[0, total)` and the entries are walked in order
/// with a running sum; the first entry whose upper bound is strictly greater
/// than `r` wins, so a value landing exactly on a boundary belongs to the
/// later entry's interval `[lower, upper)`. If rounding lets the walk finish
/// without a hit, the last entry is returned.
///
/// # Errors
///
/// `InvalidStateError::EmptyPool` if `entries` is empty or the weights sum to zero.
pub fn select_weighted<'a, R>(entries: &'a [Entry], rng: &mut R) -> Result<&'a Entry, InvalidStateError>
where
    R: RandomSource + ?Sized,
{
    let total: f64 = entries.iter().map(|e| e.weight).sum();
    let last = match entries.last() {
        Some(last) if total > 0.0 => last,
        _ => return Err(InvalidStateError::EmptyPool),
    };

    let r = rng.next_unit() * total;
    let mut cumulative = 0.0;
    for entry in entries {
        cumulative += entry.weight;
        if r < cumulative {
            return Ok(entry);
        }
    }

    Ok(last)
}
