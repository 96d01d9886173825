//! Injectable source of randomness.
//!
//! The planner breaks ties among shortlisted activities at random. Code
//! that needs randomness takes a `RandomSource` so tests can seed it or
//! substitute a deterministic implementation.

use rand::rngs::{StdRng, ThreadRng};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Random operations used by the planner.
pub trait RandomSource {
    /// Pick one element uniformly, or `None` if the slice is empty.
    fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>;

    /// Shuffle the slice in place.
    fn shuffle<T>(&mut self, items: &mut [T]);

    /// Pick up to `k` distinct elements uniformly, in random order.
    fn sample<'a, T>(&mut self, items: &'a [T], k: usize) -> Vec<&'a T>;
}

/// A `RandomSource` backed by any `rand::Rng`.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wrap an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// A reproducible source for tests and replayable runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl RngSource<ThreadRng> {
    /// The thread-local generator.
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    fn sample<'a, T>(&mut self, items: &'a [T], k: usize) -> Vec<&'a T> {
        items.choose_multiple(&mut self.rng, k).collect()
    }
}

/// Always picks the first candidate and never reorders.
///
/// Useful where a test needs exact output rather than membership checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChoice;

impl RandomSource for FirstChoice {
    fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.first()
    }

    fn shuffle<T>(&mut self, _items: &mut [T]) {}

    fn sample<'a, T>(&mut self, items: &'a [T], k: usize) -> Vec<&'a T> {
        items.iter().take(k).collect()
    }
}
