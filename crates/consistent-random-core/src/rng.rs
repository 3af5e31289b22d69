//! Streams of values from a name's derived seed.
//!
//! A name's derived seed can be handed to a conventional PRNG when a caller
//! needs a stream of values rather than a single one. [`SeededRng`] is that
//! hand-off: it is reproducible from the seed alone. Code that consumes a
//! stream takes `&mut dyn DeterministicRng` so tests can feed it a fixed one.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// A reproducible stream of bounded values.
pub trait DeterministicRng: Send + Sync {
    /// Next value in `[min, max]`. Reversed bounds are swapped.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Next value in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;

    /// `count` rolls of a die with `sides` faces, each in `[1, sides]`.
    /// A die with zero sides always rolls 1.
    fn rolls(&mut self, count: usize, sides: u32) -> Vec<u32> {
        (0..count).map(|_| self.next_u32_range(1, sides.max(1))).collect()
    }
}

/// A standard PRNG seeded from a derived 64-bit seed.
///
/// Two generators are equal when their internal state is equal, so two
/// freshly created generators with the same seed compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    seed: u64,
    inner: StdRng,
}

impl SeededRng {
    /// Creates a generator from `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed this generator was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl DeterministicRng for SeededRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        self.inner.random_range(low..=high)
    }

    fn next_f64(&mut self) -> f64 {
        self.inner.random()
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.inner.fill_bytes(dst);
    }
}
