//! Value generator.
//!
//! A [`ConsistentRandom`] is just a name. Every value it produces is derived
//! from `SHA-1(scope_seed || 0x1C || name)`, after first consulting the active
//! test overrides. Outside a scope each call hashes against a fresh random
//! seed, so results are independent.

use std::ops::RangeBounds;

use crate::error::ConsistentRandomError;
use crate::hasher::{self, DIGEST_LEN};
use crate::range::RangeValue;
use crate::rng::SeededRng;
use crate::scope::current_seed;
use crate::seed::ScopeSeed;
use crate::testing;

#[allow(clippy::cast_precision_loss)]
const SEED_DIVISOR: f64 = u64::MAX as f64;

/// Largest `f64` strictly below one.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Named source of consistent random values.
#[derive(Debug, Clone)]
pub struct ConsistentRandom {
    name: String,
}

impl ConsistentRandom {
    /// Creates a generator for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The name identifying this value stream.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the 64-bit seed for this name in the current scope.
    #[must_use]
    pub fn seed(&self) -> u64 {
        if let Some(seed) = testing::seed_for(&self.name) {
            return seed;
        }
        hasher::seed_from_digest(&self.seed_hash(self.name.as_bytes()))
    }

    /// Returns a float in `[0, 1)`.
    #[must_use]
    pub fn rand(&self) -> f64 {
        testing::float_for(&self.name).unwrap_or_else(|| unit_from_seed(self.seed()))
    }

    /// Returns `rand() * max`, truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn rand_below(&self, max: i64) -> i64 {
        (self.rand() * max as f64) as i64
    }

    /// Maps `rand()` onto `range`. Integer ranges yield integers, with
    /// inclusive ends reachable; float ranges yield floats.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if either endpoint is unbounded.
    pub fn rand_range<T: RangeValue>(
        &self,
        range: impl RangeBounds<T>,
    ) -> Result<T, ConsistentRandomError> {
        T::map_unit(self.rand(), range.start_bound(), range.end_bound())
    }

    /// Returns exactly `size` bytes.
    ///
    /// Chunks are concatenated until at least `size` bytes exist, then cut.
    /// With a non-empty bytes override the chunk is the override itself;
    /// otherwise chunk `i` is the digest of the name followed by `i`.
    #[must_use]
    pub fn bytes(&self, size: usize) -> Vec<u8> {
        let pattern = testing::bytes_for(&self.name).filter(|pattern| !pattern.is_empty());
        let mut out = Vec::with_capacity(size + DIGEST_LEN);
        if let Some(pattern) = pattern {
            while out.len() < size {
                out.extend_from_slice(&pattern);
            }
        } else {
            let scope_seed = current_seed().unwrap_or_else(ScopeSeed::fresh);
            let mut index = 0_usize;
            while out.len() < size {
                let chunk_name = format!("{}{index}", self.name);
                let chunk = hasher::digest(scope_seed.as_bytes(), chunk_name.as_bytes());
                out.extend_from_slice(&chunk);
                index += 1;
            }
        }
        out.truncate(size);
        out
    }

    /// Returns a standard PRNG seeded with [`seed`](Self::seed).
    #[must_use]
    pub fn rng(&self) -> SeededRng {
        SeededRng::from_seed(self.seed())
    }

    fn seed_hash(&self, input: &[u8]) -> [u8; DIGEST_LEN] {
        let scope_seed = current_seed().unwrap_or_else(ScopeSeed::fresh);
        hasher::digest(scope_seed.as_bytes(), input)
    }
}

/// Equal when both resolve to the same seed inside a scope. Outside any scope
/// two generators are never equal, not even with themselves.
impl PartialEq for ConsistentRandom {
    fn eq(&self, other: &Self) -> bool {
        current_seed().is_some() && self.seed() == other.seed()
    }
}

#[allow(clippy::cast_precision_loss)]
fn unit_from_seed(seed: u64) -> f64 {
    // u64::MAX rounds up to 2^64 in f64, so the top seeds would yield 1.0.
    (seed as f64 / SEED_DIVISOR).min(BELOW_ONE)
}
