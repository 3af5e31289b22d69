//! Consistent Random Core — deterministic random values keyed by name.
//!
//! Inside a scope, every request for "the random value named X" resolves to
//! the same value. Outside any scope, or for a different name, values are
//! independent. Scopes are tracked per thread and can be carried across
//! `.await` points with [`ScopeFutureExt::in_scope`], and test overrides with
//! [`OverrideFutureExt::with_overrides`].

pub mod error;
mod frames;
pub mod generator;
pub mod hasher;
pub mod range;
pub mod rng;
pub mod scope;
pub mod seed;
pub mod testing;

pub use error::{ConsistentRandomError, OverrideKind};
pub use generator::ConsistentRandom;
pub use range::RangeValue;
pub use rng::{DeterministicRng, SeededRng};
pub use scope::{ScopeFutureExt, ScopeGuard, Scoped, current_seed, enter, scope};
pub use seed::{ScopeSeed, SeedInput};
pub use testing::{
    OverrideFutureExt, OverrideGuard, OverrideSpec, Testing, WithOverrides, testing,
};
