//! Typed job envelope.

use std::future::Future;

use consistent_random_core::{ScopeFutureExt, ScopeSeed, current_seed, scope};
use serde::{Deserialize, Serialize};

use crate::payload::JobOptions;

/// A job together with the scope seed it was enqueued under.
///
/// The seed serializes next to the job's own fields as
/// `consistent_random_seed` and is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedJob<T> {
    /// The job arguments.
    #[serde(flatten)]
    pub job: T,
    /// Seed captured from the producer's scope.
    #[serde(
        rename = "consistent_random_seed",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub seed: Option<ScopeSeed>,
}

impl<T> ScopedJob<T> {
    /// Wraps `job`, capturing the current scope seed.
    pub fn capture(job: T) -> Self {
        Self::capture_with(job, JobOptions::default())
    }

    /// Wraps `job`, capturing the current scope seed only if `options`
    /// allow inheritance.
    pub fn capture_with(job: T, options: JobOptions) -> Self {
        let seed = if options.inherit { current_seed() } else { None };
        Self { job, seed }
    }

    /// Runs `perform` with the job inside a scope seeded by the captured seed,
    /// or a fresh scope if none was captured.
    pub fn perform<R>(self, perform: impl FnOnce(T) -> R) -> R {
        let Self { job, seed } = self;
        scope(seed, || perform(job))
    }

    /// Async form of [`perform`](Self::perform).
    pub async fn perform_async<F, Fut>(self, perform: F) -> Fut::Output
    where
        F: FnOnce(T) -> Fut,
        Fut: Future,
    {
        let Self { job, seed } = self;
        perform(job).in_scope(seed).await
    }
}
