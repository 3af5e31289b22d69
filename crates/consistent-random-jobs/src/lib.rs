//! Consistent Random Jobs — carries a scope seed across a job queue.
//!
//! The producer captures the seed of its current scope into the job; the
//! consumer re-enters a scope with that seed before running the job, so both
//! sides observe the same random values.

pub mod envelope;
pub mod payload;

pub use envelope::ScopedJob;
pub use payload::{
    JobOptions, JobPayload, OPT_OUT_FIELD, SEED_FIELD, capture_seed, perform_in_scope,
    perform_in_scope_async,
};
