//! Untyped JSON job payloads.

use std::future::Future;

use consistent_random_core::{
    ConsistentRandomError, ScopeFutureExt, ScopeSeed, SeedInput, current_seed, scope,
};
use serde_json::{Map, Value};
use tracing::debug;

/// Payload field holding the captured scope seed.
pub const SEED_FIELD: &str = "consistent_random_seed";

/// Payload field that disables capture for a single job when `false`.
pub const OPT_OUT_FIELD: &str = "consistent_random";

/// A JSON job record.
pub type JobPayload = Map<String, Value>;

/// Per-job-type propagation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    /// Whether jobs inherit the producer's scope seed.
    pub inherit: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self { inherit: true }
    }
}

/// Writes the current scope seed into `payload`.
///
/// Nothing is written when no scope is active, when `options.inherit` is
/// false, or when the payload sets `consistent_random` to `false`.
pub fn capture_seed(payload: &mut JobPayload, options: JobOptions) -> Option<ScopeSeed> {
    if !options.inherit || payload.get(OPT_OUT_FIELD) == Some(&Value::Bool(false)) {
        return None;
    }
    let seed = current_seed()?;
    payload.insert(SEED_FIELD.to_owned(), Value::String(seed.to_string()));
    debug!(field = SEED_FIELD, "captured consistent random seed into job payload");
    Some(seed)
}

/// Runs `body` in a scope seeded from `payload`.
///
/// # Errors
///
/// Returns `InvalidSeedKind` if the seed field holds an unsupported value;
/// `body` does not run in that case.
pub fn perform_in_scope<R>(
    payload: &JobPayload,
    options: JobOptions,
    body: impl FnOnce() -> R,
) -> Result<R, ConsistentRandomError> {
    let seed = seed_input(payload, options)?;
    Ok(scope(seed, body))
}

/// Async form of [`perform_in_scope`].
///
/// # Errors
///
/// Returns `InvalidSeedKind` if the seed field holds an unsupported value.
pub async fn perform_in_scope_async<F: Future>(
    payload: &JobPayload,
    options: JobOptions,
    job: F,
) -> Result<F::Output, ConsistentRandomError> {
    let seed = seed_input(payload, options)?;
    Ok(job.in_scope(seed).await)
}

fn seed_input(payload: &JobPayload, options: JobOptions) -> Result<SeedInput, ConsistentRandomError> {
    if !options.inherit {
        return Ok(SeedInput::Absent);
    }
    let input = payload
        .get(SEED_FIELD)
        .map_or(Ok(SeedInput::Absent), SeedInput::try_from)?;
    if input != SeedInput::Absent {
        debug!(field = SEED_FIELD, "restoring consistent random seed from job payload");
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use consistent_random_core::ConsistentRandom;
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> JobPayload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_capture_writes_current_seed() {
        let mut job = payload(json!({"args": {"foo": "bar"}}));
        let captured = scope("foobar", || capture_seed(&mut job, JobOptions::default()));
        assert_eq!(captured, Some(ScopeSeed::new("foobar")));
        assert_eq!(job[SEED_FIELD], json!("foobar"));
    }

    #[test]
    fn test_capture_outside_scope_writes_nothing() {
        let mut job = payload(json!({"args": []}));
        assert_eq!(capture_seed(&mut job, JobOptions::default()), None);
        assert!(!job.contains_key(SEED_FIELD));
    }

    #[test]
    fn test_capture_respects_payload_opt_out() {
        let mut job = payload(json!({"consistent_random": false}));
        scope("foobar", || capture_seed(&mut job, JobOptions::default()));
        assert!(!job.contains_key(SEED_FIELD));
    }

    #[test]
    fn test_capture_respects_job_options() {
        let mut job = payload(json!({}));
        scope("foobar", || capture_seed(&mut job, JobOptions { inherit: false }));
        assert!(!job.contains_key(SEED_FIELD));
    }

    #[test]
    fn test_consumer_sees_producer_values() {
        let mut job = payload(json!({}));
        let produced = scope(123, || {
            capture_seed(&mut job, JobOptions::default());
            ConsistentRandom::new("foo").rand()
        });

        let consumed = perform_in_scope(&job, JobOptions::default(), || {
            (ConsistentRandom::new("foo").rand(), ConsistentRandom::new("foo").rand())
        })
        .unwrap();

        assert_eq!(consumed, (produced, produced));
        assert_eq!(current_seed(), None);
    }

    #[test]
    fn test_consumer_without_seed_still_runs_in_a_scope() {
        let job = payload(json!({}));
        let (a, b) = perform_in_scope(&job, JobOptions::default(), || {
            (ConsistentRandom::new("foo").rand(), ConsistentRandom::new("foo").rand())
        })
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_disabled_inheritance_ignores_payload_seed() {
        let job = payload(json!({ SEED_FIELD: "123" }));
        let expected = scope(123, || ConsistentRandom::new("foo").rand());
        let (a, b) = perform_in_scope(&job, JobOptions { inherit: false }, || {
            (ConsistentRandom::new("foo").rand(), ConsistentRandom::new("foo").rand())
        })
        .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, expected);
    }

    #[test]
    fn test_invalid_payload_seed_is_rejected_before_body() {
        let job = payload(json!({ SEED_FIELD: 1.5 }));
        let mut ran = false;
        let result = perform_in_scope(&job, JobOptions::default(), || ran = true);
        assert!(matches!(
            result,
            Err(ConsistentRandomError::InvalidSeedKind(_))
        ));
        assert!(!ran);
    }

    #[tokio::test]
    async fn test_async_consumer_sees_producer_seed() {
        let job = payload(json!({ SEED_FIELD: "foobar" }));
        let seen = perform_in_scope_async(&job, JobOptions::default(), async {
            tokio::task::yield_now().await;
            current_seed()
        })
        .await
        .unwrap();
        assert_eq!(seen, Some(ScopeSeed::new("foobar")));
    }
}
