//! Values generated inside the request scope.

use std::fmt::Write as _;

use axum::extract::{Path, Query};
use axum::{Json, Router, routing::get};
use consistent_random_core::{ConsistentRandom, DeterministicRng, current_seed};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;

const DEFAULT_BYTES: usize = 16;
const MAX_BYTES: usize = 1024;
const DEFAULT_SIDES: u32 = 6;
const MAX_ROLLS: usize = 100;

/// Query parameters for GET /random/{name}.
#[derive(Debug, Default, Deserialize)]
pub struct RandomQuery {
    /// Number of bytes to return, capped at 1024.
    pub size: Option<usize>,
    /// Inclusive lower bound for `ranged`.
    pub min: Option<i64>,
    /// Inclusive upper bound for `ranged`.
    pub max: Option<i64>,
    /// Number of die rolls to return, capped at 100.
    pub rolls: Option<usize>,
    /// Faces per die, defaulting to 6.
    pub sides: Option<u32>,
}

/// Values for one name in the current request scope.
#[derive(Debug, Serialize)]
pub struct RandomResponse {
    /// The requested name.
    pub name: String,
    /// Seed of the request scope.
    pub scope_seed: Option<String>,
    /// Derived 64-bit seed.
    pub seed: u64,
    /// Float in `[0, 1)`.
    pub rand: f64,
    /// Value in `[min, max]`, when a range was requested.
    pub ranged: Option<i64>,
    /// Lowercase hex of the generated bytes.
    pub hex_bytes: String,
    /// Die rolls drawn from the name's seeded stream.
    pub rolls: Vec<u32>,
}

/// GET /random/{name}
#[instrument(skip(query))]
async fn random_value(
    Path(name): Path<String>,
    Query(query): Query<RandomQuery>,
) -> Result<Json<RandomResponse>, ApiError> {
    let generator = ConsistentRandom::new(name.as_str());

    let ranged = match (query.min, query.max) {
        (None, None) => None,
        (Some(min), Some(max)) => Some(generator.rand_range(min..=max)?),
        (Some(min), None) => Some(generator.rand_range(min..)?),
        (None, Some(max)) => Some(generator.rand_range(..=max)?),
    };

    let size = query.size.unwrap_or(DEFAULT_BYTES).min(MAX_BYTES);
    let hex_bytes = generator
        .bytes(size)
        .iter()
        .fold(String::with_capacity(size * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        });

    let rolls = roll_dice(
        &mut generator.rng(),
        query.rolls.unwrap_or(0).min(MAX_ROLLS),
        query.sides.unwrap_or(DEFAULT_SIDES),
    );

    info!(
        size,
        rolls = rolls.len(),
        ranged = ranged.is_some(),
        "generated consistent random values"
    );

    Ok(Json(RandomResponse {
        scope_seed: current_seed().map(|seed| seed.to_string()),
        seed: generator.seed(),
        rand: generator.rand(),
        ranged,
        hex_bytes,
        rolls,
        name,
    }))
}

fn roll_dice(rng: &mut dyn DeterministicRng, count: usize, sides: u32) -> Vec<u32> {
    rng.rolls(count, sides)
}

/// Returns the random value router.
pub fn router() -> Router {
    Router::new().route("/random/{name}", get(random_value))
}
