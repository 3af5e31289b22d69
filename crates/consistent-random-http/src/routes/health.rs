//! Health check endpoint.

use axum::{Json, Router, routing::get};
use consistent_random_core::hasher::{DIGEST_LEN, SEPARATOR};
use serde::Serialize;

/// Health check response, including the derivation parameters clients must
/// share with the server to reproduce values.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Hash algorithm used for seed derivation.
    pub algorithm: &'static str,
    /// Digest length in bytes.
    pub digest_len: usize,
    /// Separator byte between scope seed and name.
    pub separator: u8,
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        algorithm: "sha1",
        digest_len: DIGEST_LEN,
        separator: SEPARATOR,
    })
}

/// Returns the health check router.
pub fn router() -> Router {
    Router::new().route("/health", get(health_check))
}
