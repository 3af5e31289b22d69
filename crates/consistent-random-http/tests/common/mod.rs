//! Shared test helpers for HTTP integration tests.
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use consistent_random_http::config::{DEFAULT_SEED_HEADER, ServerConfig};

/// Build the demo router with default configuration.
pub fn build_test_app() -> Router {
    consistent_random_http::app(&ServerConfig::default())
}

/// Send a GET request, optionally carrying a scope seed header.
pub async fn get_json(
    app: Router,
    uri: &str,
    seed: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(seed) = seed {
        builder = builder.header(DEFAULT_SEED_HEADER, seed);
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
