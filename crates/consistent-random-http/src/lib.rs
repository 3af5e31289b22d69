//! Consistent Random HTTP — request-scoped consistent random values.
//!
//! [`ConsistentRandomLayer`](layer::ConsistentRandomLayer) wraps each request
//! in its own scope. The demo routes expose values generated inside that
//! scope.

use axum::Router;

pub mod config;
pub mod error;
pub mod layer;
pub mod routes;

use crate::config::ServerConfig;
use crate::layer::ConsistentRandomLayer;

/// Builds the demo router, scoping each request by the configured seed header.
pub fn app(config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::random::router())
        .layer(ConsistentRandomLayer::from_header(config.seed_header.clone()))
}
