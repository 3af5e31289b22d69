//! Consistent Random HTTP — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use consistent_random_core::ConsistentRandomError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the demo server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `ConsistentRandomError` that implements
/// `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub ConsistentRandomError);

impl From<ConsistentRandomError> for ApiError {
    fn from(err: ConsistentRandomError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_code = match &self.0 {
            ConsistentRandomError::InvalidSeedKind(_) => "invalid_seed_kind",
            ConsistentRandomError::InvalidRange => "invalid_range",
            ConsistentRandomError::InvalidOverrideValue { .. } => "invalid_override_value",
            ConsistentRandomError::InvalidOverrideFixture(_) => "invalid_override_fixture",
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consistent_random_core::OverrideKind;

    fn status_of(err: ConsistentRandomError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_invalid_range_maps_to_400() {
        assert_eq!(
            status_of(ConsistentRandomError::InvalidRange),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invalid_seed_kind_maps_to_400() {
        assert_eq!(
            status_of(ConsistentRandomError::InvalidSeedKind("1.5".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invalid_override_maps_to_400() {
        assert_eq!(
            status_of(ConsistentRandomError::InvalidOverrideValue {
                kind: OverrideKind::Bytes
            }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invalid_override_fixture_maps_to_400() {
        assert_eq!(
            status_of(ConsistentRandomError::InvalidOverrideFixture("null".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
