//! Demo server configuration, read from the environment.

use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::error::AppError;

/// Header carrying a client-chosen scope seed unless overridden.
pub const DEFAULT_SEED_HEADER: &str = "x-consistent-random-seed";

/// Demo server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Request header whose value seeds the request scope.
    pub seed_header: HeaderName,
}

impl ServerConfig {
    /// Reads `HOST`, `PORT` and `CONSISTENT_RANDOM_SEED_HEADER`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` or the header name is invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` or the header name is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let seed_header = lookup("CONSISTENT_RANDOM_SEED_HEADER")
            .unwrap_or_else(|| DEFAULT_SEED_HEADER.to_string());
        let seed_header = HeaderName::try_from(seed_header).map_err(|e| {
            AppError::Config(format!("CONSISTENT_RANDOM_SEED_HEADER must be a header name: {e}"))
        })?;

        Ok(Self {
            host,
            port,
            seed_header,
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if host and port do not form an address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            seed_header: HeaderName::from_static(DEFAULT_SEED_HEADER),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.seed_header.as_str(), DEFAULT_SEED_HEADER);
    }

    #[test]
    fn test_values_are_read() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CONSISTENT_RANDOM_SEED_HEADER", "x-request-id"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.seed_header.as_str(), "x-request-id");
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[("PORT", "nope")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_header_is_a_config_error() {
        let result =
            ServerConfig::from_lookup(lookup_from(&[("CONSISTENT_RANDOM_SEED_HEADER", "bad header")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
