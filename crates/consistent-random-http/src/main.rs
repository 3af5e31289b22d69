//! Consistent Random demo server entry point.

use std::error::Error;

use consistent_random_http::config::ServerConfig;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting consistent random demo server");

    // Read configuration from environment.
    let config = ServerConfig::from_env()?;

    // Build router.
    let app = consistent_random_http::app(&config).layer(TraceLayer::new_for_http());

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!(seed_header = %config.seed_header, "Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
