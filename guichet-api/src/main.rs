//! Guichet Server Entry Point
//!
//! Bootstraps tracing and configuration, builds the shared state, and
//! starts the Axum HTTP server.

use std::net::SocketAddr;

use axum::Router;
use guichet_api::{create_router, ApiError, ApiResult, AppConfig, AppState};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing();

    let config = AppConfig::from_env();
    tracing::debug!(?config, "configuration loaded");

    let state = AppState::new(config)?;
    let app: Router = create_router(state);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting guichet server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("guichet_api=info,guichet_cache=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("GUICHET_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("GUICHET_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
