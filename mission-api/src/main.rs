//! Mission Control API Server Entry Point
//!
//! Resolves the workspace, reads configuration from the environment and
//! starts the Axum HTTP server.

use std::net::SocketAddr;

use axum::Router;
use mission_api::telemetry::{init_tracing, TelemetryConfig};
use mission_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use mission_storage::Workspace;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env();
    let workspace = Workspace::from_env();
    tracing::info!(
        workspace = %workspace.root().display(),
        repo_dirs = ?api_config.repo_dirs,
        hosted_backend = api_config.hosted_backend,
        "Workspace resolved"
    );

    let addr: SocketAddr = api_config.bind_addr().parse().map_err(|e| {
        ApiError::invalid_input(format!(
            "Invalid bind address {}: {}",
            api_config.bind_addr(),
            e
        ))
    })?;

    let state = AppState::new(workspace, api_config);
    let app: Router = create_api_router(state);

    tracing::info!(%addr, "Starting Mission Control API server");
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
