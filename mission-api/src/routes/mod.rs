//! REST API Routes Module
//!
//! Route handlers grouped by dashboard panel. Every group exposes a
//! `create_router() -> Router<AppState>`; [`create_api_router`] nests them
//! under `/api` and adds the push channel, probes, metrics, the OpenAPI
//! document and the optional static UI.

pub mod agent;
pub mod chat;
pub mod client;
pub mod content;
pub mod cron;
pub mod ecosystem;
pub mod health;
pub mod knowledge;
pub mod system;
pub mod task;

use std::path::Path;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
};
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};
use crate::ws::ws_handler;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS
// ============================================================================

/// Build CORS layer from configuration.
///
/// With no configured origins every origin is allowed; the dashboard is
/// usually served from another dev-server port.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: allowing configured origins");
        let config = config.clone();
        cors.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| config.is_origin_allowed(o))
                .unwrap_or(false)
        }))
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Every `/api/*` route, still waiting for its state.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/agents", agent::create_router())
        .nest("/ecosystem", ecosystem::create_router())
        .merge(chat::create_router())
        .merge(client::create_router())
        .merge(content::create_router())
        .merge(cron::create_router())
        .merge(knowledge::create_router())
        .merge(system::create_router())
        .merge(task::create_router())
        .route("/health", get(health::health_report))
        .route("/ws", get(ws_handler))
}

fn with_static_ui(router: Router, dir: &Path) -> Router {
    tracing::info!(dir = %dir.display(), "Serving static UI");
    let index = ServeFile::new(dir.join("index.html"));
    router.fallback_service(ServeDir::new(dir).fallback(index))
}

/// Create the complete application router.
///
/// - Dashboard endpoints under /api/*
/// - Push channel at /api/ws
/// - Probes at /health/*
/// - Metrics at /metrics, unless disabled
/// - OpenAPI spec at /openapi.json
/// - Static UI as the fallback when a directory is configured
pub fn create_api_router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut routes = Router::new()
        .nest("/api", api_routes())
        .nest("/health", health::create_router())
        .route("/openapi.json", get(openapi_json));
    if config.metrics_enabled {
        routes = routes.route("/metrics", get(metrics_handler));
    }
    let mut router = routes.with_state(state);

    if let Some(dir) = config.static_dir.as_deref() {
        router = with_static_ui(router, dir);
    }

    router
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(&config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use mission_storage::Workspace;
    use tower::ServiceExt;

    fn app(config: ApiConfig) -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(Workspace::new(dir.path()), config);
        (dir, create_api_router(state))
    }

    #[tokio::test]
    async fn test_openapi_json_endpoint() -> Result<(), String> {
        let (_dir, app) = app(ApiConfig::default());
        let response = app
            .oneshot(Request::get("/openapi.json").body(Body::empty()).map_err(|e| e.to_string())?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin_by_default() -> Result<(), String> {
        let (_dir, app) = app(ApiConfig::default());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/agents")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app.oneshot(request).await.map_err(|e| e.to_string())?;
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_cors_rejects_unlisted_origin() -> Result<(), String> {
        let config = ApiConfig {
            cors_origins: vec!["*.example.com".to_string()],
            ..ApiConfig::default()
        };
        let (_dir, app) = app(config);
        let request = Request::get("/api/revenue")
            .header(header::ORIGIN, "https://evil.test")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;
        let response = app.oneshot(request).await.map_err(|e| e.to_string())?;
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_metrics_route_can_be_disabled() -> Result<(), String> {
        let config = ApiConfig {
            metrics_enabled: false,
            ..ApiConfig::default()
        };
        let (_dir, app) = app(config);
        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).map_err(|e| e.to_string())?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_static_ui_falls_back_to_index() -> Result<(), String> {
        let ui = tempfile::tempdir().map_err(|e| e.to_string())?;
        std::fs::write(ui.path().join("index.html"), "<html>dashboard</html>")
            .map_err(|e| e.to_string())?;
        let config = ApiConfig {
            static_dir: Some(ui.path().to_path_buf()),
            ..ApiConfig::default()
        };
        let (_dir, app) = app(config);

        let response = app
            .oneshot(Request::get("/agents/scout").body(Body::empty()).map_err(|e| e.to_string())?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(&body[..], b"<html>dashboard</html>");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_without_static_dir() -> Result<(), String> {
        let (_dir, app) = app(ApiConfig::default());
        let response = app
            .oneshot(Request::get("/nowhere").body(Body::empty()).map_err(|e| e.to_string())?)
            .await
            .map_err(|e| e.to_string())?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
