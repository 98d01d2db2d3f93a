#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use mission_api::{create_api_router, ApiConfig, AppState};
use mission_storage::Workspace;
use mission_test_utils::TestWorkspace;
use serde_json::Value;
use tower::ServiceExt;

/// Configuration that never touches the developer's home directory.
pub fn test_config() -> ApiConfig {
    ApiConfig {
        repo_dirs: Vec::new(),
        ..ApiConfig::default()
    }
}

pub fn test_state(ws: &TestWorkspace) -> AppState {
    AppState::new(Workspace::new(ws.root()), test_config())
}

pub fn test_app(ws: &TestWorkspace) -> Router {
    create_api_router(test_state(ws))
}

pub async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value), String> {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| e.to_string())?;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(|e| format!("Body is not JSON: {}", e))?
    };
    Ok((status, json))
}

pub async fn get_json(app: &Router, uri: &str) -> Result<(StatusCode, Value), String> {
    let request = Request::get(uri)
        .body(Body::empty())
        .map_err(|e| e.to_string())?;
    send(app, request).await
}

pub async fn post_raw(app: &Router, uri: &str, body: &str) -> Result<(StatusCode, Value), String> {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .map_err(|e| e.to_string())?;
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> Result<(StatusCode, Value), String> {
    post_raw(app, uri, &body.to_string()).await
}
