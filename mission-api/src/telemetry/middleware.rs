//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every request in a `tracing` span, records Prometheus metrics and
//! logs completion.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::metrics;

static AGENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/agents/[^/]+$").expect("Invalid static regex"));
static PRODUCT_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/ecosystem/[^/]+$").expect("Invalid static regex"));

/// Normalize path for metrics/spans so ids and static asset paths do not
/// explode label cardinality.
fn normalize_path(path: &str) -> String {
    if path.starts_with("/api/") {
        if AGENT_ID.is_match(path) {
            return "/api/agents/{id}".to_string();
        }
        if PRODUCT_SLUG.is_match(path) && path != "/api/ecosystem/_list" {
            return "/api/ecosystem/{slug}".to_string();
        }
        return path.to_string();
    }
    match path {
        "/metrics" | "/openapi.json" => path.to_string(),
        _ if path.starts_with("/health") => path.to_string(),
        _ => "{static}".to_string(),
    }
}

/// Observability middleware for Axum.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Some(m) = metrics() {
        m.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}
