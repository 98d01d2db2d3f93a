//! Health Check Endpoints
//!
//! - /api/health - Process report consumed by the dashboard
//! - /health/ping - Simple liveness check
//! - /health/live - Process alive check
//! - /health/ready - Workspace root is reachable
//!
//! No authentication required for health endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use mission_core::fallback::iso;
use mission_storage::Workspace;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::{config::ApiConfig, state::AppState};

// ============================================================================
// TYPES
// ============================================================================

/// Process report returned by `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Always `ok` when the process answers
    pub status: String,
    /// Seconds since startup
    pub uptime: u64,
    pub memory: MemoryUsage,
    /// 1, 5 and 15 minute load averages
    pub cpu: [f64; 3],
    pub platform: String,
    pub version: String,
    pub timestamp: String,
    /// Whether a hosted document backend is configured
    pub hosted_backend: bool,
    /// Resolved workspace root
    pub workspace: String,
}

/// Process memory in bytes. Zero where the platform does not report it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub rss: u64,
    pub virtual_size: u64,
}

/// Health check response for the probe endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

// ============================================================================
// PROCESS PROBES
// ============================================================================

/// `VmRSS` and `VmSize` from `/proc/self/status`, reported in kB.
fn parse_proc_status(text: &str) -> MemoryUsage {
    let field = |name: &str| {
        text.lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|kb| kb.parse::<u64>().ok())
            .map(|kb| kb * 1024)
            .unwrap_or(0)
    };
    MemoryUsage {
        rss: field("VmRSS:"),
        virtual_size: field("VmSize:"),
    }
}

fn parse_loadavg(text: &str) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (slot, value) in out.iter_mut().zip(text.split_whitespace()) {
        *slot = value.parse().unwrap_or(0.0);
    }
    out
}

async fn memory_usage() -> MemoryUsage {
    tokio::fs::read_to_string("/proc/self/status")
        .await
        .map(|text| parse_proc_status(&text))
        .unwrap_or_default()
}

async fn load_average() -> [f64; 3] {
    tokio::fs::read_to_string("/proc/loadavg")
        .await
        .map(|text| parse_loadavg(&text))
        .unwrap_or_default()
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/health - Uptime, memory and load for the dashboard header
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Process report", body = HealthReport),
    ),
)]
pub async fn health_report(
    State(start_time): State<Instant>,
    State(config): State<Arc<ApiConfig>>,
    State(workspace): State<Workspace>,
) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".to_string(),
        uptime: start_time.elapsed().as_secs(),
        memory: memory_usage().await,
        cpu: load_average().await,
        platform: std::env::consts::OS.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: iso(Utc::now()),
        hosted_backend: config.hosted_backend,
        workspace: workspace.root().display().to_string(),
    })
}

/// GET /health/ping - Simple pong response
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live - Process liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse),
    ),
)]
pub async fn liveness() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Process is alive".to_string()),
    };
    (StatusCode::OK, Json(response))
}

/// GET /health/ready - Workspace reachability
///
/// A missing workspace still serves fallback data, so this reports
/// `degraded` with 200 rather than failing the probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service can answer requests", body = HealthResponse),
    ),
)]
pub async fn readiness(State(workspace): State<Workspace>) -> impl IntoResponse {
    let response = if workspace.file_exists(workspace.root()).await {
        HealthResponse {
            status: HealthStatus::Healthy,
            message: None,
        }
    } else {
        HealthResponse {
            status: HealthStatus::Degraded,
            message: Some(format!(
                "Workspace {} not found, serving fallback data",
                workspace.root().display()
            )),
        }
    };
    (StatusCode::OK, Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Probe routes, nested under `/health`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proc_status() {
        let text = "Name:\tmission-api\nVmSize:\t  204800 kB\nVmRSS:\t   10240 kB\n";
        let memory = parse_proc_status(text);
        assert_eq!(memory.rss, 10240 * 1024);
        assert_eq!(memory.virtual_size, 204800 * 1024);
        assert_eq!(parse_proc_status(""), MemoryUsage::default());
    }

    #[test]
    fn test_parse_loadavg() {
        assert_eq!(parse_loadavg("0.52 0.58 0.59 1/467 12345\n"), [0.52, 0.58, 0.59]);
        assert_eq!(parse_loadavg(""), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_health_report_uses_camel_case() {
        let report = HealthReport {
            status: "ok".to_string(),
            uptime: 5,
            memory: MemoryUsage::default(),
            cpu: [0.0; 3],
            platform: "linux".to_string(),
            version: "0.1.0".to_string(),
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
            hosted_backend: false,
            workspace: "/tmp/ws".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["hostedBackend"], false);
        assert_eq!(json["memory"]["virtualSize"], 0);
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
    }
}
