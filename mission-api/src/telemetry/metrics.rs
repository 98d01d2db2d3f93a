//! Prometheus Metrics Definitions
//!
//! Defines the dashboard metrics and exposes them at `/metrics`.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once on first use
pub static METRICS: Lazy<ApiResult<MissionMetrics>> = Lazy::new(MissionMetrics::new);

/// The registered metrics, or `None` if registration failed.
pub fn metrics() -> Option<&'static MissionMetrics> {
    METRICS.as_ref().ok()
}

#[derive(Clone)]
pub struct MissionMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Responses served from fallback data - labels: resource
    pub fallback_responses_total: CounterVec,

    /// Mutation counter - labels: kind, outcome
    pub mutations_total: CounterVec,

    /// Current authenticated push channel connections
    pub websocket_connections: Gauge,
}

impl MissionMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "mission_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "mission_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            fallback_responses_total: register_counter_vec!(
                "mission_fallback_responses_total",
                "Responses served from fallback data",
                &["resource"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register fallback_responses_total: {}", e)))?,

            mutations_total: register_counter_vec!(
                "mission_mutations_total",
                "Mutation requests by kind and outcome",
                &["kind", "outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register mutations_total: {}", e)))?,

            websocket_connections: register_gauge!(
                "mission_websocket_connections",
                "Current number of authenticated push channel connections"
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register websocket_connections: {}", e)))?,
        })
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    pub fn record_fallback(&self, resource: &str) {
        self.fallback_responses_total
            .with_label_values(&[resource])
            .inc();
    }

    pub fn record_mutation(&self, kind: &str, outcome: &str) {
        self.mutations_total.with_label_values(&[kind, outcome]).inc();
    }

    pub fn ws_connected(&self) {
        self.websocket_connections.inc();
    }

    pub fn ws_disconnected(&self) {
        self.websocket_connections.dec();
    }
}

/// Count a fallback response and log it.
pub fn fallback_served(resource: &'static str) {
    tracing::debug!(resource, "Serving fallback data");
    if let Some(m) = metrics() {
        m.record_fallback(resource);
    }
}

/// Count a mutation outcome.
pub fn mutation_recorded(kind: &'static str, outcome: &'static str) {
    if let Some(m) = metrics() {
        m.record_mutation(kind, outcome);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Touch the registry so an idle process still reports every family.
    let _ = metrics();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
