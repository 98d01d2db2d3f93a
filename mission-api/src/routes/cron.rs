//! Cron Health Routes

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use mission_core::{fallback, ops::decode_records, CronJob};
use mission_storage::Workspace;
use serde_json::Value;

use crate::{
    state::AppState, telemetry::metrics::fallback_served, types::CronHealthResponse,
};

/// Job list under `jobs`, or the older `crons` key.
fn jobs_from_document(doc: &Value) -> Option<Vec<CronJob>> {
    ["jobs", "crons"]
        .iter()
        .find_map(|key| doc.get(key).and_then(Value::as_array))
        .map(|items| decode_records(items))
}

/// GET /api/cron-health - Scheduled jobs from `state/crons.json`
#[utoipa::path(
    get,
    path = "/api/cron-health",
    tag = "Operations",
    responses(
        (status = 200, description = "Cron jobs with health counts", body = CronHealthResponse),
    ),
)]
pub async fn cron_health(State(workspace): State<Workspace>) -> Json<CronHealthResponse> {
    let now = Utc::now();
    let doc: Value = workspace
        .read_json(workspace.path(["state", "crons.json"]), Value::Null)
        .await;

    let jobs = jobs_from_document(&doc).unwrap_or_else(|| {
        fallback_served("cron-health");
        fallback::cron_jobs(now)
    });
    let healthy = jobs.iter().filter(|j| j.is_healthy()).count();

    Json(CronHealthResponse {
        total: jobs.len(),
        healthy,
        failing: jobs.len() - healthy,
        jobs,
        last_updated: fallback::iso(now),
    })
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/cron-health", get(cron_health))
}
