//! Operations Routes
//!
//! Service and branch status, revenue, and the local repository scan.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use mission_core::{fallback, ops::decode_records, RevenueSnapshot};
use mission_storage::{RepoScanner, Workspace};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    state::AppState,
    telemetry::metrics::fallback_served,
    types::{ReposResponse, SystemStateResponse},
};

/// Records under `key` in a JSON document, or `None` when the file is
/// missing, corrupt or lacks the array.
async fn read_records<T: DeserializeOwned>(
    workspace: &Workspace,
    file: &str,
    key: &str,
) -> Option<Vec<T>> {
    let doc: Value = workspace
        .read_json(workspace.path(["state", file]), Value::Null)
        .await;
    doc.get(key)
        .and_then(Value::as_array)
        .map(|items| decode_records(items))
}

/// GET /api/system-state - Services and branch checks
///
/// Each half falls back independently.
#[utoipa::path(
    get,
    path = "/api/system-state",
    tag = "Operations",
    responses(
        (status = 200, description = "Service and branch status", body = SystemStateResponse),
    ),
)]
pub async fn system_state(State(workspace): State<Workspace>) -> Json<SystemStateResponse> {
    let now = Utc::now();
    let (services, branches) = tokio::join!(
        read_records(&workspace, "servers.json", "services"),
        read_records(&workspace, "branch-check.json", "branches"),
    );

    Json(SystemStateResponse {
        services: services.unwrap_or_else(|| {
            fallback_served("services");
            fallback::services(now)
        }),
        branches: branches.unwrap_or_else(|| {
            fallback_served("branches");
            fallback::branches(now)
        }),
        last_updated: fallback::iso(now),
    })
}

/// GET /api/revenue - Snapshot from `state/revenue.json`
#[utoipa::path(
    get,
    path = "/api/revenue",
    tag = "Operations",
    responses(
        (status = 200, description = "Revenue snapshot", body = RevenueSnapshot),
    ),
)]
pub async fn revenue(State(workspace): State<Workspace>) -> Json<RevenueSnapshot> {
    let doc: Value = workspace
        .read_json(workspace.path(["state", "revenue.json"]), Value::Null)
        .await;
    if !doc.is_object() {
        fallback_served("revenue");
    }
    Json(RevenueSnapshot::from_document(&doc, &fallback::iso(Utc::now())))
}

/// GET /api/repos - Git repositories under the configured scan directories
#[utoipa::path(
    get,
    path = "/api/repos",
    tag = "Operations",
    responses(
        (status = 200, description = "Local repositories", body = ReposResponse),
    ),
)]
pub async fn list_repos(State(scanner): State<Arc<RepoScanner>>) -> Json<ReposResponse> {
    let repos = crate::or_fallback!(scanner.scan().await, "repos", fallback::repos());
    let dirty = repos.iter().filter(|r| r.dirty).count();

    Json(ReposResponse {
        total: repos.len(),
        dirty,
        repos,
    })
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/system-state", get(system_state))
        .route("/revenue", get(revenue))
        .route("/repos", get(list_repos))
}
