//! Knowledge, Observation and Priority Routes
//!
//! Free-text search over the workspace plus the two markdown documents
//! agents keep for the operator.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use mission_core::{fallback, parse_observations, parse_priorities};
use mission_storage::{knowledge, Workspace};

use crate::{
    state::AppState,
    telemetry::metrics::fallback_served,
    types::{KnowledgeParams, KnowledgeResponse, ObservationsResponse, PrioritiesResponse},
};

/// GET /api/knowledge - Search workspace documents
#[utoipa::path(
    get,
    path = "/api/knowledge",
    tag = "Knowledge",
    params(KnowledgeParams),
    responses(
        (status = 200, description = "Matching documents", body = KnowledgeResponse),
    ),
)]
pub async fn search_knowledge(
    State(workspace): State<Workspace>,
    params: Option<Query<KnowledgeParams>>,
) -> Json<KnowledgeResponse> {
    let Query(params) = params.unwrap_or_default();
    let query = params.q.unwrap_or_default();

    let mut results = knowledge::search(&workspace, &query).await;
    if let Some(category) = params.category.filter(|c| !c.is_empty()) {
        results.retain(|entry| entry.category == category);
    }

    if results.is_empty() {
        fallback_served("knowledge");
        results = fallback::knowledge(Utc::now());
    }

    Json(KnowledgeResponse {
        total: results.len(),
        results,
        query,
    })
}

/// GET /api/observations - Newest-first entries from `state/observations.md`
#[utoipa::path(
    get,
    path = "/api/observations",
    tag = "Knowledge",
    responses(
        (status = 200, description = "Recent observations", body = ObservationsResponse),
    ),
)]
pub async fn list_observations(State(workspace): State<Workspace>) -> Json<ObservationsResponse> {
    let text = workspace
        .read_text(workspace.path(["state", "observations.md"]))
        .await;

    let observations = if text.is_empty() {
        fallback_served("observations");
        fallback::observations(Utc::now())
    } else {
        parse_observations(&text)
    };

    Json(ObservationsResponse { observations })
}

/// GET /api/priorities - Sections of `shared-context/priorities.md`
#[utoipa::path(
    get,
    path = "/api/priorities",
    tag = "Knowledge",
    responses(
        (status = 200, description = "Parsed priorities and the raw markdown", body = PrioritiesResponse),
    ),
)]
pub async fn list_priorities(State(workspace): State<Workspace>) -> Json<PrioritiesResponse> {
    let raw = workspace
        .read_text(workspace.path(["shared-context", "priorities.md"]))
        .await;

    let priorities = if raw.is_empty() {
        fallback_served("priorities");
        fallback::priorities()
    } else {
        parse_priorities(&raw)
    };

    Json(PrioritiesResponse { priorities, raw })
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/knowledge", get(search_knowledge))
        .route("/observations", get(list_observations))
        .route("/priorities", get(list_priorities))
}
