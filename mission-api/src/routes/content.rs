//! Content Pipeline Routes

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use mission_core::{fallback, parse_content_queue, ContentStats};
use mission_storage::Workspace;

use crate::{
    state::AppState, telemetry::metrics::fallback_served, types::ContentPipelineResponse,
};

/// GET /api/content-pipeline - Items from `content/queue.md` with status counts
#[utoipa::path(
    get,
    path = "/api/content-pipeline",
    tag = "Content",
    responses(
        (status = 200, description = "Content queue", body = ContentPipelineResponse),
    ),
)]
pub async fn content_pipeline(State(workspace): State<Workspace>) -> Json<ContentPipelineResponse> {
    let text = workspace.read_text(workspace.path(["content", "queue.md"])).await;

    // A present queue with no list items is reported as empty.
    let items = if text.trim().is_empty() {
        fallback_served("content-pipeline");
        fallback::content_items(Utc::now())
    } else {
        parse_content_queue(&text)
    };

    Json(ContentPipelineResponse {
        stats: ContentStats::from_items(&items),
        items,
    })
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/content-pipeline", get(content_pipeline))
}
