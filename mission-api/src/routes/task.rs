//! Suggested Task Routes
//!
//! Agents propose tasks into `state/suggested-tasks.json`; the operator
//! approves or rejects them here. Review is the only read-modify-write in
//! the API and runs under the task file's writer lock.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::get,
    Json, Router,
};
use mission_core::{TaskAction, TaskStatus};
use mission_storage::TaskStore;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    events::DashboardEvent,
    state::AppState,
    telemetry::metrics::{fallback_served, mutation_recorded},
    types::{ReviewTaskRequest, ReviewTaskResponse, TaskListParams, TasksResponse},
    ws::WsState,
};

/// GET /api/suggested-tasks - Proposed tasks, optionally filtered
///
/// An unrecognised `status` matches nothing.
#[utoipa::path(
    get,
    path = "/api/suggested-tasks",
    tag = "Tasks",
    params(TaskListParams),
    responses(
        (status = 200, description = "Suggested tasks", body = TasksResponse),
    ),
)]
pub async fn list_tasks(
    State(store): State<TaskStore>,
    params: Option<Query<TaskListParams>>,
) -> Json<TasksResponse> {
    let Query(params) = params.unwrap_or_default();
    let list = store.load().await;
    if list.from_fallback {
        fallback_served("suggested-tasks");
    }

    let category = params.category.as_deref().filter(|c| !c.is_empty());
    let tasks: Vec<_> = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match TaskStatus::parse_loose(raw) {
            Some(status) => list
                .tasks
                .into_iter()
                .filter(|t| t.matches(Some(status), category))
                .collect(),
            None => Vec::new(),
        },
        None => list
            .tasks
            .into_iter()
            .filter(|t| t.matches(None, category))
            .collect(),
    };

    Json(TasksResponse {
        total: tasks.len(),
        pending: tasks.iter().filter(|t| t.is_pending()).count(),
        tasks,
    })
}

/// Exact `approve` / `reject` only.
fn parse_action(raw: Option<&str>) -> ApiResult<TaskAction> {
    let raw = raw.ok_or_else(|| ApiError::missing_field("action"))?;
    TaskAction::ALL
        .iter()
        .copied()
        .find(|action| action.as_str() == raw)
        .ok_or_else(|| {
            ApiError::validation_failed(format!(
                "Invalid action '{}': expected approve or reject",
                raw
            ))
        })
}

fn validate_review(req: &ReviewTaskRequest) -> ApiResult<(&str, TaskAction)> {
    let task_id = req
        .task_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::missing_field("taskId"))?;
    Ok((task_id, parse_action(req.action.as_deref())?))
}

/// POST /api/suggested-tasks - Approve or reject a task
#[utoipa::path(
    post,
    path = "/api/suggested-tasks",
    tag = "Tasks",
    request_body = ReviewTaskRequest,
    responses(
        (status = 200, description = "Task reviewed", body = ReviewTaskResponse),
        (status = 400, description = "Missing task id or invalid action", body = ApiError),
        (status = 404, description = "Task not found", body = ApiError),
        (status = 500, description = "Task file could not be written", body = ApiError),
    ),
)]
pub async fn review_task(
    State(store): State<TaskStore>,
    State(ws): State<Arc<WsState>>,
    body: Result<Json<ReviewTaskRequest>, JsonRejection>,
) -> ApiResult<Json<ReviewTaskResponse>> {
    let Json(req) = body?;

    let (task_id, action) =
        validate_review(&req).inspect_err(|_| mutation_recorded("task_review", "invalid"))?;

    let task = match store.review(task_id, action).await {
        Ok(task) => task,
        Err(e) => {
            let err = ApiError::from(e);
            let outcome = if err.status_code().is_client_error() {
                "not_found"
            } else {
                "failed"
            };
            mutation_recorded("task_review", outcome);
            return Err(err);
        }
    };

    mutation_recorded("task_review", "ok");
    ws.broadcast(DashboardEvent::TaskReviewed { task: task.clone() });
    Ok(Json(ReviewTaskResponse { task }))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/suggested-tasks", get(list_tasks).post(review_task))
}
