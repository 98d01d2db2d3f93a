//! Agent Routes
//!
//! The roster from `agents/registry.json` and per-agent detail pages.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use mission_core::fallback::iso;
use mission_storage::AgentDirectory;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    telemetry::metrics::fallback_served,
    types::{AgentDetailResponse, AgentsResponse},
};

/// GET /api/agents - Registered agents with their SOUL.md attached
#[utoipa::path(
    get,
    path = "/api/agents",
    tag = "Agents",
    responses(
        (status = 200, description = "Agent roster", body = AgentsResponse),
    ),
)]
pub async fn list_agents(State(agents): State<AgentDirectory>) -> Json<AgentsResponse> {
    let roster = agents.roster().await;
    if roster.from_fallback {
        fallback_served("agents");
    }

    let active = roster.agents.iter().filter(|a| a.is_active()).count();
    Json(AgentsResponse {
        total: roster.agents.len(),
        active,
        agents: roster.agents,
        last_updated: iso(Utc::now()),
    })
}

/// GET /api/agents/:id - Agent detail with rules and recent outputs
#[utoipa::path(
    get,
    path = "/api/agents/{id}",
    tag = "Agents",
    params(
        ("id" = String, Path, description = "Agent identifier"),
    ),
    responses(
        (status = 200, description = "Agent detail", body = AgentDetailResponse),
        (status = 404, description = "Agent not found", body = ApiError),
    ),
)]
pub async fn get_agent(
    State(agents): State<AgentDirectory>,
    Path(id): Path<String>,
) -> ApiResult<Json<AgentDetailResponse>> {
    let detail = agents
        .detail(&id)
        .await
        .ok_or_else(|| ApiError::agent_not_found(&id))?;

    Ok(Json(AgentDetailResponse {
        agent: detail.agent,
        soul: detail.soul,
        rules: detail.rules,
        outputs: detail.outputs,
    }))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_agents))
        .route("/:id", get(get_agent))
}
