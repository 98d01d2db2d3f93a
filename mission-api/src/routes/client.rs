//! CRM Client Routes

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use mission_core::{fallback, parse_client, CrmClient};
use mission_storage::Workspace;
use std::collections::BTreeMap;

use crate::{or_fallback, state::AppState, types::ClientsResponse};

async fn read_clients(workspace: &Workspace) -> Vec<CrmClient> {
    let dir = workspace.path(["clients"]);
    let mut clients = Vec::new();
    for name in workspace.list_dir(&dir).await {
        if !name.ends_with(".md") {
            continue;
        }
        let text = workspace.read_text(dir.join(&name)).await;
        clients.push(parse_client(&name, &text));
    }
    clients
}

/// GET /api/clients - One client per markdown file under `clients/`
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "CRM",
    responses(
        (status = 200, description = "Clients with per-stage counts", body = ClientsResponse),
    ),
)]
pub async fn list_clients(State(workspace): State<Workspace>) -> Json<ClientsResponse> {
    let clients = or_fallback!(
        read_clients(&workspace).await,
        "clients",
        fallback::clients(Utc::now())
    );

    let mut by_stage = BTreeMap::new();
    for client in &clients {
        *by_stage.entry(client.stage.to_string()).or_insert(0) += 1;
    }

    Json(ClientsResponse {
        total: clients.len(),
        by_stage,
        clients,
    })
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/clients", get(list_clients))
}
