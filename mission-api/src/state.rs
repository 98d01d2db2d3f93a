//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use mission_storage::{AgentDirectory, ChatLog, RepoScanner, TaskStore, Workspace};

use crate::config::ApiConfig;
use crate::ws::WsState;

/// Application-wide state shared across all routes.
///
/// Every store wraps the same [`Workspace`], so they share its per-file
/// writer locks.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Workspace,
    pub tasks: TaskStore,
    pub chat: ChatLog,
    pub agents: AgentDirectory,
    pub repos: Arc<RepoScanner>,
    pub ws: Arc<WsState>,
    pub config: Arc<ApiConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(workspace: Workspace, config: ApiConfig) -> Self {
        let ws = WsState::new(config.ws_capacity).with_gateway_token(config.gateway_token.clone());
        Self {
            tasks: TaskStore::new(workspace.clone()),
            chat: ChatLog::new(workspace.clone()),
            agents: AgentDirectory::new(workspace.clone()),
            repos: Arc::new(RepoScanner::new(config.repo_dirs.clone())),
            ws: Arc::new(ws),
            config: Arc::new(config),
            workspace,
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(Workspace, workspace);
crate::impl_from_ref!(TaskStore, tasks);
crate::impl_from_ref!(ChatLog, chat);
crate::impl_from_ref!(AgentDirectory, agents);
crate::impl_from_ref!(Arc<RepoScanner>, repos);
crate::impl_from_ref!(Arc<WsState>, ws);
crate::impl_from_ref!(Arc<ApiConfig>, config);
crate::impl_from_ref!(Instant, start_time);
