//! API Request and Response Types
//!
//! Wire envelopes for the dashboard endpoints. All keys are camelCase.
//! Entity records come from `mission-core`; this module only wraps them.

use mission_core::{
    AgentOutput, AgentRecord, BranchStatus, ChatMessage, ChatSession, ContentItem, ContentStats,
    CronJob, CrmClient, EcosystemProduct, GitRepo, KnowledgeEntry, Observation, PrioritySection,
    ServiceStatus, SuggestedTask,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// AGENTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgentsResponse {
    pub agents: Vec<AgentRecord>,
    pub total: usize,
    /// Agents whose status is `active`
    pub active: usize,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgentDetailResponse {
    pub agent: AgentRecord,
    /// Contents of `SOUL.md`, empty when absent
    pub soul: String,
    /// Contents of `RULES.md`, empty when absent
    pub rules: String,
    pub outputs: Vec<AgentOutput>,
}

// ============================================================================
// CHAT
// ============================================================================

/// Query string of `GET /api/chat-history`. Numbers are parsed leniently;
/// garbage falls back to defaults instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ChatHistoryParams {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Sessions per page and messages per session (default 20, max 200)
    pub limit: Option<String>,
    /// Case-insensitive match on title or message content
    pub search: Option<String>,
    /// Keep only messages from this channel
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryResponse {
    pub sessions: Vec<ChatSession>,
    pub total: usize,
    pub page: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChatSendRequest {
    pub content: Option<String>,
    /// One of telegram, discord, webchat, api (default webchat)
    pub channel: Option<String>,
    /// Also append the message to this session's transcript
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChatSendResponse {
    pub message: ChatMessage,
    /// False when the workspace write failed
    pub queued: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ============================================================================
// CRM AND CONTENT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ClientsResponse {
    pub clients: Vec<CrmClient>,
    pub total: usize,
    /// Client count per pipeline stage
    pub by_stage: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ContentPipelineResponse {
    pub items: Vec<ContentItem>,
    pub stats: ContentStats,
}

// ============================================================================
// OPERATIONS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CronHealthResponse {
    pub jobs: Vec<CronJob>,
    pub total: usize,
    pub healthy: usize,
    pub failing: usize,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SystemStateResponse {
    pub services: Vec<ServiceStatus>,
    pub branches: Vec<BranchStatus>,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReposResponse {
    pub repos: Vec<GitRepo>,
    pub total: usize,
    /// Repositories with uncommitted changes
    pub dirty: usize,
}

// ============================================================================
// ECOSYSTEM
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EcosystemListResponse {
    pub products: Vec<EcosystemProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProductDetailResponse {
    pub product: EcosystemProduct,
    /// Section name to markdown, only for sections present on disk
    pub sections: BTreeMap<String, String>,
    /// Every file name in the product's memory directory
    pub files: Vec<String>,
}

// ============================================================================
// KNOWLEDGE
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct KnowledgeParams {
    /// Case-insensitive text matched against titles and contents
    pub q: Option<String>,
    /// Keep only entries whose first path segment equals this
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct KnowledgeResponse {
    pub results: Vec<KnowledgeEntry>,
    pub total: usize,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ObservationsResponse {
    pub observations: Vec<Observation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PrioritiesResponse {
    pub priorities: Vec<PrioritySection>,
    /// The raw markdown, empty when the file is missing
    pub raw: String,
}

// ============================================================================
// SUGGESTED TASKS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct TaskListParams {
    /// pending, approved or rejected
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TasksResponse {
    pub tasks: Vec<SuggestedTask>,
    pub total: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReviewTaskRequest {
    pub task_id: Option<String>,
    /// approve or reject
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReviewTaskResponse {
    /// The task as stored, including fields this server does not model
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub task: Value,
}
