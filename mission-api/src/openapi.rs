//! OpenAPI Specification for the Mission Control API
//!
//! Generated with utoipa from the wire types and the route annotations.

use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::{agent, chat, client, content, cron, ecosystem, health, knowledge, system, task};
use crate::telemetry::metrics as metrics_routes;
use crate::types::*;

use mission_core::{
    AgentLevel, AgentOutput, AgentRecord, AgentStatus, BranchStatus, ChatMessage, ChatRole,
    ChatSession, ContentItem, ContentStats, ContentStatus, CrmClient, CrmStage, CronJob,
    EcosystemProduct, GitRepo, KnowledgeEntry, MessageChannel, Observation, PrioritySection,
    RevenueSnapshot, ServiceStatus, SuggestedTask, TaskAction, TaskEffort, TaskPriority,
    TaskStatus,
};

/// OpenAPI document for the Mission Control API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mission Control API",
        description = "Read models and review actions for an autonomous agent workspace",
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Agents", description = "Agent roster and per-agent detail"),
        (name = "Chat", description = "Session transcripts and the outbound message queue"),
        (name = "CRM", description = "Client pipeline"),
        (name = "Content", description = "Content queue"),
        (name = "Operations", description = "Crons, services, revenue and local repositories"),
        (name = "Ecosystem", description = "Product catalog and product memory"),
        (name = "Knowledge", description = "Workspace search, observations and priorities"),
        (name = "Tasks", description = "Agent-suggested tasks awaiting review"),
        (name = "Health", description = "Process report and probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        agent::list_agents,
        agent::get_agent,
        chat::chat_history,
        chat::chat_send,
        client::list_clients,
        content::content_pipeline,
        cron::cron_health,
        ecosystem::list_products,
        ecosystem::get_product,
        knowledge::search_knowledge,
        knowledge::list_observations,
        knowledge::list_priorities,
        system::system_state,
        system::revenue,
        system::list_repos,
        task::list_tasks,
        task::review_task,
        health::health_report,
        health::ping,
        health::liveness,
        health::readiness,
        metrics_routes::metrics_handler,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Envelopes ===
            AgentsResponse, AgentDetailResponse,
            ChatHistoryResponse, ChatSendRequest, ChatSendResponse,
            ClientsResponse, ContentPipelineResponse,
            CronHealthResponse, SystemStateResponse, ReposResponse,
            EcosystemListResponse, ProductDetailResponse,
            KnowledgeResponse, ObservationsResponse, PrioritiesResponse,
            TasksResponse, ReviewTaskRequest, ReviewTaskResponse,
            health::HealthReport, health::MemoryUsage, health::HealthResponse,
            health::HealthStatus,

            // === Records (from mission-core) ===
            AgentRecord, AgentOutput, CrmClient, ContentItem, ContentStats,
            SuggestedTask, ChatMessage, ChatSession, Observation, PrioritySection,
            KnowledgeEntry, CronJob, RevenueSnapshot, ServiceStatus, BranchStatus,
            EcosystemProduct, GitRepo,

            // === Enums (from mission-core) ===
            AgentLevel, AgentStatus, CrmStage, ContentStatus, TaskPriority, TaskEffort,
            TaskStatus, TaskAction, ChatRole, MessageChannel
        )
    ),
    modifiers(&VersionAddon)
)]
pub struct ApiDoc;

/// Stamps the crate version into the document.
struct VersionAddon;

impl Modify for VersionAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    }
}

impl ApiDoc {
    /// Get the OpenAPI specification as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Mission Control API");
        assert_eq!(openapi.info.version, env!("CARGO_PKG_VERSION"));

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 10);
        Ok(())
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;
        assert!(json.contains("Mission Control API"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();
        for path in [
            "/api/agents",
            "/api/agents/{id}",
            "/api/chat-history",
            "/api/chat-send",
            "/api/clients",
            "/api/content-pipeline",
            "/api/cron-health",
            "/api/ecosystem",
            "/api/ecosystem/{slug}",
            "/api/health",
            "/api/knowledge",
            "/api/observations",
            "/api/priorities",
            "/api/repos",
            "/api/revenue",
            "/api/suggested-tasks",
            "/api/system-state",
            "/metrics",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
