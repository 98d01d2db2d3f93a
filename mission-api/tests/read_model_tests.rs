//! Read-model endpoint tests
//!
//! Every read endpoint answers 200 with camelCase JSON. An empty workspace
//! yields the fallback datasets; a populated one yields its own documents.

use axum::http::StatusCode;
use mission_test_utils::assertions::{assert_camel_case_keys, assert_non_empty_array};
use mission_test_utils::{fixtures, TestWorkspace};
use serde_json::{json, Value};

#[path = "support/app.rs"]
mod test_app_support;
use test_app_support::{get_json, test_app};

const READ_ENDPOINTS: [(&str, &str); 15] = [
    ("/api/agents", "agents"),
    ("/api/chat-history", "sessions"),
    ("/api/clients", "clients"),
    ("/api/content-pipeline", "items"),
    ("/api/cron-health", "jobs"),
    ("/api/ecosystem", "products"),
    ("/api/ecosystem/_list", "products"),
    ("/api/knowledge", "results"),
    ("/api/observations", "observations"),
    ("/api/priorities", "priorities"),
    ("/api/repos", "repos"),
    ("/api/suggested-tasks", "tasks"),
    ("/api/system-state", "services"),
    ("/api/system-state", "branches"),
    ("/api/revenue", "breakdown"),
];

// ============================================================================
// EMPTY WORKSPACE
// ============================================================================

#[tokio::test]
async fn test_every_read_endpoint_serves_fallback_on_empty_workspace() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let app = test_app(&ws);

    for (uri, key) in READ_ENDPOINTS {
        let (status, body) = get_json(&app, uri).await?;
        assert_eq!(status, StatusCode::OK, "{} returned {}", uri, status);
        assert_camel_case_keys(&body);
        if key == "breakdown" {
            assert!(body[key].is_array(), "{} lacks {}", uri, key);
        } else {
            assert_non_empty_array(&body, key);
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_workspace_root_still_answers() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let app = {
        let config = test_app_support::test_config();
        let workspace = mission_storage::Workspace::new(ws.path("does/not/exist"));
        mission_api::create_api_router(mission_api::AppState::new(workspace, config))
    };

    let (status, body) = get_json(&app, "/api/agents").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["active"], 1);

    let (status, body) = get_json(&app, "/health/ready").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn test_revenue_fallback_is_zeroed() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let (status, body) = get_json(&test_app(&ws), "/api/revenue").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentMRR"], 0.0);
    assert_eq!(body["netRevenue"], 0.0);
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["trend"], "flat");
    Ok(())
}

#[tokio::test]
async fn test_corrupt_documents_fall_back() -> Result<(), String> {
    let ws = TestWorkspace::new();
    ws.write("agents/registry.json", "{not json")
        .write("state/crons.json", "[]")
        .write("state/suggested-tasks.json", "{\"tasks\": 3}")
        .write("memory/ecosystem/products.json", "null");
    let app = test_app(&ws);

    let (_, agents) = get_json(&app, "/api/agents").await?;
    assert_eq!(agents["total"], 5);

    let (_, crons) = get_json(&app, "/api/cron-health").await?;
    assert_eq!(crons["total"], 5);
    assert_eq!(crons["failing"], 0);

    let (_, tasks) = get_json(&app, "/api/suggested-tasks").await?;
    assert_non_empty_array(&tasks, "tasks");

    let (_, products) = get_json(&app, "/api/ecosystem").await?;
    assert_eq!(products["products"][0]["slug"], "openclaw");
    Ok(())
}

// ============================================================================
// POPULATED WORKSPACE
// ============================================================================

#[tokio::test]
async fn test_agents_come_from_registry() -> Result<(), String> {
    let ws = fixtures::populated();
    let (status, body) = get_json(&test_app(&ws), "/api/agents").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["active"], 1);
    assert_eq!(body["agents"][0]["id"], "scout");
    assert_eq!(body["agents"][0]["soul"], "Curious and thorough.");
    assert!(body["agents"][1].get("soul").is_none());
    assert!(body["lastUpdated"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_agent_detail_and_not_found() -> Result<(), String> {
    let ws = fixtures::populated();
    let app = test_app(&ws);

    let (status, body) = get_json(&app, "/api/agents/scout").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent"]["name"], "SCOUT");
    assert_eq!(body["rules"], "Cite sources.");
    assert_eq!(body["outputs"][0]["filename"], "scout-report.md");

    let (status, body) = get_json(&app, "/api/agents/ghost").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "AGENT_NOT_FOUND");

    let (status, _) = get_json(&app, "/api/agents/bad%20id").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_clients_are_counted_by_stage() -> Result<(), String> {
    let ws = fixtures::populated();
    ws.write("clients/globex.md", "# Globex\nStage: active\n")
        .write("clients/README.txt", "ignored");
    let (_, body) = get_json(&test_app(&ws), "/api/clients").await?;

    assert_eq!(body["total"], 2);
    assert_eq!(body["clients"][0]["id"], "acme");
    assert_eq!(body["clients"][0]["value"], 5000);
    assert_eq!(body["byStage"], json!({"Active": 1, "Proposal": 1}));
    Ok(())
}

#[tokio::test]
async fn test_content_pipeline_stats() -> Result<(), String> {
    let ws = fixtures::populated();
    let (_, body) = get_json(&test_app(&ws), "/api/content-pipeline").await?;

    assert_eq!(body["items"].as_array().map(Vec::len), Some(4));
    assert_eq!(
        body["stats"],
        json!({"draft": 2, "review": 1, "approved": 0, "published": 1})
    );
    Ok(())
}

#[tokio::test]
async fn test_cron_health_counts() -> Result<(), String> {
    let ws = fixtures::populated();
    let (_, body) = get_json(&test_app(&ws), "/api/cron-health").await?;
    assert_eq!(body["total"], 2);
    assert_eq!(body["healthy"], 1);
    assert_eq!(body["failing"], 1);
    Ok(())
}

#[tokio::test]
async fn test_cron_health_reads_legacy_key() -> Result<(), String> {
    let ws = TestWorkspace::new();
    ws.write_json(
        "state/crons.json",
        &json!({"crons": [{"id": "x", "name": "X", "consecutiveErrors": 2}]}),
    );
    let (_, body) = get_json(&test_app(&ws), "/api/cron-health").await?;
    assert_eq!(body["total"], 1);
    assert_eq!(body["failing"], 1);
    assert_eq!(body["jobs"][0]["lastStatus"], "unknown");
    Ok(())
}

#[tokio::test]
async fn test_revenue_derives_net() -> Result<(), String> {
    let ws = fixtures::populated();
    let (_, body) = get_json(&test_app(&ws), "/api/revenue").await?;
    assert_eq!(body["currentMRR"], 4200.0);
    assert_eq!(body["monthlyBurn"], 1200.0);
    assert_eq!(body["netRevenue"], 3000.0);
    Ok(())
}

#[tokio::test]
async fn test_system_state_halves_fall_back_independently() -> Result<(), String> {
    let ws = TestWorkspace::new();
    ws.write_json(
        "state/servers.json",
        &json!({"services": [{"name": "API", "status": "down", "lastCheck": "now"}]}),
    );
    let (_, body) = get_json(&test_app(&ws), "/api/system-state").await?;
    assert_eq!(body["services"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["services"][0]["status"], "down");
    assert_eq!(body["branches"][0]["repo"], "mission-control");
    Ok(())
}

#[tokio::test]
async fn test_ecosystem_product_detail() -> Result<(), String> {
    let ws = fixtures::populated();
    ws.write("memory/atlas/brand.md", "");
    let app = test_app(&ws);

    let (_, body) = get_json(&app, "/api/ecosystem/atlas").await?;
    assert_eq!(body["product"]["name"], "Atlas");
    assert_eq!(body["sections"], json!({"overview": "Atlas overview"}));
    assert_eq!(body["files"], json!(["brand.md", "overview.md"]));

    let (status, body) = get_json(&app, "/api/ecosystem/unheard-of").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["product"],
        json!({"slug": "unheard-of", "name": "unheard-of", "status": "Unknown"})
    );
    assert_eq!(body["sections"], json!({}));
    assert_eq!(body["files"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_ecosystem_list_route_matches_reserved_slug() -> Result<(), String> {
    let ws = fixtures::populated();
    let app = test_app(&ws);
    let (_, plain) = get_json(&app, "/api/ecosystem").await?;
    let (_, reserved) = get_json(&app, "/api/ecosystem/_list").await?;
    assert_eq!(plain, reserved);
    assert_eq!(plain["products"][0]["healthScore"], 80);
    Ok(())
}

#[tokio::test]
async fn test_knowledge_search_and_category() -> Result<(), String> {
    let ws = fixtures::populated();
    let app = test_app(&ws);

    let (_, body) = get_json(&app, "/api/knowledge?q=cfo").await?;
    assert_eq!(body["query"], "cfo");
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["path"], "clients/acme.md");
    assert_eq!(body["results"][0]["category"], "clients");

    let (_, body) = get_json(&app, "/api/knowledge?category=agents").await?;
    let results = body["results"].as_array().cloned().unwrap_or_default();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r["category"] == "agents"));
    assert_eq!(body["total"], results.len());
    Ok(())
}

#[tokio::test]
async fn test_knowledge_without_match_serves_fallback() -> Result<(), String> {
    let ws = fixtures::populated();
    let (_, body) = get_json(&test_app(&ws), "/api/knowledge?q=zzzz-nothing").await?;
    assert_eq!(body["query"], "zzzz-nothing");
    assert_eq!(body["results"][0]["path"], "shared-context/priorities.md");
    assert_eq!(body["total"], body["results"].as_array().map(Vec::len).unwrap_or(0));
    Ok(())
}

#[tokio::test]
async fn test_priorities_keep_raw_markdown() -> Result<(), String> {
    let ws = fixtures::populated();
    let (_, body) = get_json(&test_app(&ws), "/api/priorities").await?;
    assert_eq!(body["raw"], fixtures::PRIORITIES);
    assert_eq!(body["priorities"][0]["title"], "This Week");
    assert_eq!(body["priorities"][0]["items"], json!(["Ship dashboard", "Fix cron alerts"]));
    assert_eq!(body["priorities"][1]["items"], json!(["Hire designer"]));
    Ok(())
}

#[tokio::test]
async fn test_observations_newest_first() -> Result<(), String> {
    let ws = fixtures::populated();
    let (_, body) = get_json(&test_app(&ws), "/api/observations").await?;
    let observations = body["observations"].as_array().cloned().unwrap_or_default();
    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0]["content"], "second");
    assert_eq!(observations[1]["content"], "first");
    Ok(())
}

#[tokio::test]
async fn test_suggested_task_filters() -> Result<(), String> {
    let ws = fixtures::populated();
    let app = test_app(&ws);

    let (_, body) = get_json(&app, "/api/suggested-tasks").await?;
    assert_eq!(body["total"], 2);
    assert_eq!(body["pending"], 1);

    let (_, body) = get_json(&app, "/api/suggested-tasks?status=approved").await?;
    assert_eq!(body["total"], 1);
    assert_eq!(body["tasks"][0]["id"], "t2");

    let (_, body) = get_json(&app, "/api/suggested-tasks?status=archived").await?;
    assert_eq!(body["total"], 0);

    let (_, body) = get_json(&app, "/api/suggested-tasks?category=Revenue").await?;
    assert_eq!(body["total"], 0);
    Ok(())
}

#[tokio::test]
async fn test_chat_history_sessions() -> Result<(), String> {
    let ws = fixtures::populated();
    let app = test_app(&ws);

    let (_, body) = get_json(&app, "/api/chat-history").await?;
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["sessions"][0]["id"], "ops-sync");
    assert_eq!(body["sessions"][0]["title"], "ops sync");
    assert_eq!(body["sessions"][0]["channel"], "discord");

    let (_, body) = get_json(&app, "/api/chat-history?channel=telegram").await?;
    assert_eq!(body["sessions"][0]["id"], "session-1");

    let (status, body) = get_json(&app, "/api/chat-history?page=abc&limit=-3").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    Ok(())
}

#[tokio::test]
async fn test_health_report() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let app = test_app(&ws);

    let (status, body) = get_json(&app, "/api/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["hostedBackend"], false);
    assert_eq!(body["cpu"].as_array().map(Vec::len), Some(3));
    assert_eq!(
        body["workspace"],
        Value::String(ws.root().display().to_string())
    );

    let (status, body) = get_json(&app, "/health/ready").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    Ok(())
}
