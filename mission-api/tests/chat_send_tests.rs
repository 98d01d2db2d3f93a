//! Outbound chat tests
//!
//! Messages are appended to the shared queue, mirrored into a transcript
//! only when the caller names a session, and announced on the push
//! channel.

use axum::http::StatusCode;
use mission_api::{create_api_router, DashboardEvent};
use mission_test_utils::TestWorkspace;
use serde_json::{json, Value};

#[path = "support/app.rs"]
mod test_app_support;
use test_app_support::{get_json, post_json, post_raw, test_app, test_state};

const QUEUE: &str = "state/message-queue.jsonl";
const URI: &str = "/api/chat-send";

fn lines(ws: &TestWorkspace, relative: &str) -> Vec<Value> {
    ws.read(relative)
        .unwrap_or_default()
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

#[tokio::test]
async fn test_invalid_messages_are_rejected() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let app = test_app(&ws);

    let (status, error) = post_json(&app, URI, &json!({"content": "   "})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MISSING_FIELD");

    let (status, error) = post_json(&app, URI, &json!({})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MISSING_FIELD");

    let (status, error) = post_json(&app, URI, &json!({"content": "hi", "channel": "sms"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_FAILED");
    assert!(error["details"]["allowed"]
        .as_array()
        .is_some_and(|allowed| allowed.contains(&json!("webchat"))));

    let (status, error) = post_raw(&app, URI, "content=hi").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_INPUT");

    assert!(!ws.exists(QUEUE));
    Ok(())
}

#[tokio::test]
async fn test_message_without_session_is_queued_only() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let (status, body) = post_json(&test_app(&ws), URI, &json!({"content": "  ship it  "})).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queued"], true);
    assert!(body.get("note").is_none());
    assert_eq!(body["message"]["content"], "ship it");
    assert_eq!(body["message"]["role"], "user");
    assert_eq!(body["message"]["channel"], "webchat");
    let session = body["message"]["sessionId"].as_str().unwrap_or_default();
    assert!(session.starts_with("session-"), "generated id {}", session);

    let queued = lines(&ws, QUEUE);
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0]["id"], body["message"]["id"]);
    assert!(!ws.exists(&format!("transcripts/{session}.jsonl")));
    Ok(())
}

#[tokio::test]
async fn test_message_with_session_is_mirrored_to_transcript() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let app = test_app(&ws);
    let body = json!({"content": "status?", "channel": "discord", "sessionId": "ops-sync"});

    for _ in 0..2 {
        let (status, reply) = post_json(&app, URI, &body).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["queued"], true);
    }

    assert_eq!(lines(&ws, QUEUE).len(), 2);
    let transcript = lines(&ws, "transcripts/ops-sync.jsonl");
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0]["channel"], "discord");

    let (_, history) = get_json(&app, "/api/chat-history").await?;
    assert_eq!(history["sessions"][0]["id"], "ops-sync");
    assert_eq!(history["sessions"][0]["messageCount"], 2);
    Ok(())
}

#[tokio::test]
async fn test_distinct_sessions_leave_no_writer_locks_behind() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let state = test_state(&ws);
    let workspace = state.workspace.clone();
    let app = create_api_router(state);

    for i in 0..25 {
        let body = json!({"content": "ping", "sessionId": format!("session-{i}")});
        let (status, _) = post_json(&app, URI, &body).await?;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(lines(&ws, QUEUE).len(), 25);
    assert_eq!(workspace.held_locks(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unsafe_session_id_skips_transcript() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let (status, body) = post_json(
        &test_app(&ws),
        URI,
        &json!({"content": "hello", "sessionId": "../escape"}),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queued"], true);
    assert_eq!(lines(&ws, QUEUE).len(), 1);
    assert!(!ws.exists("escape.jsonl"));
    assert!(!ws.exists("transcripts"));
    Ok(())
}

#[tokio::test]
async fn test_write_failure_reports_not_queued() -> Result<(), String> {
    let ws = TestWorkspace::new();
    // A file where the state directory should be.
    ws.write("state", "not a directory");

    let state = test_state(&ws);
    let mut rx = state.ws.subscribe();
    let (status, body) = post_json(&create_api_router(state), URI, &json!({"content": "hello"})).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queued"], false);
    assert_eq!(body["note"], "Workspace not configured");
    assert_eq!(body["message"]["content"], "hello");
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn test_queued_message_is_broadcast() -> Result<(), String> {
    let ws = TestWorkspace::new();
    let state = test_state(&ws);
    let mut rx = state.ws.subscribe();
    let app = create_api_router(state);

    let (_, body) = post_json(&app, URI, &json!({"content": "ping", "channel": "telegram"})).await?;

    match rx.try_recv().map_err(|e| e.to_string())? {
        DashboardEvent::ChatQueued { message } => {
            assert_eq!(json!(message.id), body["message"]["id"]);
            assert_eq!(message.content, "ping");
        }
        other => return Err(format!("Unexpected event {:?}", other)),
    }
    Ok(())
}
