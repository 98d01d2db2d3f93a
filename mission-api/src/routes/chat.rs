//! Chat Routes
//!
//! Session history read from `transcripts/*.jsonl` and the outbound send
//! path that appends to `state/message-queue.jsonl`.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use mission_core::{new_message_id, ChatMessage, ChatRole, MessageChannel};
use mission_storage::{ChatLog, HistoryQuery};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    events::DashboardEvent,
    state::AppState,
    telemetry::metrics::{fallback_served, mutation_recorded},
    types::{ChatHistoryParams, ChatHistoryResponse, ChatSendRequest, ChatSendResponse},
    ws::WsState,
};

fn lenient_number(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// GET /api/chat-history - Paged chat sessions
#[utoipa::path(
    get,
    path = "/api/chat-history",
    tag = "Chat",
    params(ChatHistoryParams),
    responses(
        (status = 200, description = "One page of sessions", body = ChatHistoryResponse),
    ),
)]
pub async fn chat_history(
    State(chat): State<ChatLog>,
    params: Option<Query<ChatHistoryParams>>,
) -> Json<ChatHistoryResponse> {
    let Query(params) = params.unwrap_or_default();
    let query = HistoryQuery {
        page: lenient_number(params.page.as_deref()).unwrap_or(1),
        limit: lenient_number(params.limit.as_deref()),
        search: params.search.filter(|s| !s.trim().is_empty()),
        channel: params.channel.filter(|c| !c.trim().is_empty()),
    };

    let page = chat.history(&query).await;
    if page.from_fallback {
        fallback_served("chat-history");
    }

    Json(ChatHistoryResponse {
        sessions: page.sessions,
        total: page.total,
        page: page.page,
    })
}

/// Exact, lowercase channel names only.
fn parse_channel(raw: Option<&str>) -> ApiResult<MessageChannel> {
    match raw {
        None => Ok(MessageChannel::Webchat),
        Some(value) => MessageChannel::ALL
            .iter()
            .copied()
            .find(|channel| channel.as_str() == value)
            .ok_or_else(|| {
                ApiError::validation_failed(format!("Unsupported channel '{}'", value))
                    .with_details(serde_json::json!({
                        "allowed": MessageChannel::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>()
                    }))
            }),
    }
}

/// POST /api/chat-send - Queue a message for the agents
///
/// A failed workspace write is reported as `queued: false` rather than as
/// an error status.
#[utoipa::path(
    post,
    path = "/api/chat-send",
    tag = "Chat",
    request_body = ChatSendRequest,
    responses(
        (status = 200, description = "Message accepted", body = ChatSendResponse),
        (status = 400, description = "Empty content or unknown channel", body = ApiError),
    ),
)]
pub async fn chat_send(
    State(chat): State<ChatLog>,
    State(ws): State<Arc<WsState>>,
    body: Result<Json<ChatSendRequest>, JsonRejection>,
) -> ApiResult<Json<ChatSendResponse>> {
    let Json(req) = body?;

    let content = req.content.as_deref().map(str::trim).unwrap_or_default();
    if content.is_empty() {
        mutation_recorded("chat_send", "invalid");
        return Err(ApiError::missing_field("content"));
    }
    let channel = parse_channel(req.channel.as_deref()).inspect_err(|_| {
        mutation_recorded("chat_send", "invalid");
    })?;

    let now = Utc::now();
    let transcript = req.session_id.is_some();
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("session-{}", now.timestamp_millis()));

    let message = ChatMessage {
        id: new_message_id(),
        role: ChatRole::User,
        content: content.to_string(),
        timestamp: now,
        channel,
        agent_id: None,
        session_id: Some(session_id),
    };

    match chat.enqueue(&message, transcript).await {
        Ok(()) => {
            mutation_recorded("chat_send", "ok");
            ws.broadcast(DashboardEvent::ChatQueued {
                message: message.clone(),
            });
            Ok(Json(ChatSendResponse {
                message,
                queued: true,
                note: None,
            }))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Chat message could not be queued");
            mutation_recorded("chat_send", "not_queued");
            Ok(Json(ChatSendResponse {
                message,
                queued: false,
                note: Some("Workspace not configured".to_string()),
            }))
        }
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/chat-history", get(chat_history))
        .route("/chat-send", post(chat_send))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_number() {
        assert_eq!(lenient_number(Some(" 3 ")), Some(3));
        assert_eq!(lenient_number(Some("abc")), None);
        assert_eq!(lenient_number(Some("-1")), None);
        assert_eq!(lenient_number(None), None);
    }

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel(None).ok(), Some(MessageChannel::Webchat));
        assert_eq!(parse_channel(Some("discord")).ok(), Some(MessageChannel::Discord));
        assert!(parse_channel(Some("Discord")).is_err());
        assert!(parse_channel(Some("sms")).is_err());
    }
}
