//! Newline-delimited JSON chat transcript parser

use super::observations::parse_timestamp;
use crate::chat::ChatMessage;
use crate::enums::{ChatRole, MessageChannel};
use crate::{new_message_id, Timestamp};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Canonical field name followed by the names older producers used for it.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("content", &["content", "text"]),
    ("timestamp", &["timestamp", "created_at", "createdAt"]),
    ("agentId", &["agentId", "agent_id"]),
    ("sessionId", &["sessionId", "session_id"]),
];

fn aliased<'a>(obj: &'a Map<String, Value>, canonical: &str) -> Option<&'a Value> {
    let names = FIELD_ALIASES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, names)| *names)
        .unwrap_or(&[]);
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|value| !value.is_null())
}

fn string_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn timestamp_field(value: Option<&Value>, now: Timestamp) -> Timestamp {
    match value {
        Some(Value::String(s)) => parse_timestamp(s).unwrap_or(now),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or(now),
        _ => now,
    }
}

/// Decode a single transcript line. `None` for blank lines, malformed
/// JSON and non-object values.
pub fn parse_chat_line(line: &str, now: Timestamp) -> Option<ChatMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(line).ok()?;
    let obj = value.as_object()?;

    let role = obj
        .get("role")
        .and_then(Value::as_str)
        .and_then(ChatRole::parse_loose)
        .unwrap_or_default();
    let channel = obj
        .get("channel")
        .and_then(Value::as_str)
        .and_then(MessageChannel::parse_loose)
        .unwrap_or_default();

    Some(ChatMessage {
        id: string_field(obj.get("id")).unwrap_or_else(|| format!("msg-{}", new_message_id())),
        role,
        content: string_field(aliased(obj, "content")).unwrap_or_default(),
        timestamp: timestamp_field(aliased(obj, "timestamp"), now),
        channel,
        agent_id: string_field(aliased(obj, "agentId")),
        session_id: string_field(aliased(obj, "sessionId")),
    })
}

/// Decode every line independently; malformed lines are dropped.
pub fn parse_chat_log(text: &str) -> Vec<ChatMessage> {
    let now = Utc::now();
    text.lines()
        .filter_map(|line| parse_chat_line(line, now))
        .collect()
}
