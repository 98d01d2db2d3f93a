//! Push Channel Event Types
//!
//! Events broadcast to connected dashboard clients after a mutation, plus
//! the connection-level frames the push channel itself sends.

use mission_core::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Push channel frames, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// A suggested task was approved or rejected.
    TaskReviewed {
        /// The task as stored after the review
        task: Value,
    },

    /// A chat message was written to the outbound queue.
    ChatQueued {
        message: ChatMessage,
    },

    /// Sent once after a client authenticates.
    Connected,

    /// Sent before the server closes a connection it refuses, or after a
    /// client lagged behind the broadcast buffer.
    Error {
        message: String,
    },
}

impl DashboardEvent {
    /// The wire value of the `type` tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::TaskReviewed { .. } => "task_reviewed",
            DashboardEvent::ChatQueued { .. } => "chat_queued",
            DashboardEvent::Connected => "connected",
            DashboardEvent::Error { .. } => "error",
        }
    }

    /// Whether this event comes from a mutation, as opposed to connection
    /// bookkeeping.
    pub fn is_broadcast(&self) -> bool {
        matches!(
            self,
            DashboardEvent::TaskReviewed { .. } | DashboardEvent::ChatQueued { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_tag_matches_event_type() -> Result<(), serde_json::Error> {
        let events = [
            DashboardEvent::TaskReviewed { task: json!({"id": "task-1"}) },
            DashboardEvent::Connected,
            DashboardEvent::Error { message: "denied".into() },
        ];
        for event in events {
            let value = serde_json::to_value(&event)?;
            assert_eq!(value["type"], event.event_type());
        }
        Ok(())
    }

    #[test]
    fn test_connected_frame_shape() -> Result<(), serde_json::Error> {
        assert_eq!(
            serde_json::to_string(&DashboardEvent::Connected)?,
            r#"{"type":"connected"}"#
        );
        Ok(())
    }

    #[test]
    fn test_task_reviewed_round_trip() -> Result<(), serde_json::Error> {
        let event = DashboardEvent::TaskReviewed {
            task: json!({"id": "task-2", "status": "approved"}),
        };
        let text = serde_json::to_string(&event)?;
        let back: DashboardEvent = serde_json::from_str(&text)?;
        assert_eq!(back, event);
        assert!(back.is_broadcast());
        Ok(())
    }
}
