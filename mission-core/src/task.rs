//! Suggested task records

use crate::enums::{TaskEffort, TaskPriority, TaskStatus};
use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// A task proposed by an agent and awaiting human review.
///
/// The only record with a real mutation path: approve/reject moves
/// `status` and stamps `reviewed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SuggestedTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub effort: TaskEffort,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub reviewed_at: Option<Timestamp>,
}

impl SuggestedTask {
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Status and category filter used by the list endpoint.
    pub fn matches(&self, status: Option<TaskStatus>, category: Option<&str>) -> bool {
        status.map_or(true, |s| self.status == s)
            && category.map_or(true, |c| self.category == c)
    }
}
