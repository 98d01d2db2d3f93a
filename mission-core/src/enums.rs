//! Enum types for Mission Control records
//!
//! Every pipeline position (agent status, CRM stage, content status, task
//! status) is a closed set. String conversions are case-insensitive on the
//! way in and canonical on the way out.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implements `as_str`, `ALL`, `Display` and case-insensitive `FromStr`.
macro_rules! impl_str_enum {
    ($type:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $type {
            /// All variants in pipeline order.
            pub const ALL: &'static [$type] = &[$($type::$variant),+];

            /// Canonical wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($type::$variant => $text),+
                }
            }

            /// Case-insensitive lookup; `None` for unknown values.
            pub fn parse_loose(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value))
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $type {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_loose(s).ok_or_else(|| CoreError::UnknownVariant {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

// ============================================================================
// AGENTS
// ============================================================================

/// Autonomy level of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AgentLevel {
    #[default]
    L1,
    L2,
    L3,
    L4,
}

impl_str_enum!(AgentLevel, "agent level", {
    L1 => "L1",
    L2 => "L2",
    L3 => "L3",
    L4 => "L4",
});

/// Runtime status of an agent as reported by the provisioning tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[serde(alias = "running")]
    Active,
    #[default]
    Idle,
    Error,
    Offline,
}

impl_str_enum!(AgentStatus, "agent status", {
    Active => "active",
    Idle => "idle",
    Error => "error",
    Offline => "offline",
});

// ============================================================================
// CRM / CONTENT
// ============================================================================

/// Position of a client in the sales pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum CrmStage {
    #[default]
    Prospect,
    Contacted,
    Meeting,
    Proposal,
    Active,
}

impl_str_enum!(CrmStage, "CRM stage", {
    Prospect => "Prospect",
    Contacted => "Contacted",
    Meeting => "Meeting",
    Proposal => "Proposal",
    Active => "Active",
});

/// Position of a content item in the publishing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Review,
    Approved,
    Published,
}

impl_str_enum!(ContentStatus, "content status", {
    Draft => "draft",
    Review => "review",
    Approved => "approved",
    Published => "published",
});

// ============================================================================
// SUGGESTED TASKS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl_str_enum!(TaskPriority, "task priority", {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Low => "low",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TaskEffort {
    Quick,
    #[default]
    Medium,
    Heavy,
}

impl_str_enum!(TaskEffort, "task effort", {
    Quick => "quick",
    Medium => "medium",
    Heavy => "heavy",
});

/// Review state of a suggested task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl_str_enum!(TaskStatus, "task status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// Review decision submitted for a suggested task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Approve,
    Reject,
}

impl_str_enum!(TaskAction, "task action", {
    Approve => "approve",
    Reject => "reject",
});

impl TaskAction {
    /// Status a task ends up in after this action.
    pub fn resulting_status(&self) -> TaskStatus {
        match self {
            TaskAction::Approve => TaskStatus::Approved,
            TaskAction::Reject => TaskStatus::Rejected,
        }
    }
}

// ============================================================================
// CHAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[default]
    Assistant,
}

impl_str_enum!(ChatRole, "chat role", {
    User => "user",
    Assistant => "assistant",
});

/// Channel a chat message arrived on or is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MessageChannel {
    Telegram,
    Discord,
    #[default]
    Webchat,
    Api,
}

impl_str_enum!(MessageChannel, "message channel", {
    Telegram => "telegram",
    Discord => "discord",
    Webchat => "webchat",
    Api => "api",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parse_is_case_insensitive() {
        assert_eq!(CrmStage::parse_loose("proposal"), Some(CrmStage::Proposal));
        assert_eq!(CrmStage::parse_loose("  MEETING "), Some(CrmStage::Meeting));
        assert_eq!(CrmStage::parse_loose("closed-won"), None);
    }

    #[test]
    fn test_from_str_reports_kind() {
        let err = "later".parse::<TaskAction>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownVariant {
                kind: "task action",
                value: "later".to_string()
            }
        );
        assert_eq!(err.to_string(), "Invalid task action: later");
    }

    #[test]
    fn test_agent_status_accepts_running_alias() {
        let status: AgentStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(status, AgentStatus::Active);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"active\"");
    }

    #[test]
    fn test_display_matches_serde() {
        for channel in MessageChannel::ALL {
            let json = serde_json::to_string(channel).unwrap();
            assert_eq!(json, format!("\"{}\"", channel));
        }
        for stage in CrmStage::ALL {
            let json = serde_json::to_string(stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }

    #[test]
    fn test_action_resulting_status() {
        assert_eq!(TaskAction::Approve.resulting_status(), TaskStatus::Approved);
        assert_eq!(TaskAction::Reject.resulting_status(), TaskStatus::Rejected);
    }
}
