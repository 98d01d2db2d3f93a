//! Agent registry records

use crate::enums::{AgentLevel, AgentStatus};
use serde::{Deserialize, Serialize};

/// One agent as listed in `agents/registry.json`.
///
/// Created by external provisioning tooling; read-only here. `soul` and
/// `rules` are filled from the agent's markdown files when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub level: AgentLevel,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soul: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

impl AgentRecord {
    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}

/// A recent output file written by an agent into the shared context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AgentOutput {
    pub filename: String,
    /// First 500 characters of the file.
    pub content: String,
}

/// Agent ids double as directory names, so only a conservative character
/// set is accepted.
pub fn is_valid_agent_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
