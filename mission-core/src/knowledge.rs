//! Knowledge-base, observation and priority records

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// A free-form line from `state/observations.md`.
///
/// Ids are regenerated on every parse and carry no identity across reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Observation {
    pub id: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub timestamp: Timestamp,
    pub content: String,
    pub category: String,
}

/// A heading from `shared-context/priorities.md` with its list items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PrioritySection {
    pub title: String,
    pub items: Vec<String>,
}

/// A text-like file found by the knowledge search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    /// Path relative to the workspace root, `/`-separated.
    pub path: String,
    pub title: String,
    pub excerpt: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub last_modified: Timestamp,
    pub size: u64,
    /// First path segment.
    pub category: String,
}
