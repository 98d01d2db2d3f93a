//! Content pipeline records

use crate::enums::ContentStatus;
use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// A content draft from `content/queue.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub platform: String,
    pub status: ContentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Item counts per content status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ContentStats {
    pub draft: usize,
    pub review: usize,
    pub approved: usize,
    pub published: usize,
}

impl ContentStats {
    pub fn from_items(items: &[ContentItem]) -> Self {
        items.iter().fold(Self::default(), |mut stats, item| {
            match item.status {
                ContentStatus::Draft => stats.draft += 1,
                ContentStatus::Review => stats.review += 1,
                ContentStatus::Approved => stats.approved += 1,
                ContentStatus::Published => stats.published += 1,
            }
            stats
        })
    }
}
