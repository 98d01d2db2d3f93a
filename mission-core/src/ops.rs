//! Operational state records: crons, revenue, services, branches,
//! ecosystem products and local git repositories.
//!
//! These documents are produced by external tooling, so their time fields
//! stay as the strings that tooling wrote.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A scheduled job from `state/crons.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default = "unknown_status")]
    pub last_status: String,
    #[serde(default)]
    pub consecutive_errors: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<String>,
}

fn unknown_status() -> String {
    "unknown".to_string()
}

impl CronJob {
    pub fn is_healthy(&self) -> bool {
        self.consecutive_errors == 0
    }
}

/// Revenue summary from `state/revenue.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RevenueSnapshot {
    #[serde(rename = "currentMRR")]
    pub current_mrr: f64,
    pub monthly_burn: f64,
    pub net_revenue: f64,
    pub currency: String,
    pub trend: String,
    pub trend_percent: f64,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    pub breakdown: Vec<Value>,
    pub last_updated: String,
}

impl RevenueSnapshot {
    /// Build a snapshot from a loosely shaped document, filling every
    /// absent field. `netRevenue` is derived as MRR minus burn when the
    /// document does not carry it.
    pub fn from_document(doc: &Value, now: &str) -> Self {
        let number = |key: &str| doc.get(key).and_then(Value::as_f64);
        let text = |key: &str, default: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };

        let current_mrr = number("currentMRR").unwrap_or(0.0);
        let monthly_burn = number("monthlyBurn").unwrap_or(0.0);

        Self {
            current_mrr,
            monthly_burn,
            net_revenue: number("netRevenue").unwrap_or(current_mrr - monthly_burn),
            currency: text("currency", "USD"),
            trend: text("trend", "flat"),
            trend_percent: number("trendPercent").unwrap_or(0.0),
            breakdown: doc
                .get("breakdown")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            last_updated: text("lastUpdated", now),
        }
    }
}

/// A monitored service from `state/servers.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub last_check: String,
}

/// A branch health entry from `state/branch-check.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BranchStatus {
    pub repo: String,
    pub branch: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_commit: String,
}

/// A product in the ecosystem catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EcosystemProduct {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<u8>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub metrics: BTreeMap<String, Value>,
}

impl EcosystemProduct {
    /// Placeholder returned for slugs that are not in the catalog.
    pub fn unknown(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: slug.to_string(),
            tagline: None,
            status: "Unknown".to_string(),
            health_score: None,
            metrics: BTreeMap::new(),
        }
    }
}

/// A git repository found under one of the scan directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GitRepo {
    pub name: String,
    pub path: String,
    pub branch: String,
    /// Relative age of the last commit, e.g. `5 minutes ago`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_msg: Option<String>,
    pub dirty: bool,
    pub dirty_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    pub language: String,
}

/// Decode each element of `items` independently, dropping the ones that
/// do not fit `T`.
pub fn decode_records<T: serde::de::DeserializeOwned>(items: &[Value]) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}
