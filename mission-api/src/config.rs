//! API Configuration Module
//!
//! Configuration for the bind address, CORS, the push channel, static UI
//! serving and the repository scan. Everything is loaded from environment
//! variables with defaults suited to a local dashboard.

use mission_storage::expand_home;
use std::path::PathBuf;

const DEFAULT_REPO_DIRS: &str = "~/Desktop/Projects:~/Projects:~/Code";

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Listener
    // ========================================================================
    pub bind_host: String,
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Push channel
    // ========================================================================
    /// Broadcast buffer per subscriber before it starts lagging.
    pub ws_capacity: usize,

    /// Token the push channel's auth frame must carry. `None` accepts any.
    pub gateway_token: Option<String>,

    // ========================================================================
    // Sources
    // ========================================================================
    /// Built single-page UI served for unmatched routes.
    pub static_dir: Option<PathBuf>,

    /// Parent directories scanned for git repositories.
    pub repo_dirs: Vec<PathBuf>,

    /// Whether a hosted backend URL is configured. Only reported.
    pub hosted_backend: bool,

    /// Serve `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
            ws_capacity: 256,
            gateway_token: None,
            static_dir: None,
            repo_dirs: parse_repo_dirs(DEFAULT_REPO_DIRS),
            hosted_backend: false,
            metrics_enabled: true,
        }
    }
}

fn parse_repo_dirs(raw: &str) -> Vec<PathBuf> {
    raw.split(':')
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(expand_home)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `MISSION_CONTROL_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `MISSION_CONTROL_PORT`: Listen port (default: 3000)
    /// - `MISSION_CONTROL_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `MISSION_CONTROL_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `MISSION_CONTROL_WS_CAPACITY`: Push channel buffer (default: 256)
    /// - `MISSION_CONTROL_GATEWAY_TOKEN`: Required push channel token
    /// - `MISSION_CONTROL_STATIC_DIR`: Directory with the built UI
    /// - `MISSION_CONTROL_REPO_DIRS`: Colon-separated repository scan directories
    /// - `MISSION_CONTROL_CONVEX_URL` / `NEXT_PUBLIC_CONVEX_URL`: Hosted backend flag
    /// - `MISSION_CONTROL_METRICS_ENABLED`: Serve `/metrics` (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable numbers fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = non_empty(lookup("PORT"))
            .or_else(|| non_empty(lookup("MISSION_CONTROL_PORT")))
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = lookup("MISSION_CONTROL_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = lookup("MISSION_CONTROL_CORS_MAX_AGE_SECS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let ws_capacity = lookup("MISSION_CONTROL_WS_CAPACITY")
            .and_then(|s| s.trim().parse().ok())
            .filter(|capacity: &usize| *capacity > 0)
            .unwrap_or(defaults.ws_capacity);

        let repo_dirs = non_empty(lookup("MISSION_CONTROL_REPO_DIRS"))
            .map(|raw| parse_repo_dirs(&raw))
            .unwrap_or(defaults.repo_dirs);

        let hosted_backend = non_empty(lookup("MISSION_CONTROL_CONVEX_URL"))
            .or_else(|| non_empty(lookup("NEXT_PUBLIC_CONVEX_URL")))
            .is_some();

        let metrics_enabled = non_empty(lookup("MISSION_CONTROL_METRICS_ENABLED"))
            .map(|s| s == "true" || s == "1")
            .unwrap_or(defaults.metrics_enabled);

        Self {
            bind_host: non_empty(lookup("MISSION_CONTROL_BIND")).unwrap_or(defaults.bind_host),
            port,
            cors_origins,
            cors_max_age_secs,
            ws_capacity,
            gateway_token: non_empty(lookup("MISSION_CONTROL_GATEWAY_TOKEN")),
            static_dir: non_empty(lookup("MISSION_CONTROL_STATIC_DIR")).map(|dir| expand_home(&dir)),
            repo_dirs,
            hosted_backend,
            metrics_enabled,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.example.com
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin
                    .strip_prefix("https://")
                    .or_else(|| origin.strip_prefix("http://"))
                {
                    return origin_domain.ends_with(&format!(".{pattern}"));
                }
            }
            false
        })
    }
}
