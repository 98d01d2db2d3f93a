//! Error types for the realtime client.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid push channel URL '{0}': expected http, https, ws or wss")]
    InvalidUrl(String),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Connect cancelled by disconnect")]
    Cancelled,
}
