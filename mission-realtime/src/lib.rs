//! Mission Control push-channel client.
//!
//! Connects to the dashboard's `/api/ws` endpoint, authenticates, and
//! dispatches incoming frames to listeners keyed by their `type` field.
//! Dropped connections are retried with exponential backoff.

pub mod config;
pub mod error;
pub mod listeners;
pub mod realtime;

pub use config::{ConfigError, ReconnectConfig, RealtimeConfig};
pub use error::RealtimeError;
pub use listeners::ListenerRegistry;
pub use realtime::{reconnect_delay, to_ws_url, ConnectionState, RealtimeClient};
