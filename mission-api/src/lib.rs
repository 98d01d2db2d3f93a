//! Mission Control API - HTTP and WebSocket Layer
//!
//! Serves the dashboard's read models from the workspace directory, the
//! two review mutations (suggested tasks, outbound chat), and a push
//! channel that announces those mutations to connected dashboards.
//!
//! Every read endpoint answers 200: when the workspace has nothing usable
//! the response carries fallback data instead.

pub mod config;
pub mod error;
pub mod events;
pub mod macros;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod ws;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use events::DashboardEvent;
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use types::*;
pub use ws::WsState;
