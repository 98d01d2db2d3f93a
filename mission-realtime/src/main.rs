//! `mission-watch`: follow the dashboard push channel from a terminal.
//!
//! Loads a `RealtimeConfig` (`--config <path>` or `MISSION_REALTIME_CONFIG`)
//! and logs every frame until interrupted or the client gives up
//! reconnecting.

use mission_realtime::{ConnectionState, RealtimeClient, RealtimeConfig, RealtimeError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const WATCHED_EVENTS: [&str; 4] = ["connected", "task_reviewed", "chat_queued", "error"];

#[tokio::main]
async fn main() -> Result<(), RealtimeError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    let config = RealtimeConfig::load()?;
    let client = RealtimeClient::new(&config)?;
    for event_type in WATCHED_EVENTS {
        client.on(event_type, move |frame| {
            tracing::info!(event_type, %frame, "Push event");
        });
    }

    if let Err(e) = client.connect().await {
        tracing::warn!(url = client.url(), error = %e, "Initial connect failed, retrying");
    }

    let mut state = client.watch_state();
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
        _ = state.wait_for(|s| *s == ConnectionState::Disconnected) => {
            tracing::warn!("Push channel unavailable, exiting");
        }
    }

    client.disconnect();
    Ok(())
}
