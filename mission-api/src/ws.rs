//! Push Channel
//!
//! `GET /api/ws` upgrades to a WebSocket that streams [`DashboardEvent`]s
//! to dashboard clients.
//!
//! ## Protocol
//!
//! 1. Client connects and sends `{"type":"auth","token":...}` within 10 s
//! 2. When a gateway token is configured the token must match; otherwise
//!    the server sends `{"type":"error"}` and closes
//! 3. Server sends `{"type":"connected"}`
//! 4. Server forwards every broadcast event as a JSON text frame
//!
//! Events are distributed through a bounded broadcast channel. A client
//! that falls behind skips the lagged events and is told how many.

use crate::events::DashboardEvent;
use crate::telemetry::metrics;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// How long a new connection may take to send its auth frame.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Push channel state shared across the application.
#[derive(Clone)]
pub struct WsState {
    tx: broadcast::Sender<DashboardEvent>,
    gateway_token: Option<String>,
}

impl WsState {
    /// Create a push channel with the given per-subscriber buffer.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            gateway_token: None,
        }
    }

    /// Require `token` in every client's auth frame.
    pub fn with_gateway_token(mut self, token: Option<String>) -> Self {
        self.gateway_token = token;
        self
    }

    /// Broadcast an event to all connected clients. Never blocks; with no
    /// subscribers the event is dropped.
    pub fn broadcast(&self, event: DashboardEvent) {
        let event_type = event.event_type();
        match self.tx.send(event) {
            Ok(receivers) => debug!(event_type, receivers, "Broadcast event"),
            Err(_) => debug!(event_type, "No receivers for event"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    /// Whether `frame` is an acceptable auth frame.
    pub fn authorize(&self, frame: &str) -> bool {
        #[derive(Deserialize)]
        struct AuthFrame {
            #[serde(rename = "type")]
            kind: String,
            #[serde(default)]
            token: Option<String>,
        }

        let Ok(auth) = serde_json::from_str::<AuthFrame>(frame) else {
            return false;
        };
        if auth.kind != "auth" {
            return false;
        }
        match self.gateway_token.as_deref() {
            Some(expected) => auth.token.as_deref() == Some(expected),
            None => true,
        }
    }
}

/// GET /api/ws - Upgrade to the push channel
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut sender, mut receiver) = socket.split();

    let first = tokio::time::timeout(AUTH_TIMEOUT, receiver.next()).await;
    let authorized = match first {
        Ok(Some(Ok(Message::Text(text)))) => state.authorize(&text),
        Ok(_) => false,
        Err(_) => {
            debug!("Push client did not authenticate in time");
            false
        }
    };
    if !authorized {
        warn!("Push client rejected");
        let refusal = DashboardEvent::Error {
            message: "Authentication failed".to_string(),
        };
        let _ = send_event(&mut sender, &refusal).await;
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    // Subscribe before acknowledging so nothing broadcast after
    // `connected` is missed.
    let mut rx = state.subscribe();
    if let Err(e) = send_event(&mut sender, &DashboardEvent::Connected).await {
        error!(error = %e, "Failed to send connected frame");
        return;
    }

    if let Some(m) = metrics() {
        m.ws_connected();
    }
    info!("Push client connected");

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if let Err(e) = send_event(&mut sender, &event).await {
                            debug!(error = %e, "Failed to send event, closing connection");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Client lagged, some events were dropped");
                        let notice = DashboardEvent::Error {
                            message: format!("Lagged: {} events dropped", skipped),
                        };
                        if send_event(&mut sender, &notice).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Broadcast channel closed");
                        break;
                    }
                }
            }

            _ = &mut recv_task => {
                debug!("Receiver task finished");
                break;
            }
        }
    }

    recv_task.abort();
    if let Some(m) = metrics() {
        m.ws_disconnected();
    }
    info!("Push client disconnected");
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &DashboardEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(|e| {
        error!(error = %e, "Failed to serialize event");
        axum::Error::new(e)
    })?;
    sender.send(Message::Text(json)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_broadcast_no_receivers() {
        let state = WsState::new(8);
        state.broadcast(DashboardEvent::Connected);
    }

    #[test]
    fn test_broadcast_with_receiver() {
        let state = WsState::new(8);
        let mut rx = state.subscribe();
        let event = DashboardEvent::TaskReviewed { task: json!({"id": "task-1"}) };
        state.broadcast(event.clone());
        assert_eq!(rx.try_recv().ok(), Some(event));
    }

    #[test]
    fn test_lagged_receiver_skips() {
        let state = WsState::new(2);
        let mut rx = state.subscribe();
        for i in 0..5 {
            state.broadcast(DashboardEvent::Error { message: i.to_string() });
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(3))
        ));
        assert_eq!(
            rx.try_recv().ok(),
            Some(DashboardEvent::Error { message: "3".into() })
        );
    }

    #[test]
    fn test_authorize_without_gateway_token() {
        let state = WsState::new(1);
        assert!(state.authorize(r#"{"type":"auth"}"#));
        assert!(state.authorize(r#"{"type":"auth","token":"anything"}"#));
        assert!(!state.authorize(r#"{"type":"hello"}"#));
        assert!(!state.authorize("not json"));
    }

    #[test]
    fn test_authorize_with_gateway_token() {
        let state = WsState::new(1).with_gateway_token(Some("s3cret".into()));
        assert!(state.authorize(r#"{"type":"auth","token":"s3cret"}"#));
        assert!(!state.authorize(r#"{"type":"auth","token":"wrong"}"#));
        assert!(!state.authorize(r#"{"type":"auth"}"#));
    }
}
