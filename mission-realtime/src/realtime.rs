//! WebSocket push-channel client with reconnect backoff.

use crate::config::{ReconnectConfig, RealtimeConfig};
use crate::error::RealtimeError;
use crate::listeners::ListenerRegistry;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `http` becomes `ws` and `https` becomes `wss`; `ws`/`wss` pass through.
/// Any other scheme is rejected.
pub fn to_ws_url(url: &str) -> Option<String> {
    let url = url.trim();
    let (scheme, rest) = url.split_once("://")?;
    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return None,
    };
    if rest.is_empty() {
        return None;
    }
    Some(format!("{scheme}://{rest}"))
}

/// Delay before reconnect attempt `attempt` (counted from 1):
/// `base × 2^attempt`.
pub fn reconnect_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

#[derive(Serialize)]
struct AuthFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

enum SessionEnd {
    Closed,
    Cancelled,
}

/// Reconnecting client for the dashboard push channel.
///
/// Cloning is cheap; clones share the connection and listeners.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<Inner>,
}

struct Inner {
    url: String,
    token: Option<String>,
    reconnect: ReconnectConfig,
    listeners: ListenerRegistry,
    state: watch::Sender<ConnectionState>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    /// Dropping the sender stops the connection task, including a pending
    /// reconnect.
    shutdown: Mutex<Option<watch::Sender<()>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// True once `disconnect()` (or a newer `connect()`) has retired this task.
fn cancelled(shutdown: &watch::Receiver<()>) -> bool {
    shutdown.has_changed().is_err()
}

impl RealtimeClient {
    pub fn new(config: &RealtimeConfig) -> Result<Self, RealtimeError> {
        let url = to_ws_url(&config.url).ok_or_else(|| RealtimeError::InvalidUrl(config.url.clone()))?;
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Ok(Self {
            inner: Arc::new(Inner {
                url,
                token: config.token.clone(),
                reconnect: config.reconnect.clone(),
                listeners: ListenerRegistry::new(),
                state,
                outbound: Mutex::new(None),
                shutdown: Mutex::new(None),
            }),
        })
    }

    /// The rewritten `ws`/`wss` endpoint.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Follow state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Register `listener` for frames whose `type` is `event_type`.
    pub fn on<F>(&self, event_type: &str, listener: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.listeners.on(event_type, listener);
    }

    /// Open the socket and send the auth frame.
    ///
    /// On failure the error is returned and reconnecting starts in the
    /// background, as it does whenever an open connection closes.
    pub async fn connect(&self) -> Result<(), RealtimeError> {
        let shutdown = self.inner.restart();
        self.inner.state.send_replace(ConnectionState::Connecting);

        match self.inner.open().await {
            Ok(mut socket) => {
                let Some(outbound) = self.inner.attach(&shutdown) else {
                    let _ = socket.close(None).await;
                    return Err(RealtimeError::Cancelled);
                };
                info!(url = %self.inner.url, "Push channel connected");
                tokio::spawn(drive(Arc::clone(&self.inner), Some((socket, outbound)), shutdown));
                Ok(())
            }
            Err(e) => {
                warn!(url = %self.inner.url, error = %e, "Push channel connect failed");
                tokio::spawn(drive(Arc::clone(&self.inner), None, shutdown));
                Err(e)
            }
        }
    }

    /// Write `frame` as JSON. Only writes while connected; otherwise the
    /// frame is dropped and `false` returned.
    pub fn send<T: Serialize + ?Sized>(&self, frame: &T) -> bool {
        if self.state() != ConnectionState::Connected {
            return false;
        }
        let text = match serde_json::to_string(frame) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Dropping unencodable frame");
                return false;
            }
        };
        match locked(&self.inner.outbound).as_ref() {
            Some(tx) => tx.send(Message::Text(text)).is_ok(),
            None => false,
        }
    }

    /// Close the socket and cancel any pending reconnect.
    pub fn disconnect(&self) {
        let was_running = locked(&self.inner.shutdown).take().is_some();
        self.inner.detach();
        self.inner.state.send_replace(ConnectionState::Disconnected);
        if was_running {
            info!("Push channel disconnected");
        }
    }
}

impl fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("url", &self.inner.url)
            .field("state", &self.state())
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}

impl Inner {
    /// Retire any running connection task and hand out a fresh shutdown
    /// signal for the next one.
    fn restart(&self) -> watch::Receiver<()> {
        let (tx, rx) = watch::channel(());
        *locked(&self.shutdown) = Some(tx);
        self.detach();
        rx
    }

    async fn open(&self) -> Result<Socket, RealtimeError> {
        let (mut socket, _) = connect_async(self.url.as_str()).await?;
        let auth = AuthFrame {
            kind: "auth",
            token: self.token.as_deref(),
        };
        socket.send(Message::Text(serde_json::to_string(&auth)?)).await?;
        Ok(socket)
    }

    /// Install a fresh outbound queue and mark the client connected, unless
    /// this task has been retired. The check runs under the outbound lock,
    /// which `disconnect()` takes before resetting the state.
    fn attach(&self, shutdown: &watch::Receiver<()>) -> Option<mpsc::UnboundedReceiver<Message>> {
        let mut outbound = locked(&self.outbound);
        if cancelled(shutdown) {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *outbound = Some(tx);
        self.state.send_replace(ConnectionState::Connected);
        Some(rx)
    }

    fn detach(&self) {
        locked(&self.outbound).take();
    }

    /// Set `state` unless this task has been retired. Returns false when
    /// it has.
    fn transition(&self, shutdown: &watch::Receiver<()>, state: ConnectionState) -> bool {
        if cancelled(shutdown) {
            return false;
        }
        self.state.send_replace(state);
        true
    }

    fn dispatch(&self, text: &str) {
        let frame: Value = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable frame");
                return;
            }
        };
        let Some(event_type) = frame.get("type").and_then(Value::as_str) else {
            warn!("Dropping frame without a type");
            return;
        };
        let delivered = self.listeners.emit(event_type, &frame);
        debug!(event_type, delivered, "Dispatched frame");
    }

    async fn session(
        &self,
        socket: Socket,
        mut outbound: mpsc::UnboundedReceiver<Message>,
        shutdown: &mut watch::Receiver<()>,
    ) -> SessionEnd {
        let (mut sink, mut stream) = socket.split();
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return SessionEnd::Cancelled;
                }
                Some(frame) = outbound.recv() => {
                    if let Err(e) = sink.send(frame).await {
                        warn!(error = %e, "Push channel write failed");
                        return SessionEnd::Closed;
                    }
                }
                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Text(text))) => self.dispatch(&text),
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::Closed,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Push channel read failed");
                        return SessionEnd::Closed;
                    }
                }
            }
        }
    }
}

/// Connection task: runs the open session, then reconnects with backoff
/// until it succeeds, runs out of attempts, or is cancelled.
async fn drive(
    inner: Arc<Inner>,
    mut connection: Option<(Socket, mpsc::UnboundedReceiver<Message>)>,
    mut shutdown: watch::Receiver<()>,
) {
    let mut attempt: u32 = 0;
    loop {
        if let Some((socket, outbound)) = connection.take() {
            attempt = 0;
            match inner.session(socket, outbound, &mut shutdown).await {
                SessionEnd::Cancelled => return,
                SessionEnd::Closed => {
                    if cancelled(&shutdown) {
                        return;
                    }
                    inner.detach();
                    info!("Push channel closed");
                }
            }
        }

        attempt += 1;
        if attempt > inner.reconnect.max_attempts {
            if inner.transition(&shutdown, ConnectionState::Disconnected) {
                warn!(
                    attempts = inner.reconnect.max_attempts,
                    "Giving up on the push channel"
                );
            }
            return;
        }

        let delay = reconnect_delay(inner.reconnect.base_delay(), attempt);
        if !inner.transition(&shutdown, ConnectionState::Reconnecting) {
            return;
        }
        info!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting push channel");
        tokio::select! {
            _ = shutdown.changed() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        if !inner.transition(&shutdown, ConnectionState::Connecting) {
            return;
        }
        match inner.open().await {
            Ok(mut socket) => {
                let Some(outbound) = inner.attach(&shutdown) else {
                    let _ = socket.close(None).await;
                    return;
                };
                info!(attempt, "Push channel reconnected");
                connection = Some((socket, outbound));
            }
            Err(e) => warn!(attempt, error = %e, "Reconnect failed"),
        }
    }
}
