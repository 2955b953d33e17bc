//! Pub/sub transport for talking to the relay.
//!
//! [`Transport`] is the capability the session needs: connect, subscribe to
//! topics, publish to destinations and poll for inbound events. On native
//! platforms [`NativeWebSocket`] implements it over a background thread that
//! redials on its own after the connection drops.

use crate::protocol::ClientFrame;
use thiserror::Error;

/// Errors from the transport.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Not connected")]
    NotConnected,
    #[error("Already connected")]
    AlreadyConnected,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Send failed: {0}")]
    Send(String),
    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// Dialing, or waiting to redial after a drop.
    Connecting,
    Connected,
    Error,
}

/// Events from the transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection (re-)established. Subscriptions must be renewed.
    Connected,
    /// Connection lost
    Disconnected,
    /// A payload arrived on a subscribed topic
    Message { topic: String, body: String },
    /// Error occurred
    Error { message: String },
}

/// A topic-based publish/subscribe connection.
///
/// Events are queued by the implementation and drained by `poll_events`
/// from the replica's single thread of control.
pub trait Transport {
    fn connect(&mut self, url: &str) -> SyncResult<()>;

    fn disconnect(&mut self);

    fn subscribe(&mut self, topic: &str) -> SyncResult<()>;

    /// Publish `body` to `destination`. `None` sends an empty request.
    fn publish(&mut self, destination: &str, body: Option<String>) -> SyncResult<()>;

    /// Drain pending events (non-blocking).
    fn poll_events(&mut self) -> Vec<TransportEvent>;

    fn state(&self) -> ConnectionState;

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

/// Serialize a client frame for the wire.
pub fn encode_frame(frame: &ClientFrame) -> SyncResult<String> {
    Ok(serde_json::to_string(frame)?)
}

// ============================================================================
// Native WebSocket Client
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod native_client {
    use super::*;
    use crate::config::RECONNECT_DELAY;
    use crate::protocol::ServerFrame;
    use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::{Duration, Instant};
    use tungstenite::stream::MaybeTlsStream;
    use tungstenite::{Message, WebSocket, connect};
    use url::Url;

    /// Commands sent to the WebSocket thread.
    enum WsCommand {
        Send(String),
        Close,
    }

    /// How a live connection ended.
    enum SessionEnd {
        /// Close was requested or the client was dropped.
        Closed,
        /// The socket failed; redial after the delay.
        Lost,
    }

    /// WebSocket client for native platforms.
    ///
    /// Uses a background thread for non-blocking operation. When the
    /// connection drops the thread waits `reconnect_delay` and dials again
    /// until [`Transport::disconnect`] is called. Commands issued while the
    /// link is down are discarded.
    pub struct NativeWebSocket {
        state: ConnectionState,
        reconnect_delay: Duration,
        /// Channel to send commands to the WebSocket thread.
        cmd_tx: Option<Sender<WsCommand>>,
        /// Channel to receive events from the WebSocket thread.
        event_rx: Option<Receiver<TransportEvent>>,
        /// Handle to the WebSocket thread.
        _thread: Option<JoinHandle<()>>,
    }

    impl NativeWebSocket {
        /// Create a new disconnected WebSocket client.
        pub fn new() -> Self {
            Self::with_reconnect_delay(RECONNECT_DELAY)
        }

        pub fn with_reconnect_delay(reconnect_delay: Duration) -> Self {
            Self {
                state: ConnectionState::Disconnected,
                reconnect_delay,
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }

        fn send_frame(&self, frame: &ClientFrame) -> SyncResult<()> {
            if self.state != ConnectionState::Connected {
                return Err(SyncError::NotConnected);
            }
            let text = encode_frame(frame)?;
            match self.cmd_tx {
                Some(ref tx) => tx
                    .send(WsCommand::Send(text))
                    .map_err(|e| SyncError::Send(e.to_string())),
                None => Err(SyncError::NotConnected),
            }
        }
    }

    impl Default for NativeWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for NativeWebSocket {
        fn connect(&mut self, url: &str) -> SyncResult<()> {
            if self.cmd_tx.is_some() {
                return Err(SyncError::AlreadyConnected);
            }

            let parsed_url = Url::parse(url).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
            if parsed_url.scheme() != "ws" && parsed_url.scheme() != "wss" {
                return Err(SyncError::InvalidUrl(format!(
                    "unsupported scheme: {}",
                    parsed_url.scheme()
                )));
            }

            self.state = ConnectionState::Connecting;

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<TransportEvent>();
            let url = url.to_string();
            let delay = self.reconnect_delay;

            let handle = thread::spawn(move || run_connection(&url, delay, &cmd_rx, &event_tx));

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);

            Ok(())
        }

        fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
            self.state = ConnectionState::Disconnected;
        }

        fn subscribe(&mut self, topic: &str) -> SyncResult<()> {
            self.send_frame(&ClientFrame::Subscribe {
                topic: topic.to_string(),
            })
        }

        fn publish(&mut self, destination: &str, body: Option<String>) -> SyncResult<()> {
            self.send_frame(&ClientFrame::Publish {
                destination: destination.to_string(),
                body,
            })
        }

        fn poll_events(&mut self) -> Vec<TransportEvent> {
            let Some(ref rx) = self.event_rx else {
                return Vec::new();
            };
            let events: Vec<TransportEvent> = rx.try_iter().collect();

            for event in &events {
                match event {
                    TransportEvent::Connected => self.state = ConnectionState::Connected,
                    // The thread is already waiting to redial.
                    TransportEvent::Disconnected => self.state = ConnectionState::Connecting,
                    // A relay error arrives on a live socket and leaves it usable
                    TransportEvent::Error { .. } if self.state != ConnectionState::Connected => {
                        self.state = ConnectionState::Error;
                    }
                    TransportEvent::Error { .. } => {}
                    TransportEvent::Message { .. } => {}
                }
            }

            events
        }

        fn state(&self) -> ConnectionState {
            self.state
        }
    }

    impl Drop for NativeWebSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }

    /// Dial, serve, and redial until closed.
    fn run_connection(
        url: &str,
        delay: Duration,
        cmd_rx: &Receiver<WsCommand>,
        event_tx: &Sender<TransportEvent>,
    ) {
        loop {
            log::info!("WebSocket thread: connecting to {}", url);
            match connect(url) {
                Ok((mut socket, response)) => {
                    log::info!("WebSocket connected, status: {}", response.status());
                    if event_tx.send(TransportEvent::Connected).is_err() {
                        return;
                    }
                    let end = serve(&mut socket, cmd_rx, event_tx);
                    let _ = event_tx.send(TransportEvent::Disconnected);
                    if let SessionEnd::Closed = end {
                        log::info!("WebSocket thread exiting");
                        return;
                    }
                }
                Err(e) => {
                    log::error!("WebSocket connection failed: {}", e);
                    let sent = event_tx.send(TransportEvent::Error {
                        message: format!("Connection failed: {}", e),
                    });
                    if sent.is_err() {
                        return;
                    }
                }
            }

            log::info!("Reconnecting in {:?}", delay);
            if let SessionEnd::Closed = wait_discarding(delay, cmd_rx) {
                return;
            }
        }
    }

    /// Sleep for `delay` while dropping any queued sends.
    fn wait_discarding(delay: Duration, cmd_rx: &Receiver<WsCommand>) -> SessionEnd {
        let deadline = Instant::now() + delay;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return SessionEnd::Lost;
            }
            match cmd_rx.recv_timeout(remaining) {
                Ok(WsCommand::Send(_)) => log::debug!("Dropping send while offline"),
                Ok(WsCommand::Close) | Err(RecvTimeoutError::Disconnected) => {
                    return SessionEnd::Closed;
                }
                Err(RecvTimeoutError::Timeout) => return SessionEnd::Lost,
            }
        }
    }

    fn serve(
        socket: &mut WebSocket<MaybeTlsStream<std::net::TcpStream>>,
        cmd_rx: &Receiver<WsCommand>,
        event_tx: &Sender<TransportEvent>,
    ) -> SessionEnd {
        // Read timeout on the TCP stream keeps the loop responsive to commands
        match socket.get_mut() {
            MaybeTlsStream::Plain(tcp) => {
                let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
            }
            #[allow(unreachable_patterns)]
            _ => {
                log::debug!("TLS or other stream - using default timeout handling");
            }
        }

        loop {
            match cmd_rx.try_recv() {
                Ok(WsCommand::Send(msg)) => {
                    log::debug!(
                        "WebSocket sending: {}",
                        msg.chars().take(100).collect::<String>()
                    );
                    if let Err(e) = socket.send(Message::Text(msg)) {
                        log::error!("WebSocket send error: {}", e);
                        return SessionEnd::Lost;
                    }
                }
                Ok(WsCommand::Close) => {
                    log::info!("WebSocket close requested");
                    let _ = socket.close(None);
                    return SessionEnd::Closed;
                }
                Err(TryRecvError::Disconnected) => {
                    log::info!("WebSocket command channel disconnected");
                    let _ = socket.close(None);
                    return SessionEnd::Closed;
                }
                Err(TryRecvError::Empty) => {}
            }

            match socket.read() {
                Ok(Message::Text(txt)) => match serde_json::from_str::<ServerFrame>(&txt) {
                    Ok(ServerFrame::Message { topic, body }) => {
                        if event_tx.send(TransportEvent::Message { topic, body }).is_err() {
                            return SessionEnd::Closed;
                        }
                    }
                    Ok(ServerFrame::Error { message }) => {
                        log::warn!("Relay error: {}", message);
                        let _ = event_tx.send(TransportEvent::Error { message });
                    }
                    Err(e) => log::warn!("Failed to parse server frame: {}", e),
                },
                Ok(Message::Ping(data)) => {
                    let _ = socket.send(Message::Pong(data));
                }
                Ok(Message::Close(_)) => {
                    log::info!("WebSocket received close frame");
                    return SessionEnd::Lost;
                }
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => {
                    log::error!("WebSocket read error: {}", e);
                    return SessionEnd::Lost;
                }
            }
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
pub use native_client::NativeWebSocket;

/// Platform WebSocket transport.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformWebSocket = NativeWebSocket;
