//! One board's sync session over a [`Transport`].
//!
//! The session owns the channel layout of a board: it subscribes on every
//! (re)connect, asks for a history replay, paces high-frequency publishes and
//! turns inbound payloads into [`BoardEvent`]s and cursor updates.

use crate::board::BoardEvent;
use crate::config::SyncConfig;
use crate::items::{Item, ItemId};
use crate::protocol::{
    self, CursorUpdate, Destination, ProtocolResult, Topic, decode_board, decode_cursor,
    decode_history,
};
use crate::sync::{SyncError, SyncResult, Transport, TransportEvent};
use crate::throttle::{Instant, Throttle};
use kurbo::Point;
use uuid::Uuid;

/// What a poll of the session produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Connected (or reconnected); subscriptions and the history request
    /// have been sent.
    Connected,
    Disconnected,
    Board(BoardEvent),
    Cursor(CursorUpdate),
}

/// Sync session for a single board.
pub struct BoardSession<T: Transport> {
    transport: T,
    config: SyncConfig,
    participant_id: String,
    stroke_throttle: Throttle,
    cursor_throttle: Throttle,
}

impl<T: Transport> BoardSession<T> {
    /// Create a session with a fresh participant id.
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self::with_participant_id(transport, config, Uuid::new_v4().to_string())
    }

    pub fn with_participant_id(
        transport: T,
        config: SyncConfig,
        participant_id: impl Into<String>,
    ) -> Self {
        Self {
            stroke_throttle: Throttle::new(config.stroke_throttle),
            cursor_throttle: Throttle::new(config.cursor_throttle),
            transport,
            config,
            participant_id: participant_id.into(),
        }
    }

    /// Start connecting to the configured relay.
    pub fn connect(&mut self) -> SyncResult<()> {
        log::info!(
            "Joining board '{}' at {}",
            self.config.board_id,
            self.config.server_url
        );
        self.transport.connect(&self.config.server_url)
    }

    pub fn disconnect(&mut self) {
        self.transport.disconnect();
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn board_id(&self) -> &str {
        &self.config.board_id
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Drain the transport and decode what arrived.
    ///
    /// Malformed payloads are logged and skipped.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        for event in self.transport.poll_events() {
            match event {
                TransportEvent::Connected => {
                    self.on_connected();
                    out.push(SessionEvent::Connected);
                }
                TransportEvent::Disconnected => {
                    log::info!("Disconnected from board '{}'", self.config.board_id);
                    out.push(SessionEvent::Disconnected);
                }
                TransportEvent::Error { message } => {
                    log::warn!("Transport error: {}", message);
                }
                TransportEvent::Message { topic, body } => {
                    if let Some(event) = self.decode(&topic, &body) {
                        out.push(event);
                    }
                }
            }
        }
        out
    }

    /// Subscribe first, then ask for history so the replay cannot be missed.
    fn on_connected(&mut self) {
        log::info!("Connected to board '{}'", self.config.board_id);
        for topic in Topic::ALL {
            let path = topic.path(&self.config.board_id);
            if let Err(e) = self.transport.subscribe(&path) {
                log::warn!("Subscribe to {} failed: {}", path, e);
            }
        }
        self.request_history();
    }

    fn decode(&self, topic: &str, body: &str) -> Option<SessionEvent> {
        let Some(kind) = Topic::parse(topic, &self.config.board_id) else {
            log::debug!("Ignoring message on unknown topic {}", topic);
            return None;
        };
        let decoded: ProtocolResult<SessionEvent> = match kind {
            Topic::Board => decode_board(body).map(SessionEvent::Board),
            Topic::History => decode_history(body).map(SessionEvent::Board),
            Topic::Cursors => decode_cursor(body).map(SessionEvent::Cursor),
        };
        match decoded {
            Ok(event) => Some(event),
            Err(e) => {
                log::warn!("Dropping malformed payload on {}: {}", topic, e);
                None
            }
        }
    }

    fn publish(&mut self, destination: Destination, body: Option<String>) -> bool {
        let path = destination.path(&self.config.board_id);
        match self.transport.publish(&path, body) {
            Ok(()) => true,
            Err(SyncError::NotConnected) => {
                log::debug!("Not connected, dropping publish to {}", path);
                false
            }
            Err(e) => {
                log::warn!("Publish to {} failed: {}", path, e);
                false
            }
        }
    }

    /// Publish a finished item. Never throttled.
    ///
    /// Also re-arms the stroke throttle so the next gesture's first sample
    /// goes out at once.
    pub fn publish_upsert(&mut self, item: &Item) -> bool {
        self.end_stroke();
        match protocol::encode_upsert(item) {
            Ok(body) => self.publish(Destination::Board, Some(body)),
            Err(e) => {
                log::error!("Failed to encode item {}: {}", item.id(), e);
                false
            }
        }
    }

    /// Re-arm the stroke throttle after a stroke is finished or abandoned.
    pub fn end_stroke(&mut self) {
        self.stroke_throttle.reset();
    }

    pub fn publish_delete(&mut self, id: ItemId) -> bool {
        match protocol::encode_delete(id) {
            Ok(body) => self.publish(Destination::Board, Some(body)),
            Err(e) => {
                log::error!("Failed to encode delete {}: {}", id, e);
                false
            }
        }
    }

    /// Publish an in-progress stroke, at most once per stroke interval.
    ///
    /// Returns false when the sample was throttled or could not be sent.
    pub fn publish_stroke(&mut self, item: &Item, now: Instant) -> bool {
        if !self.stroke_throttle.try_fire(now) {
            return false;
        }
        match protocol::encode_upsert(item) {
            Ok(body) => self.publish(Destination::Board, Some(body)),
            Err(e) => {
                log::error!("Failed to encode stroke {}: {}", item.id(), e);
                false
            }
        }
    }

    /// Publish the local cursor (world coordinates), at most once per cursor
    /// interval.
    pub fn publish_cursor(&mut self, position: Point, now: Instant) -> bool {
        if !self.cursor_throttle.try_fire(now) {
            return false;
        }
        let update = CursorUpdate {
            participant_id: self.participant_id.clone(),
            name: self.config.user_name.clone(),
            x: position.x,
            y: position.y,
        };
        match protocol::encode_cursor(&update) {
            Ok(body) => self.publish(Destination::Cursor, Some(body)),
            Err(e) => {
                log::error!("Failed to encode cursor: {}", e);
                false
            }
        }
    }

    pub fn request_history(&mut self) -> bool {
        self.publish(Destination::History, None)
    }

    pub fn request_undo(&mut self) -> bool {
        self.publish(Destination::Undo, None)
    }

    pub fn request_clear(&mut self) -> bool {
        self.publish(Destination::Clear, None)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::items::{ItemKind, ItemStyle, Pen};
    use crate::sync::ConnectionState;
    use std::time::Duration;

    /// Transport double that records what the session sends.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        pub connected: bool,
        pub subscribed: Vec<String>,
        pub published: Vec<(String, Option<String>)>,
        pub inbox: Vec<TransportEvent>,
    }

    impl RecordingTransport {
        pub fn deliver(&mut self, event: TransportEvent) {
            self.inbox.push(event);
        }

        pub fn published_to(&self, destination: &str) -> Vec<Option<String>> {
            self.published
                .iter()
                .filter(|(d, _)| d == destination)
                .map(|(_, b)| b.clone())
                .collect()
        }
    }

    impl Transport for RecordingTransport {
        fn connect(&mut self, _url: &str) -> SyncResult<()> {
            Ok(())
        }

        fn disconnect(&mut self) {
            self.connected = false;
        }

        fn subscribe(&mut self, topic: &str) -> SyncResult<()> {
            if !self.connected {
                return Err(SyncError::NotConnected);
            }
            self.subscribed.push(topic.to_string());
            Ok(())
        }

        fn publish(&mut self, destination: &str, body: Option<String>) -> SyncResult<()> {
            if !self.connected {
                return Err(SyncError::NotConnected);
            }
            self.published.push((destination.to_string(), body));
            Ok(())
        }

        fn poll_events(&mut self) -> Vec<TransportEvent> {
            let events = std::mem::take(&mut self.inbox);
            for event in &events {
                match event {
                    TransportEvent::Connected => self.connected = true,
                    TransportEvent::Disconnected => self.connected = false,
                    _ => {}
                }
            }
            events
        }

        fn state(&self) -> ConnectionState {
            if self.connected {
                ConnectionState::Connected
            } else {
                ConnectionState::Disconnected
            }
        }
    }

    fn session() -> BoardSession<RecordingTransport> {
        BoardSession::with_participant_id(
            RecordingTransport::default(),
            SyncConfig::new("ws://relay", "b1").with_user_name("Ada"),
            "me",
        )
    }

    fn connected_session() -> BoardSession<RecordingTransport> {
        let mut s = session();
        s.transport_mut().deliver(TransportEvent::Connected);
        s.poll();
        s.transport_mut().published.clear();
        s
    }

    fn message(topic: &str, body: &str) -> TransportEvent {
        TransportEvent::Message {
            topic: topic.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_subscribes_before_requesting_history() {
        let mut s = session();
        s.transport_mut().deliver(TransportEvent::Connected);
        assert_eq!(s.poll(), vec![SessionEvent::Connected]);
        assert_eq!(
            s.transport().subscribed,
            vec!["/topic/board/b1", "/topic/history/b1", "/topic/cursors/b1"]
        );
        assert_eq!(
            s.transport().published,
            vec![("/app/history/b1".to_string(), None)]
        );
    }

    #[test]
    fn test_resubscribes_on_every_reconnect() {
        let mut s = session();
        for _ in 0..2 {
            s.transport_mut().deliver(TransportEvent::Connected);
            s.poll();
            s.transport_mut().deliver(TransportEvent::Disconnected);
            assert_eq!(s.poll(), vec![SessionEvent::Disconnected]);
        }
        assert_eq!(s.transport().subscribed.len(), 6);
        assert_eq!(s.transport().published_to("/app/history/b1").len(), 2);
    }

    #[test]
    fn test_decodes_topics() {
        let mut s = connected_session();
        let item = Item::two_point(
            ItemKind::Line,
            Point::ZERO,
            Point::new(1.0, 1.0),
            ItemStyle::default(),
        )
        .unwrap();
        let body = protocol::encode_upsert(&item).unwrap();
        s.transport_mut().deliver(message("/topic/board/b1", &body));
        s.transport_mut().deliver(message("/topic/history/b1", &format!("[{body}]")));
        s.transport_mut().deliver(message(
            "/topic/cursors/b1",
            r#"{"userId":"p","userName":"Bo","x":1,"y":2}"#,
        ));
        let events = s.poll();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], SessionEvent::Board(BoardEvent::Upsert(item.clone())));
        assert_eq!(events[1], SessionEvent::Board(BoardEvent::History(vec![item])));
        assert!(matches!(&events[2], SessionEvent::Cursor(c) if c.name == "Bo"));
    }

    #[test]
    fn test_drops_malformed_and_foreign_messages() {
        let mut s = connected_session();
        s.transport_mut().deliver(message("/topic/board/b1", "{oops"));
        s.transport_mut().deliver(message("/topic/history/b1", r#"{"type":"CLEAR"}"#));
        s.transport_mut().deliver(message("/topic/cursors/b1", r#"{"x":1}"#));
        s.transport_mut().deliver(message("/topic/board/other", r#"{"type":"CLEAR"}"#));
        s.transport_mut().deliver(TransportEvent::Error {
            message: "boom".to_string(),
        });
        assert!(s.poll().is_empty());
    }

    #[test]
    fn test_stroke_publishes_are_throttled() {
        let mut s = connected_session();
        let mut item = Item::Pen(Pen::new(Point::ZERO, ItemStyle::default()));
        let t0 = Instant::now();
        let mut sent = 0;
        for i in 0..100u64 {
            item.extend_to(Point::new(i as f64, 0.0));
            if s.publish_stroke(&item, t0 + Duration::from_millis(i * 3)) {
                sent += 1;
            }
        }
        assert!(sent <= 10);
        assert!(s.publish_upsert(&item));
        assert_eq!(s.transport().published_to("/app/board/b1").len(), sent + 1);
        // The next gesture starts with a fresh window
        assert!(s.publish_stroke(&item, t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_cursor_publish_is_throttled() {
        let mut s = connected_session();
        let t0 = Instant::now();
        assert!(s.publish_cursor(Point::new(1.0, 2.0), t0));
        assert!(!s.publish_cursor(Point::new(2.0, 2.0), t0 + Duration::from_millis(49)));
        assert!(s.publish_cursor(Point::new(3.0, 2.0), t0 + Duration::from_millis(50)));
        let bodies = s.transport().published_to("/app/cursor/b1");
        assert_eq!(bodies.len(), 2);
        let first = decode_cursor(bodies[0].as_deref().unwrap()).unwrap();
        assert_eq!(first.participant_id, "me");
        assert_eq!(first.name, "Ada");
    }

    #[test]
    fn test_publishes_dropped_while_disconnected() {
        let mut s = session();
        let item = Item::Pen(Pen::new(Point::ZERO, ItemStyle::default()));
        assert!(!s.publish_upsert(&item));
        assert!(!s.publish_delete(item.id()));
        assert!(!s.request_undo());
        assert!(!s.request_clear());
        assert!(s.transport().published.is_empty());
    }

    #[test]
    fn test_control_requests_have_empty_bodies() {
        let mut s = connected_session();
        assert!(s.request_undo());
        assert!(s.request_clear());
        assert_eq!(
            s.transport().published,
            vec![
                ("/app/undo/b1".to_string(), None),
                ("/app/clear/b1".to_string(), None)
            ]
        );
    }
}
