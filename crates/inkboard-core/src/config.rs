//! Replica configuration.

use crate::protocol::GUEST_NAME;
use std::time::Duration;

/// Minimum spacing between in-progress stroke publishes.
pub const STROKE_THROTTLE: Duration = Duration::from_millis(30);
/// Minimum spacing between cursor publishes.
pub const CURSOR_THROTTLE: Duration = Duration::from_millis(50);
/// Wait before the transport dials again after losing the connection.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8080/ws";
pub const DEFAULT_BOARD: &str = "default";

/// Connection and pacing settings for one board session.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// WebSocket URL of the relay (`ws://` or `wss://`).
    pub server_url: String,
    pub board_id: String,
    /// Display name shown next to this participant's cursor.
    pub user_name: String,
    pub stroke_throttle: Duration,
    pub cursor_throttle: Duration,
    pub reconnect_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            board_id: DEFAULT_BOARD.to_string(),
            user_name: GUEST_NAME.to_string(),
            stroke_throttle: STROKE_THROTTLE,
            cursor_throttle: CURSOR_THROTTLE,
            reconnect_delay: RECONNECT_DELAY,
        }
    }
}

impl SyncConfig {
    pub fn new(server_url: impl Into<String>, board_id: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            board_id: board_id.into(),
            ..Self::default()
        }
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.user_name = name;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.stroke_throttle, Duration::from_millis(30));
        assert_eq!(config.cursor_throttle, Duration::from_millis(50));
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
        assert_eq!(config.user_name, "Guest");
    }

    #[test]
    fn test_blank_name_keeps_guest() {
        let config = SyncConfig::new("ws://x", "b").with_user_name("  ");
        assert_eq!(config.user_name, "Guest");
        let config = SyncConfig::new("ws://x", "b").with_user_name("Ada");
        assert_eq!(config.user_name, "Ada");
        assert_eq!(config.board_id, "b");
    }
}
