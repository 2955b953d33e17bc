//! Wire protocol: channel names, the frame envelope and payload codecs.
//!
//! Every board has three subscription topics and five publish destinations.
//! Frames travel as JSON text over the WebSocket; payload bodies are JSON
//! documents carried as strings inside the frames.

use crate::board::BoardEvent;
use crate::items::{Item, ItemId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors decoding inbound payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Payload has no `type`")]
    MissingType,
    #[error("DELETE payload has no valid `id`")]
    MissingId,
    #[error("History payload is not an array")]
    NotAnArray,
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Channels a replica subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Live item upserts, deletes and clears.
    Board,
    /// Full item list replayed on request.
    History,
    /// Other participants' cursor positions.
    Cursors,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Board, Topic::History, Topic::Cursors];

    pub fn path(self, board_id: &str) -> String {
        let name = match self {
            Topic::Board => "board",
            Topic::History => "history",
            Topic::Cursors => "cursors",
        };
        format!("/topic/{name}/{board_id}")
    }

    /// Inverse of [`Topic::path`] for a given board.
    pub fn parse(path: &str, board_id: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|t| t.path(board_id) == path)
    }
}

/// Destinations a replica publishes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Item upserts and deletes.
    Board,
    /// Ask the relay to replay the board on the history topic.
    History,
    Cursor,
    /// Ask the relay to drop the most recent item.
    Undo,
    /// Ask the relay to empty the board.
    Clear,
}

impl Destination {
    pub fn path(self, board_id: &str) -> String {
        let name = match self {
            Destination::Board => "board",
            Destination::History => "history",
            Destination::Cursor => "cursor",
            Destination::Undo => "undo",
            Destination::Clear => "clear",
        };
        format!("/app/{name}/{board_id}")
    }
}

/// Frames sent to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe {
        topic: String,
    },
    Publish {
        destination: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
}

/// Frames received from the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// A payload delivered on a subscribed topic.
    Message { topic: String, body: String },
    Error { message: String },
}

/// A participant's pointer position in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorUpdate {
    #[serde(rename = "userId", alias = "participantId")]
    pub participant_id: String,
    #[serde(rename = "userName", alias = "name", default = "default_name")]
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Name shown for participants that did not give one.
pub const GUEST_NAME: &str = "Guest";

fn default_name() -> String {
    GUEST_NAME.to_string()
}

#[derive(Serialize)]
struct DeletePayload {
    #[serde(rename = "type")]
    kind: &'static str,
    id: ItemId,
}

/// Body for an upsert on the board destination.
pub fn encode_upsert(item: &Item) -> serde_json::Result<String> {
    serde_json::to_string(item)
}

/// Body for a delete on the board destination.
pub fn encode_delete(id: ItemId) -> serde_json::Result<String> {
    serde_json::to_string(&DeletePayload { kind: "DELETE", id })
}

pub fn encode_cursor(update: &CursorUpdate) -> serde_json::Result<String> {
    serde_json::to_string(update)
}

/// Decode a payload from the board topic.
///
/// `CLEAR` and `DELETE` are control messages; any other `type` must be an
/// item kind and is read as an upsert.
pub fn decode_board(body: &str) -> ProtocolResult<BoardEvent> {
    let value: Value = serde_json::from_str(body)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?;
    match kind {
        "CLEAR" => Ok(BoardEvent::Clear),
        "DELETE" => {
            let id = value
                .get("id")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<ItemId>().ok())
                .ok_or(ProtocolError::MissingId)?;
            Ok(BoardEvent::Delete(id))
        }
        _ => Ok(BoardEvent::Upsert(serde_json::from_value(value)?)),
    }
}

/// Decode a payload from the history topic.
///
/// Entries that fail to decode are skipped, each logged; a body that is not
/// an array fails as a whole.
pub fn decode_history(body: &str) -> ProtocolResult<BoardEvent> {
    let value: Value = serde_json::from_str(body)?;
    let Value::Array(entries) = value else {
        return Err(ProtocolError::NotAnArray);
    };
    let items = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Item>(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping malformed history entry: {}", e);
                None
            }
        })
        .collect();
    Ok(BoardEvent::History(items))
}

pub fn decode_cursor(body: &str) -> ProtocolResult<CursorUpdate> {
    Ok(serde_json::from_str(body)?)
}
