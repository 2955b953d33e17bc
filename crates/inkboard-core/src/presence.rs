//! Remote participants' cursors.

use crate::protocol::CursorUpdate;
use kurbo::Point;
use std::collections::HashMap;

/// Last known cursor of one remote participant.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceRecord {
    pub name: String,
    /// World coordinates.
    pub position: Point,
}

/// Latest cursor per remote participant.
///
/// The local participant is never tracked, even if the relay echoes its
/// own cursor back.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    own_id: String,
    peers: HashMap<String, PresenceRecord>,
}

impl PresenceTracker {
    pub fn new(own_id: impl Into<String>) -> Self {
        Self {
            own_id: own_id.into(),
            peers: HashMap::new(),
        }
    }

    pub fn own_id(&self) -> &str {
        &self.own_id
    }

    /// Record a cursor, overwriting any previous position.
    ///
    /// Returns false when the update is the local participant's own.
    pub fn record_cursor(&mut self, update: CursorUpdate) -> bool {
        if update.participant_id == self.own_id {
            return false;
        }
        self.peers.insert(
            update.participant_id,
            PresenceRecord {
                name: update.name,
                position: Point::new(update.x, update.y),
            },
        );
        true
    }

    pub fn remove(&mut self, participant_id: &str) -> Option<PresenceRecord> {
        self.peers.remove(participant_id)
    }

    pub fn clear(&mut self) {
        self.peers.clear();
    }

    pub fn get(&self, participant_id: &str) -> Option<&PresenceRecord> {
        self.peers.get(participant_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PresenceRecord)> {
        self.peers.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
