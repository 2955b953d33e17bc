//! A complete board replica.
//!
//! [`Whiteboard`] ties the store, camera, presence and controller to a sync
//! session and runs them from a single thread of control: the host feeds it
//! pointer events and calls [`Whiteboard::poll`] once per frame.

use crate::board::BoardStore;
use crate::camera::Camera;
use crate::controller::{Command, InteractionController};
use crate::input::PointerEvent;
use crate::presence::PresenceTracker;
use crate::session::{BoardSession, SessionEvent};
use crate::sync::{SyncResult, Transport};
use crate::throttle::Instant;

/// Local replica of one shared board.
pub struct Whiteboard<T: Transport> {
    store: BoardStore,
    camera: Camera,
    presence: PresenceTracker,
    controller: InteractionController,
    session: BoardSession<T>,
}

impl<T: Transport> Whiteboard<T> {
    pub fn new(session: BoardSession<T>) -> Self {
        Self {
            store: BoardStore::new(),
            camera: Camera::new(),
            presence: PresenceTracker::new(session.participant_id()),
            controller: InteractionController::new(),
            session,
        }
    }

    pub fn connect(&mut self) -> SyncResult<()> {
        self.session.connect()
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    /// Apply everything the relay sent since the last poll.
    ///
    /// Returns the number of board and cursor events applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        for event in self.session.poll() {
            match event {
                SessionEvent::Board(event) => {
                    self.store.apply(event);
                    applied += 1;
                }
                SessionEvent::Cursor(update) => {
                    if self.presence.record_cursor(update) {
                        applied += 1;
                    }
                }
                SessionEvent::Connected => {
                    log::debug!("Replica resynchronizing ({} items held)", self.store.len());
                }
                SessionEvent::Disconnected => {}
            }
        }
        applied
    }

    /// Feed one pointer event, publishing whatever it produced.
    pub fn pointer(&mut self, event: PointerEvent, now: Instant) {
        let commands = self
            .controller
            .handle_pointer(event, &mut self.camera, &mut self.store);
        self.dispatch(commands, now);
    }

    /// Commit the open text entry.
    pub fn commit_text(&mut self, text: &str) {
        if let Some(command) = self.controller.commit_text(text, &mut self.store) {
            self.dispatch(vec![command], Instant::now());
        }
    }

    pub fn cancel_text(&mut self) {
        self.controller.cancel_text();
    }

    /// Abort the gesture in progress without publishing it.
    pub fn cancel_gesture(&mut self) {
        self.controller.cancel();
        self.session.end_stroke();
    }

    pub fn undo(&mut self) {
        let command = self.controller.request_undo();
        self.dispatch(vec![command], Instant::now());
    }

    pub fn clear(&mut self) {
        let command = self.controller.request_clear(&mut self.store);
        self.dispatch(vec![command], Instant::now());
    }

    fn dispatch(&mut self, commands: Vec<Command>, now: Instant) {
        for command in commands {
            match command {
                Command::Upsert(item) => {
                    self.session.publish_upsert(&item);
                }
                Command::Delete(id) => {
                    self.session.publish_delete(id);
                }
                Command::Clear => {
                    self.session.request_clear();
                }
                Command::Undo => {
                    self.session.request_undo();
                }
                Command::StrokeProgress(item) => {
                    self.session.publish_stroke(&item, now);
                }
                Command::Cursor(position) => {
                    self.session.publish_cursor(position, now);
                }
            }
        }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    pub fn session(&self) -> &BoardSession<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut BoardSession<T> {
        &mut self.session
    }
}
