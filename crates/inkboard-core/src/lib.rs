//! Inkboard Core Library
//!
//! Client-replica engine for a shared whiteboard: the canonical item store,
//! the pub/sub sync protocol that keeps replicas converged, throttled
//! publishing of in-progress edits, the pan/zoom camera and the hit-testing
//! geometry behind pointer-driven editing.

pub mod board;
pub mod camera;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod input;
pub mod items;
pub mod presence;
pub mod protocol;
pub mod session;
pub mod sync;
pub mod throttle;
pub mod tools;
pub mod whiteboard;

pub use board::{BoardEvent, BoardStore};
pub use camera::Camera;
pub use config::SyncConfig;
pub use controller::{Command, InteractionController};
pub use input::{Modifiers, MouseButton, PointerEvent};
pub use items::{Item, ItemId, ItemKind, ItemStyle, ItemTrait, SerializableColor};
pub use presence::{PresenceRecord, PresenceTracker};
pub use protocol::{CursorUpdate, Destination, Topic};
pub use session::{BoardSession, SessionEvent};
pub use sync::{ConnectionState, SyncError, Transport, TransportEvent};
#[cfg(not(target_arch = "wasm32"))]
pub use sync::{NativeWebSocket, PlatformWebSocket};
pub use throttle::{Instant, Throttle};
pub use tools::ToolKind;
pub use whiteboard::Whiteboard;
