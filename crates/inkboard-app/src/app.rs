//! Headless replica driver.

use inkboard_core::{
    BoardSession, Instant, MouseButton, NativeWebSocket, PointerEvent, SyncConfig, SyncError,
    ToolKind, Whiteboard,
};
use kurbo::Point;
use std::thread;
use std::time::Duration;

/// Interval between polls, roughly one display frame.
const FRAME: Duration = Duration::from_millis(16);

/// Longest wait for the first connection before giving up.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub type Replica = Whiteboard<NativeWebSocket>;

/// Open a replica of `config.board_id` and wait until it is connected.
pub fn join(config: SyncConfig) -> Result<Replica, SyncError> {
    let transport = NativeWebSocket::with_reconnect_delay(config.reconnect_delay);
    let mut board = Whiteboard::new(BoardSession::new(transport, config));
    board.connect()?;

    let deadline = std::time::Instant::now() + CONNECT_TIMEOUT;
    while !board.session().is_connected() {
        board.poll();
        if std::time::Instant::now() >= deadline {
            return Err(SyncError::NotConnected);
        }
        thread::sleep(FRAME);
    }
    log::info!(
        "Joined board {} as {}",
        board.session().board_id(),
        board.session().participant_id()
    );
    Ok(board)
}

/// Keep polling for `duration`, returning how many events were applied.
pub fn settle(board: &mut Replica, duration: Duration) -> usize {
    let deadline = std::time::Instant::now() + duration;
    let mut applied = 0;
    loop {
        applied += board.poll();
        if std::time::Instant::now() >= deadline {
            return applied;
        }
        thread::sleep(FRAME);
    }
}

/// Draw a two-point shape by replaying the pointer gesture a user would make.
pub fn draw_shape(board: &mut Replica, tool: ToolKind, from: Point, to: Point) {
    board.controller_mut().set_tool(tool);
    board.pointer(
        PointerEvent::Down {
            position: from,
            button: MouseButton::Left,
        },
        Instant::now(),
    );
    board.pointer(PointerEvent::Move { position: to }, Instant::now());
    board.pointer(
        PointerEvent::Up {
            position: to,
            button: MouseButton::Left,
        },
        Instant::now(),
    );
}
