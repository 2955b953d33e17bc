//! Leading-edge rate limiting for high-frequency publishes.

use std::time::Duration;

#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Lets at most one event through per `interval`.
///
/// The first event fires immediately. Events arriving before the interval has
/// elapsed are rejected, not deferred: the caller drops them.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    /// Returns true and records `now` if an event may fire at `now`.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        let ready = match self.last_fired {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if ready {
            self.last_fired = Some(now);
        }
        ready
    }

    /// Forget the last firing so the next event passes.
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
