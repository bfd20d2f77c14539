//! Timed dialogue turns.

use std::time::Duration;

/// Tracks how long the line on screen has been up.
///
/// Driven by explicit [`advance`](Self::advance) calls from the game loop,
/// never by wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTimer {
    duration: Duration,
    elapsed: Duration,
}

impl TurnTimer {
    /// Start a turn of the given length.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Advance the turn by `dt`.
    ///
    /// Returns the part of `dt` left over once the turn is done, or `None`
    /// while it is still running.
    pub fn advance(&mut self, dt: Duration) -> Option<Duration> {
        let total = self.elapsed.saturating_add(dt);
        self.elapsed = total.min(self.duration);
        total.checked_sub(self.duration)
    }

    /// Whether a skip may cut the turn short.
    pub fn can_skip(&self, guard: Duration) -> bool {
        self.elapsed >= guard
    }

    /// Time until the turn ends on its own.
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }
}
