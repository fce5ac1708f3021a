//! Time management for the game loop.
//!
//! The clock is driven by the frame deltas handed to it, never by the wall
//! clock, so a recorded sequence of deltas replays to the same game times.

use std::time::Duration;

/// Length of the reference frame that per-frame speeds are tuned against.
pub const REFERENCE_FRAME: Duration = Duration::from_millis(16);

/// Game time and frame count.
#[derive(Debug, Clone, Default)]
pub struct GameClock {
    /// Duration of the last frame.
    delta: Duration,
    /// Total game time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl GameClock {
    /// Create a clock at game time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame of length `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.delta = dt;
        self.elapsed += dt;
        self.frame_count += 1;
    }

    /// Current game time.
    pub fn now(&self) -> Duration {
        self.elapsed
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Back to game time zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// A delta expressed in reference frames.
pub fn frame_scale(dt: Duration) -> f32 {
    dt.as_secs_f32() / REFERENCE_FRAME.as_secs_f32()
}

/// Milliseconds from the catalog to a Duration.
pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
