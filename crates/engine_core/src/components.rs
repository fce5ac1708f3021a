//! Common ECS components used across the engine.

use std::time::Duration;

use glam::Vec2;

/// Velocity component for moving entities, in pixels per reference frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec2,
}

impl Velocity {
    pub fn new(linear: Vec2) -> Self {
        Self { linear }
    }

    pub fn from_heading(heading: f32, speed: f32) -> Self {
        Self {
            linear: Vec2::from_angle(heading) * speed,
        }
    }

    pub fn speed(&self) -> f32 {
        self.linear.length()
    }
}

/// Health component for damageable entities.
///
/// `current` always stays within `0..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage and return how much was actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.current);
        self.current -= dealt;
        dealt
    }

    /// Drop straight to zero. Returns the health that was removed.
    pub fn deplete(&mut self) -> u32 {
        std::mem::take(&mut self.current)
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Lifetime component for temporary entities (projectiles, effects).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    pub remaining: Duration,
    pub total: Duration,
}

impl Lifetime {
    pub fn new(total: Duration) -> Self {
        Self {
            remaining: total,
            total,
        }
    }

    /// Tick the lifetime down. Returns true once expired.
    pub fn update(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Fraction of the lifetime still left, 1.0 when fresh.
    pub fn fraction_remaining(&self) -> f32 {
        if self.total.is_zero() {
            return 0.0;
        }
        self.remaining.as_secs_f32() / self.total.as_secs_f32()
    }
}
