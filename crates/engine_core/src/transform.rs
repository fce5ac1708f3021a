//! Transform component and utilities for 2D positioning.

use glam::Vec2;

/// A 2D transform: position in play-area pixels plus a heading in radians.
///
/// Heading 0 points along +X; screen Y grows downwards, so a heading of
/// `-FRAC_PI_2` points up the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub heading: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            heading: 0.0,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and heading.
    pub fn from_position_heading(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
