//! Core engine types and utilities for the fishing arena.
//!
//! This crate provides the foundational types used by the game core:
//! - 2D transform and motion components
//! - Deterministic game-time clock
//! - Game-time task scheduler for delayed effects

pub mod components;
pub mod schedule;
pub mod time;
pub mod transform;

pub use components::*;
pub use schedule::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::Vec2;
