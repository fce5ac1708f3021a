//! Fish components and spawn bundles.

use std::time::Duration;

use engine_core::{Health, Transform, Vec2, Velocity};
use serde::{Deserialize, Serialize};

use crate::config::{parse_hex_color, BossType, FishType};

/// Handle to a fish in the population world. Stale handles stop resolving
/// once the fish is removed.
pub type FishId = hecs::Entity;

/// Extra effect a fish triggers when killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FishSpecial {
    #[default]
    Plain,
    /// Damages nearby fish.
    Explosion,
    /// Freezes every fish for a moment.
    Freeze,
    /// Doubles score for a while.
    Multiplier,
    Boss,
    /// Flat coin bonus.
    Jackpot,
}

const FALLBACK_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Archetype stats copied onto a fish at spawn, plus its lifecycle flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Fish {
    pub name: String,
    /// Collision radius.
    pub radius: f32,
    pub speed: f32,
    pub color: [f32; 4],
    pub score: u64,
    pub catch_rate: f64,
    pub special: FishSpecial,
    /// Injected by the boss tracker rather than the spawner.
    pub is_boss: bool,
    /// Set exactly once, by the hit that kills it.
    pub dead: bool,
    pub frozen_until: Duration,
    /// Spawn order; seeds the motion noise.
    pub serial: u32,
}

impl Fish {
    pub fn from_type(ty: &FishType, serial: u32) -> Self {
        Self {
            name: ty.name.clone(),
            radius: ty.size,
            speed: ty.speed,
            color: parse_hex_color(&ty.color).unwrap_or(FALLBACK_COLOR),
            score: ty.score,
            catch_rate: ty.catch_rate,
            special: ty.special,
            is_boss: false,
            dead: false,
            frozen_until: Duration::ZERO,
            serial,
        }
    }

    pub fn from_boss(ty: &BossType, serial: u32) -> Self {
        Self {
            name: ty.name.clone(),
            radius: ty.size,
            speed: ty.speed,
            color: parse_hex_color(&ty.color).unwrap_or(FALLBACK_COLOR),
            score: ty.score,
            catch_rate: 0.0,
            special: FishSpecial::Boss,
            is_boss: true,
            dead: false,
            frozen_until: Duration::ZERO,
            serial,
        }
    }

    pub fn is_frozen(&self, now: Duration) -> bool {
        self.frozen_until > now
    }
}

/// Bundle of components for spawning a fish.
pub struct FishBundle {
    pub transform: Transform,
    pub velocity: Velocity,
    pub health: Health,
    pub fish: Fish,
}

impl FishBundle {
    pub fn new(fish: Fish, max_health: u32, position: Vec2, velocity: Vec2) -> Self {
        let heading = if velocity.length_squared() > 0.0 {
            velocity.y.atan2(velocity.x)
        } else {
            0.0
        };
        Self {
            transform: Transform::from_position_heading(position, heading),
            velocity: Velocity::new(velocity),
            health: Health::new(max_health),
            fish,
        }
    }

    /// Spawn into the ECS world.
    pub fn spawn(self, world: &mut hecs::World) -> FishId {
        world.spawn((self.transform, self.velocity, self.health, self.fish))
    }
}

/// Copy of a live fish's state for queries that must not hold a world borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct FishView {
    pub id: FishId,
    pub position: Vec2,
    pub radius: f32,
    pub score: u64,
    pub catch_rate: f64,
    pub special: FishSpecial,
    pub is_boss: bool,
    pub health: Health,
}
