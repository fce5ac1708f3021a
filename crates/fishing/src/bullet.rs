//! Cannon projectiles: flight, homing and the mid-flight split.

use std::time::Duration;

use engine_core::{frame_scale, Lifetime, Transform, Vec2, Velocity};

use crate::config::{CannonConfig, PlayArea};
use crate::fish::FishId;
use crate::fish_manager::FishManager;

/// Margin beyond the play area after which a bullet is dropped.
const OUT_OF_BOUNDS_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub id: u64,
    pub transform: Transform,
    pub velocity: Velocity,
    pub radius: f32,
    /// The bet at fire time.
    pub damage: u32,
    pub cannon_level: usize,
    /// Fish this bullet steers towards; cleared once that fish is gone.
    pub homing_target: Option<FishId>,
    pub can_split: bool,
    pub has_split: bool,
    pub lifetime: Lifetime,
}

impl Bullet {
    fn speed(&self) -> f32 {
        self.velocity.speed()
    }

    pub fn should_split(&self) -> bool {
        self.can_split && !self.has_split && self.lifetime.fraction_remaining() < 0.5
    }

    fn steer(&mut self, fish: &FishManager, turn_rate: f32, scale: f32) {
        let Some(target) = self.homing_target else {
            return;
        };
        let Some(view) = fish.get(target) else {
            self.homing_target = None;
            return;
        };
        let to = view.position - self.transform.position;
        if to.length_squared() < 0.0001 {
            return;
        }
        let desired = to.y.atan2(to.x);
        let mut diff = desired - self.transform.heading;
        while diff > std::f32::consts::PI {
            diff -= std::f32::consts::TAU;
        }
        while diff < -std::f32::consts::PI {
            diff += std::f32::consts::TAU;
        }
        let max_turn = turn_rate * scale;
        self.transform.heading += diff.clamp(-max_turn, max_turn);
        self.velocity = Velocity::from_heading(self.transform.heading, self.speed());
    }

    fn is_out_of_bounds(&self, area: PlayArea) -> bool {
        let p = self.transform.position;
        p.x < -OUT_OF_BOUNDS_MARGIN
            || p.x > area.width + OUT_OF_BOUNDS_MARGIN
            || p.y < -OUT_OF_BOUNDS_MARGIN
            || p.y > area.height + OUT_OF_BOUNDS_MARGIN
    }
}

/// Every bullet in flight.
#[derive(Debug, Default)]
pub struct Bullets {
    list: Vec<Bullet>,
    next_id: u64,
}

impl Bullets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Bullet] {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Launch a bullet from `origin` along `heading`.
    pub fn fire(
        &mut self,
        config: &CannonConfig,
        origin: Vec2,
        heading: f32,
        damage: u32,
        cannon_level: usize,
        homing_target: Option<FishId>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.list.push(Bullet {
            id,
            transform: Transform::from_position_heading(origin, heading),
            velocity: Velocity::from_heading(heading, config.bullet_speed),
            radius: config.bullet_radius,
            damage,
            cannon_level,
            homing_target,
            can_split: cannon_level >= config.split_min_level,
            has_split: false,
            lifetime: Lifetime::new(Duration::from_millis(config.bullet_lifetime_ms)),
        });
        id
    }

    /// Move, steer and age every bullet; split the ones that are due and drop
    /// expired or out-of-bounds ones.
    pub fn update(&mut self, dt: Duration, fish: &FishManager, config: &CannonConfig, area: PlayArea) {
        let scale = frame_scale(dt);
        let mut children = Vec::new();
        for bullet in &mut self.list {
            bullet.steer(fish, config.homing_turn_rate, scale);
            bullet.transform.translate(bullet.velocity.linear * scale);
            bullet.lifetime.update(dt);

            if bullet.should_split() {
                bullet.has_split = true;
                for side in [-1.0, 1.0] {
                    let heading = bullet.transform.heading + side * config.split_spread;
                    children.push(Bullet {
                        id: 0,
                        transform: Transform::from_position_heading(bullet.transform.position, heading),
                        velocity: Velocity::from_heading(heading, bullet.speed()),
                        damage: (bullet.damage / 2).max(1),
                        homing_target: None,
                        can_split: false,
                        has_split: false,
                        lifetime: Lifetime::new(bullet.lifetime.remaining),
                        ..bullet.clone()
                    });
                }
            }
        }
        for mut child in children {
            child.id = self.next_id;
            self.next_id += 1;
            self.list.push(child);
        }
        self.list
            .retain(|b| !b.lifetime.is_expired() && !b.is_out_of_bounds(area));
    }

    /// Remove the bullets at the given indices (consumed by hits).
    pub fn remove_indices(&mut self, indices: &[usize]) {
        let mut index = 0;
        self.list.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }
}
