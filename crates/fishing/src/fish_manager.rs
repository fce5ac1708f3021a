//! Fish population: spawning, motion, hit resolution and spatial queries.
//!
//! Fish live in a `hecs::World`. A separate spawn-order list gives every
//! query a stable "population order", which the combat resolver relies on
//! for deterministic collision pairing.

use std::collections::HashSet;
use std::f32::consts::PI;
use std::time::Duration;

use engine_core::{frame_scale, Health, Transform, Vec2, Velocity};
use hecs::World;
use noise::{NoiseFn, Perlin};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::bullet::Bullet;
use crate::config::{BossType, FishType, GameCatalog, PlayArea, PopulationConfig};
use crate::fish::{Fish, FishBundle, FishId, FishSpecial, FishView};

/// Result of one `hit_fish` call. Rewards are only non-zero on the killing hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitOutcome {
    pub score: u64,
    pub coins: u64,
    pub killed: bool,
    pub damage_dealt: u32,
    pub special: FishSpecial,
    pub is_boss: bool,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationStats {
    pub spawned: u64,
    pub escaped: u64,
    pub killed: u64,
    /// Whole minutes of game time elapsed.
    pub difficulty: u32,
}

/// Fish spawn rate grows by this share per difficulty level.
const SPAWN_RATE_PER_LEVEL: f32 = 0.2;
const SPEED_PER_LEVEL: f32 = 0.05;
const MAX_SPEED_SCALE: f32 = 1.5;
/// Max vertical drift of a freshly spawned fish, radians.
const SPAWN_DRIFT: f32 = 0.15;

pub struct FishManager {
    world: World,
    order: Vec<FishId>,
    fish_types: Vec<FishType>,
    weights: Option<WeightedIndex<u32>>,
    population: PopulationConfig,
    area: PlayArea,
    noise: Perlin,
    next_serial: u32,
    spawn_timer: Duration,
    stats: PopulationStats,
}

impl FishManager {
    pub fn new(catalog: &GameCatalog, noise_seed: u32) -> Self {
        let weights = WeightedIndex::new(catalog.fish_types.iter().map(|t| t.spawn_weight)).ok();
        if weights.is_none() {
            log::warn!("No spawnable fish types; population will stay empty");
        }
        Self {
            world: World::new(),
            order: Vec::new(),
            fish_types: catalog.fish_types.clone(),
            weights,
            population: catalog.population.clone(),
            area: catalog.play_area,
            noise: Perlin::new(noise_seed),
            next_serial: 0,
            spawn_timer: Duration::ZERO,
            stats: PopulationStats::default(),
        }
    }

    pub fn stats(&self) -> PopulationStats {
        self.stats
    }

    fn speed_scale(&self) -> f32 {
        (1.0 + self.stats.difficulty as f32 * SPEED_PER_LEVEL).min(MAX_SPEED_SCALE)
    }

    fn spawn_interval(&self) -> Duration {
        let base = Duration::from_millis(self.population.spawn_interval_ms);
        base.div_f32(1.0 + self.stats.difficulty as f32 * SPAWN_RATE_PER_LEVEL)
    }

    fn take_serial(&mut self) -> u32 {
        let serial = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);
        serial
    }

    /// Spawn one weighted-random fish at a random edge, if below the cap.
    pub fn spawn(&mut self, rng: &mut impl Rng) -> Option<FishId> {
        if self.live_count() >= self.population.max_fish {
            return None;
        }
        let index = self.weights.as_ref()?.sample(rng);
        let ty = self.fish_types[index].clone();

        let from_left = rng.gen_bool(0.5);
        let lo = self.population.lane_top.min(self.population.lane_bottom);
        let hi = self.population.lane_top.max(self.population.lane_bottom);
        let y = if hi > lo { rng.gen_range(lo..hi) } else { lo };
        let x = if from_left { -ty.size } else { self.area.width + ty.size };
        let base_heading = if from_left { 0.0 } else { PI };
        let heading = base_heading + rng.gen_range(-SPAWN_DRIFT..SPAWN_DRIFT);
        let velocity = Vec2::from_angle(heading) * ty.speed * self.speed_scale();

        let id = self.insert_fish(&ty, Vec2::new(x, y), velocity);
        log::trace!("Spawned {} ({:?})", ty.name, id);
        Some(id)
    }

    /// Place a fish of the given archetype directly, bypassing the caps.
    pub fn insert_fish(&mut self, ty: &FishType, position: Vec2, velocity: Vec2) -> FishId {
        let serial = self.take_serial();
        let id = FishBundle::new(Fish::from_type(ty, serial), ty.health, position, velocity).spawn(&mut self.world);
        self.order.push(id);
        self.stats.spawned += 1;
        id
    }

    /// Inject a boss fish, bypassing the population caps.
    pub fn add_boss(&mut self, ty: &BossType, position: Vec2, velocity: Vec2) -> FishId {
        let serial = self.take_serial();
        let id = FishBundle::new(Fish::from_boss(ty, serial), ty.health, position, velocity).spawn(&mut self.world);
        self.order.push(id);
        self.stats.spawned += 1;
        id
    }

    /// Reap the dead, move the living, despawn escapees and refill.
    pub fn update(&mut self, now: Duration, dt: Duration, rng: &mut impl Rng) {
        self.reap();
        self.stats.difficulty = (now.as_secs() / 60) as u32;

        let scale = frame_scale(dt);
        let t = now.as_secs_f64() * 0.5;
        for &id in &self.order {
            let Ok((transform, velocity, fish)) = self.world.query_one_mut::<(&mut Transform, &Velocity, &Fish)>(id)
            else {
                continue;
            };
            if fish.dead || fish.is_frozen(now) {
                continue;
            }
            let n = self.noise.get([fish.serial as f64 * 0.37 + 0.5, t]) as f32;
            let wobble = Vec2::new(0.0, n * self.population.wobble * fish.speed);
            transform.translate((velocity.linear + wobble) * scale);
        }

        let escaped: Vec<FishId> = self
            .order
            .iter()
            .copied()
            .filter(|&id| self.has_escaped(id))
            .collect();
        for id in escaped {
            self.remove_fish(id);
            self.stats.escaped += 1;
        }

        while self.live_count() < self.population.min_fish {
            if self.spawn(rng).is_none() {
                break;
            }
        }
        self.spawn_timer += dt;
        let interval = self.spawn_interval();
        if self.spawn_timer >= interval {
            self.spawn_timer = Duration::ZERO;
            self.spawn(rng);
        }
    }

    /// Drop fish killed earlier from the world.
    fn reap(&mut self) {
        let world = &self.world;
        let dead: Vec<FishId> = self
            .order
            .iter()
            .copied()
            .filter(|&id| world.get::<&Fish>(id).map(|f| f.dead).unwrap_or(true))
            .collect();
        for id in dead {
            self.remove_fish(id);
        }
    }

    fn has_escaped(&self, id: FishId) -> bool {
        let Some(view) = self.get(id) else {
            return false;
        };
        let pad = self.population.despawn_margin + view.radius;
        let p = view.position;
        p.x < -pad || p.x > self.area.width + pad || p.y < -pad || p.y > self.area.height + pad
    }

    /// Pair bullets with fish, one bullet to one fish, in bullet order.
    /// A fish already matched this call is skipped for later bullets.
    pub fn check_bullet_collisions(&self, bullets: &[Bullet]) -> Vec<(usize, FishId)> {
        let fish = self.live_fish();
        let mut matched = HashSet::new();
        let mut pairs = Vec::new();
        for (index, bullet) in bullets.iter().enumerate() {
            let hit = fish.iter().find(|f| {
                !matched.contains(&f.id) && f.position.distance(bullet.transform.position) < f.radius + bullet.radius
            });
            if let Some(f) = hit {
                matched.insert(f.id);
                pairs.push((index, f.id));
            }
        }
        pairs
    }

    /// Damage a fish. A dead or missing fish yields an empty outcome.
    pub fn hit_fish(&mut self, id: FishId, damage: u32, guaranteed_kill: bool) -> HitOutcome {
        let Ok((transform, health, fish)) = self.world.query_one_mut::<(&Transform, &mut Health, &mut Fish)>(id) else {
            return HitOutcome::default();
        };
        if fish.dead {
            return HitOutcome::default();
        }
        let damage_dealt = if guaranteed_kill {
            health.deplete()
        } else {
            health.take_damage(damage)
        };
        let mut outcome = HitOutcome {
            damage_dealt,
            special: fish.special,
            is_boss: fish.is_boss,
            position: transform.position,
            ..Default::default()
        };
        if health.is_dead() {
            fish.dead = true;
            outcome.killed = true;
            outcome.score = fish.score;
            outcome.coins = fish.score / 2;
            self.stats.killed += 1;
        }
        outcome
    }

    /// Live fish state, or `None` once dead or removed.
    pub fn get(&self, id: FishId) -> Option<FishView> {
        let mut query = self.world.query_one::<(&Transform, &Health, &Fish)>(id).ok()?;
        let (transform, health, fish) = query.get()?;
        if fish.dead {
            return None;
        }
        Some(FishView {
            id,
            position: transform.position,
            radius: fish.radius,
            score: fish.score,
            catch_rate: fish.catch_rate,
            special: fish.special,
            is_boss: fish.is_boss,
            health: *health,
        })
    }

    pub fn is_alive(&self, id: FishId) -> bool {
        self.get(id).is_some()
    }

    /// Every live fish in population order.
    pub fn live_fish(&self) -> Vec<FishView> {
        self.order.iter().filter_map(|&id| self.get(id)).collect()
    }

    pub fn live_count(&self) -> usize {
        self.order
            .iter()
            .filter(|&&id| self.world.get::<&Fish>(id).map(|f| !f.dead).unwrap_or(false))
            .count()
    }

    /// Live fish strictly closer than `radius` to `position`.
    pub fn get_fishes_in_range(&self, position: Vec2, radius: f32) -> Vec<FishView> {
        self.live_fish()
            .into_iter()
            .filter(|f| f.position.distance(position) < radius)
            .collect()
    }

    /// Like `get_fishes_in_range`, but a fish exactly on the edge counts.
    pub fn get_fishes_within(&self, position: Vec2, radius: f32) -> Vec<FishView> {
        self.live_fish()
            .into_iter()
            .filter(|f| f.position.distance(position) <= radius)
            .collect()
    }

    /// Nearest live fish. Ties go to the earlier fish in population order.
    pub fn get_closest_fish(&self, position: Vec2) -> Option<FishView> {
        self.live_fish().into_iter().fold(None, |best: Option<FishView>, f| match best {
            Some(b) if b.position.distance(position) <= f.position.distance(position) => Some(b),
            _ => Some(f),
        })
    }

    /// Outside the visible play area (no margin). Missing fish count as out.
    pub fn is_fish_out_of_screen(&self, id: FishId) -> bool {
        match self.get(id) {
            Some(f) => {
                f.position.x < 0.0
                    || f.position.x > self.area.width
                    || f.position.y < 0.0
                    || f.position.y > self.area.height
            }
            None => true,
        }
    }

    /// Hold every live fish in place until `until`.
    pub fn freeze_all(&mut self, until: Duration) {
        for (_, fish) in self.world.query_mut::<&mut Fish>() {
            if !fish.dead {
                fish.frozen_until = fish.frozen_until.max(until);
            }
        }
    }

    pub fn unfreeze_all_fish(&mut self) {
        for (_, fish) in self.world.query_mut::<&mut Fish>() {
            fish.frozen_until = Duration::ZERO;
        }
    }

    pub fn remove_fish(&mut self, id: FishId) -> bool {
        self.order.retain(|&o| o != id);
        self.world.despawn(id).is_ok()
    }

    pub fn clear(&mut self) {
        self.world.clear();
        self.order.clear();
        self.spawn_timer = Duration::ZERO;
        self.stats = PopulationStats::default();
    }
}
