//! The player's cannon: aim, power level, reload and heat.

use std::f32::consts::PI;
use std::time::Duration;

use engine_core::Vec2;

use crate::config::{CannonConfig, GameCatalog};
use crate::fish::FishId;
use crate::fish_manager::FishManager;

/// Keeps the barrel off the horizon.
const MIN_ELEVATION: f32 = 0.05;
/// Distance of the cannon pivot above the bottom edge.
const BASE_OFFSET: f32 = 80.0;

#[derive(Debug, Clone)]
pub struct Cannon {
    pub position: Vec2,
    /// Barrel heading in radians, always pointing up the screen.
    pub angle: f32,
    /// Current bet; also the damage of the next bullet.
    pub power: u64,
    pub level: usize,
    reload_remaining: Duration,
    pub heat: f32,
    pub rapid_fire: bool,
    pub auto_aim: bool,
    pub auto_aim_target: Option<FishId>,
    config: CannonConfig,
}

impl Cannon {
    pub fn new(catalog: &GameCatalog) -> Self {
        let area = catalog.play_area;
        let mut cannon = Self {
            position: Vec2::new(area.width / 2.0, area.height - BASE_OFFSET),
            angle: -PI / 2.0,
            power: 0,
            level: 0,
            reload_remaining: Duration::ZERO,
            heat: 0.0,
            rapid_fire: false,
            auto_aim: false,
            auto_aim_target: None,
            config: catalog.cannon.clone(),
        };
        cannon.set_power(catalog, catalog.bets.default_bet);
        cannon
    }

    /// Re-price the cannon for a bet.
    pub fn set_power(&mut self, catalog: &GameCatalog, power: u64) {
        self.power = power;
        let level = catalog.cannon_level_for_power(power);
        if level != self.level {
            log::debug!("Cannon level {} -> {}", self.level, level);
        }
        self.level = level;
    }

    /// Point the barrel at `target`, clamped to the upper half-plane.
    pub fn aim_at(&mut self, target: Vec2) {
        let to = target - self.position;
        if to.length_squared() < 0.0001 {
            return;
        }
        let mut angle = to.y.atan2(to.x);
        if angle > 0.0 {
            angle = if angle > PI / 2.0 { -PI } else { 0.0 };
        }
        self.angle = angle.clamp(-PI + MIN_ELEVATION, -MIN_ELEVATION);
    }

    pub fn muzzle(&self) -> Vec2 {
        self.position + Vec2::from_angle(self.angle) * self.config.muzzle_offset
    }

    pub fn can_fire(&self) -> bool {
        self.reload_remaining.is_zero()
    }

    pub fn reload_remaining(&self) -> Duration {
        self.reload_remaining
    }

    /// Time between shots: halved by rapid fire, stretched while overheated.
    pub fn fire_interval(&self) -> Duration {
        let mut factor = 1.0;
        if self.rapid_fire {
            factor *= self.config.rapid_fire_factor;
        }
        if self.heat > self.config.heat_throttle {
            factor *= self.config.heat_throttle_factor;
        }
        Duration::from_millis((self.config.reload_ms as f32 * factor).round() as u64)
    }

    /// Start the reload and add heat. Returns the muzzle position and heading,
    /// or `None` while reloading.
    pub fn fire(&mut self) -> Option<(Vec2, f32)> {
        if !self.can_fire() {
            return None;
        }
        self.reload_remaining = self.fire_interval();
        self.heat = (self.heat + self.config.heat_per_shot).min(self.config.max_heat);
        Some((self.muzzle(), self.angle))
    }

    pub fn heat_level(&self) -> f32 {
        if self.config.max_heat <= 0.0 {
            return 0.0;
        }
        self.heat / self.config.max_heat
    }

    pub fn enable_auto_aim(&mut self, fish: &FishManager) {
        self.auto_aim = true;
        self.auto_aim_target = fish.get_closest_fish(self.position).map(|f| f.id);
    }

    pub fn disable_auto_aim(&mut self) {
        self.auto_aim = false;
        self.auto_aim_target = None;
    }

    /// Count down reload, cool the barrel and track the auto-aim target.
    pub fn update(&mut self, dt: Duration, rapid_fire: bool, fish: &FishManager) {
        self.rapid_fire = rapid_fire;
        self.reload_remaining = self.reload_remaining.saturating_sub(dt);
        self.heat = (self.heat - self.config.heat_decay_per_sec * dt.as_secs_f32()).max(0.0);

        if self.auto_aim {
            let target = self
                .auto_aim_target
                .and_then(|id| fish.get(id))
                .or_else(|| fish.get_closest_fish(self.position));
            self.auto_aim_target = target.as_ref().map(|f| f.id);
            if let Some(f) = target {
                self.aim_at(f.position);
            }
        }
    }

    pub fn reset(&mut self, catalog: &GameCatalog) {
        *self = Cannon::new(catalog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cannon() -> (GameCatalog, Cannon) {
        let catalog = GameCatalog::default();
        let cannon = Cannon::new(&catalog);
        (catalog, cannon)
    }

    #[test]
    fn sits_bottom_centre_at_default_bet() {
        let (_, c) = cannon();
        assert_eq!(c.position, Vec2::new(512.0, 688.0));
        assert_eq!(c.power, 5);
        assert_eq!(c.level, 2);
    }

    #[test]
    fn aim_is_clamped_to_upper_half() {
        let (_, mut c) = cannon();
        c.aim_at(c.position + Vec2::new(0.0, -100.0));
        assert!((c.angle + PI / 2.0).abs() < 1e-5);
        c.aim_at(c.position + Vec2::new(100.0, 50.0));
        assert!((c.angle + MIN_ELEVATION).abs() < 1e-5);
        c.aim_at(c.position + Vec2::new(-100.0, 50.0));
        assert!((c.angle - (-PI + MIN_ELEVATION)).abs() < 1e-5);
    }

    #[test]
    fn cannot_fire_while_reloading() {
        let (catalog, mut c) = cannon();
        let fish = FishManager::new(&catalog, 0);
        assert!(c.fire().is_some());
        assert!(c.fire().is_none());
        c.update(Duration::from_millis(199), false, &fish);
        assert!(!c.can_fire());
        c.update(Duration::from_millis(1), false, &fish);
        assert!(c.can_fire());
    }

    #[test]
    fn rapid_fire_and_heat_scale_interval() {
        let (_, mut c) = cannon();
        assert_eq!(c.fire_interval(), Duration::from_millis(200));
        c.rapid_fire = true;
        assert_eq!(c.fire_interval(), Duration::from_millis(100));
        c.rapid_fire = false;
        c.heat = 90.0;
        assert_eq!(c.fire_interval(), Duration::from_millis(300));
    }

    #[test]
    fn heat_builds_and_decays() {
        let (catalog, mut c) = cannon();
        let fish = FishManager::new(&catalog, 0);
        c.fire();
        assert!((c.heat - 6.0).abs() < 1e-5);
        c.update(Duration::from_secs(1), false, &fish);
        assert_eq!(c.heat, 0.0);
    }

    #[test]
    fn level_tracks_power() {
        let (catalog, mut c) = cannon();
        c.set_power(&catalog, 100);
        assert_eq!(c.level, 5);
        c.set_power(&catalog, 1);
        assert_eq!(c.level, 0);
    }
}
