//! Automatic lightning: target registry and selection rules.
//!
//! The registry decides *who* gets struck and *when*. Paying for strikes and
//! applying their damage is the session's job.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use engine_core::ms;

use crate::config::LightningConfig;
use crate::fish::{FishId, FishView};
use crate::fish_manager::FishManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightningMode {
    Off,
    /// Volleys of bolts at the best on-screen fish every tick.
    Interval,
    /// Locked-on streams that strike their targets repeatedly.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPolicy {
    /// One target at a time, kept until it dies.
    LockUntilDead,
    /// Up to n targets at once.
    Multiple(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightningEntry {
    pub target: FishId,
    pub started_at: Duration,
    pub last_strike: Option<Duration>,
    pub strike_count: u32,
}

/// Ordered set of continuous-lightning targets. A fish appears at most once.
#[derive(Debug, Clone)]
pub struct LightningRegistry {
    entries: Vec<LightningEntry>,
    tick_timer: Duration,
    config: LightningConfig,
}

impl LightningRegistry {
    pub fn new(config: &LightningConfig) -> Self {
        Self {
            entries: Vec::new(),
            tick_timer: Duration::ZERO,
            config: config.clone(),
        }
    }

    pub fn mode(&self) -> LightningMode {
        self.config.mode
    }

    pub fn entries(&self) -> &[LightningEntry] {
        &self.entries
    }

    pub fn contains(&self, id: FishId) -> bool {
        self.entries.iter().any(|e| e.target == id)
    }

    /// Advance the acquisition timer; true when a tick is due.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.config.mode == LightningMode::Off {
            return false;
        }
        self.tick_timer += dt;
        let interval = ms(self.config.tick_interval_ms);
        if self.tick_timer >= interval {
            self.tick_timer = Duration::ZERO;
            return true;
        }
        false
    }

    /// Add targets according to the policy. Returns the newly tracked fish.
    pub fn acquire_targets(&mut self, now: Duration, fish: &FishManager) -> Vec<FishId> {
        let wanted = match self.config.policy {
            TargetPolicy::LockUntilDead if self.entries.is_empty() => 1,
            TargetPolicy::LockUntilDead => 0,
            TargetPolicy::Multiple(n) => n.saturating_sub(self.entries.len()).min(1),
        };
        if wanted == 0 {
            return Vec::new();
        }
        let untracked = fish.live_fish().into_iter().filter(|f| !self.contains(f.id)).collect();
        let picked: Vec<FishId> = best_targets(untracked, wanted).into_iter().map(|f| f.id).collect();
        for &id in &picked {
            log::debug!("Lightning locked on {:?}", id);
            self.entries.push(LightningEntry {
                target: id,
                started_at: now,
                last_strike: None,
                strike_count: 0,
            });
        }
        picked
    }

    /// Drop entries whose target is gone or that have run too long.
    pub fn prune(&mut self, now: Duration, fish: &FishManager) {
        let max_track = ms(self.config.max_track_ms);
        self.entries
            .retain(|e| fish.is_alive(e.target) && now.saturating_sub(e.started_at) < max_track);
    }

    /// Entries whose strike interval has elapsed; marks them as struck now.
    /// A fresh entry strikes immediately.
    pub fn due_strikes(&mut self, now: Duration) -> Vec<FishId> {
        let interval = ms(self.config.strike_interval_ms);
        let mut due = Vec::new();
        for entry in &mut self.entries {
            let ready = match entry.last_strike {
                None => true,
                Some(last) => now.saturating_sub(last) >= interval,
            };
            if ready {
                entry.last_strike = Some(now);
                entry.strike_count += 1;
                due.push(entry.target);
            }
        }
        due
    }

    pub fn remove(&mut self, id: FishId) {
        self.entries.retain(|e| e.target != id);
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Lightning registry cleared ({} targets)", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.tick_timer = Duration::ZERO;
    }
}

/// The `n` highest-score candidates; ties keep population order.
fn best_targets(mut candidates: Vec<FishView>, n: usize) -> Vec<FishView> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(n);
    candidates
}

/// Volley targets for interval mode: the `n` highest-score fish on screen.
pub fn interval_targets(fish: &FishManager, n: usize) -> Vec<FishView> {
    let on_screen = fish
        .live_fish()
        .into_iter()
        .filter(|f| !fish.is_fish_out_of_screen(f.id))
        .collect();
    best_targets(on_screen, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FishType, GameCatalog};
    use crate::fish::FishSpecial;
    use engine_core::Vec2;

    fn setup(policy: TargetPolicy) -> (FishManager, LightningRegistry) {
        let mut catalog = GameCatalog::default();
        catalog.population.min_fish = 0;
        catalog.population.max_fish = 0;
        catalog.lightning.mode = LightningMode::Continuous;
        catalog.lightning.policy = policy;
        (FishManager::new(&catalog, 0), LightningRegistry::new(&catalog.lightning))
    }

    fn fish_type(score: u64) -> FishType {
        FishType {
            name: format!("Fish {}", score),
            size: 20.0,
            speed: 0.0,
            color: "#FFFFFF".into(),
            score,
            health: 1,
            catch_rate: 0.5,
            special: FishSpecial::Plain,
            spawn_weight: 1,
        }
    }

    #[test]
    fn lock_until_dead_tracks_one_target() {
        let (mut fish, mut registry) = setup(TargetPolicy::LockUntilDead);
        let low = fish.insert_fish(&fish_type(5), Vec2::new(100.0, 100.0), Vec2::ZERO);
        let high = fish.insert_fish(&fish_type(50), Vec2::new(200.0, 100.0), Vec2::ZERO);

        assert_eq!(registry.acquire_targets(Duration::ZERO, &fish), vec![high]);
        assert!(registry.acquire_targets(Duration::from_millis(500), &fish).is_empty());

        fish.hit_fish(high, 1, false);
        registry.prune(Duration::from_millis(600), &fish);
        assert!(registry.entries().is_empty());
        assert_eq!(registry.acquire_targets(Duration::from_millis(1000), &fish), vec![low]);
    }

    #[test]
    fn multiple_policy_adds_one_per_tick_up_to_n() {
        let (mut fish, mut registry) = setup(TargetPolicy::Multiple(2));
        for score in [10, 20, 30] {
            fish.insert_fish(&fish_type(score), Vec2::new(100.0, 100.0), Vec2::ZERO);
        }
        registry.acquire_targets(Duration::ZERO, &fish);
        assert_eq!(registry.entries().len(), 1);
        let second = registry.acquire_targets(Duration::ZERO, &fish);
        assert_eq!(second.len(), 1);
        assert_eq!(fish.get(second[0]).map(|f| f.score), Some(20));
        assert!(registry.acquire_targets(Duration::ZERO, &fish).is_empty());
    }

    #[test]
    fn strikes_first_immediately_then_on_interval() {
        let (mut fish, mut registry) = setup(TargetPolicy::LockUntilDead);
        let id = fish.insert_fish(&fish_type(10), Vec2::new(100.0, 100.0), Vec2::ZERO);
        registry.acquire_targets(Duration::ZERO, &fish);
        assert_eq!(registry.due_strikes(Duration::ZERO), vec![id]);
        assert!(registry.due_strikes(Duration::from_millis(1_999)).is_empty());
        assert_eq!(registry.due_strikes(Duration::from_millis(2_000)), vec![id]);
        assert_eq!(registry.entries()[0].strike_count, 2);
    }

    #[test]
    fn entries_expire_after_max_track() {
        let (mut fish, mut registry) = setup(TargetPolicy::LockUntilDead);
        fish.insert_fish(&fish_type(10), Vec2::new(100.0, 100.0), Vec2::ZERO);
        registry.acquire_targets(Duration::ZERO, &fish);
        registry.prune(Duration::from_millis(9_999), &fish);
        assert_eq!(registry.entries().len(), 1);
        registry.prune(Duration::from_millis(10_000), &fish);
        assert!(registry.entries().is_empty());
    }

    #[test]
    fn interval_targets_skip_off_screen_fish() {
        let (mut fish, _) = setup(TargetPolicy::LockUntilDead);
        fish.insert_fish(&fish_type(500), Vec2::new(-10.0, 100.0), Vec2::ZERO);
        let a = fish.insert_fish(&fish_type(20), Vec2::new(100.0, 100.0), Vec2::ZERO);
        let b = fish.insert_fish(&fish_type(40), Vec2::new(300.0, 100.0), Vec2::ZERO);
        let ids: Vec<_> = interval_targets(&fish, 3).into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn off_mode_never_ticks() {
        let catalog = GameCatalog::default();
        let mut registry = LightningRegistry::new(&catalog.lightning);
        assert!(!registry.tick(Duration::from_secs(10)));
    }
}
