//! Periodic boss spawns and the progressive jackpot.

use std::time::Duration;

use engine_core::{ms, Vec2};
use rand::Rng;

use crate::config::{BossConfig, BossType, JackpotConfig, PlayArea};
use crate::fish::FishId;
use crate::fish_manager::FishManager;

/// A boss that just entered the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct BossSpawn {
    pub id: FishId,
    pub name: String,
    pub health: u32,
}

/// Tracks the single active boss and when the next one is due.
#[derive(Debug, Clone)]
pub struct BossTracker {
    types: Vec<BossType>,
    interval: Duration,
    pub next_spawn: Duration,
    pub active: Option<FishId>,
    pub name: Option<String>,
    pub health: u32,
    pub max_health: u32,
}

impl BossTracker {
    pub fn new(config: &BossConfig) -> Self {
        let interval = ms(config.spawn_interval_ms);
        Self {
            types: config.types.clone(),
            interval,
            next_spawn: interval,
            active: None,
            name: None,
            health: 0,
            max_health: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Spawn a random boss at the arena centre when one is due and none is
    /// active.
    pub fn maybe_spawn(
        &mut self,
        now: Duration,
        fish: &mut FishManager,
        area: PlayArea,
        rng: &mut impl Rng,
    ) -> Option<BossSpawn> {
        if self.active.is_some() || now < self.next_spawn || self.types.is_empty() {
            return None;
        }
        let ty = self.types[rng.gen_range(0..self.types.len())].clone();
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let centre = Vec2::new(area.width / 2.0, area.height / 2.0);
        let id = fish.add_boss(&ty, centre, Vec2::new(direction * ty.speed, 0.0));

        self.active = Some(id);
        self.name = Some(ty.name.clone());
        self.health = ty.health;
        self.max_health = ty.health;
        self.next_spawn = now + self.interval;
        log::info!("Boss {} spawned with {} health", ty.name, ty.health);
        Some(BossSpawn {
            id,
            name: ty.name,
            health: ty.health,
        })
    }

    /// Mirror the boss's health after hits. Clears the relation once the boss
    /// is dead or gone and returns true in that case.
    pub fn sync(&mut self, fish: &FishManager) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        match fish.get(id) {
            Some(view) => {
                self.health = view.health.current;
                false
            }
            None => {
                self.clear();
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.name = None;
        self.health = 0;
    }

    pub fn reset(&mut self) {
        self.clear();
        self.max_health = 0;
        self.next_spawn = self.interval;
    }
}

/// Progressive pool fed by every shot.
#[derive(Debug, Clone)]
pub struct Jackpot {
    /// Bets placed since the pool last paid out.
    contributed: u64,
    pub last_win: u64,
    config: JackpotConfig,
}

impl Jackpot {
    pub fn new(config: &JackpotConfig) -> Self {
        Self {
            contributed: 0,
            last_win: 0,
            config: config.clone(),
        }
    }

    pub fn accumulate(&mut self, bet: u64) {
        self.contributed = self.contributed.saturating_add(bet);
    }

    /// Current pool, rounded down to whole coins.
    pub fn amount(&self) -> u64 {
        let share = (self.contributed as f64 * self.config.accumulation_rate).floor() as u64;
        self.config.base_amount.saturating_add(share)
    }

    /// Roll for the jackpot. On a win the pool resets to its base.
    pub fn draw(&mut self, rng: &mut impl Rng) -> Option<u64> {
        let p = self.config.win_probability.clamp(0.0, 1.0);
        if !rng.gen_bool(p) || self.config.multipliers.is_empty() {
            return None;
        }
        let multiplier = self.config.multipliers[rng.gen_range(0..self.config.multipliers.len())];
        let pool = self.amount();
        let win = pool.saturating_mul(multiplier);
        self.last_win = win;
        self.contributed = 0;
        log::info!("Jackpot! {} x{} = {}", pool, multiplier, win);
        Some(win)
    }

    pub fn reset(&mut self) {
        self.contributed = 0;
        self.last_win = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameCatalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn empty_world() -> (GameCatalog, FishManager) {
        let mut catalog = GameCatalog::default();
        catalog.population.min_fish = 0;
        catalog.population.max_fish = 0;
        let fish = FishManager::new(&catalog, 0);
        (catalog, fish)
    }

    #[test]
    fn boss_spawns_on_schedule_one_at_a_time() {
        let (catalog, mut fish) = empty_world();
        let mut rng = StdRng::seed_from_u64(1);
        let mut boss = BossTracker::new(&catalog.boss);

        assert!(boss
            .maybe_spawn(Duration::from_secs(179), &mut fish, catalog.play_area, &mut rng)
            .is_none());
        let spawn = boss
            .maybe_spawn(Duration::from_secs(180), &mut fish, catalog.play_area, &mut rng)
            .expect("boss due");
        assert_eq!(fish.get(spawn.id).map(|f| f.is_boss), Some(true));
        assert_eq!(boss.max_health, spawn.health);
        assert_eq!(boss.next_spawn, Duration::from_secs(360));

        assert!(boss
            .maybe_spawn(Duration::from_secs(400), &mut fish, catalog.play_area, &mut rng)
            .is_none());
    }

    #[test]
    fn sync_mirrors_health_and_clears_on_death() {
        let (catalog, mut fish) = empty_world();
        let mut rng = StdRng::seed_from_u64(2);
        let mut boss = BossTracker::new(&catalog.boss);
        let spawn = boss
            .maybe_spawn(Duration::from_secs(180), &mut fish, catalog.play_area, &mut rng)
            .expect("boss due");

        fish.hit_fish(spawn.id, 100, false);
        assert!(!boss.sync(&fish));
        assert_eq!(boss.health, spawn.health - 100);

        fish.hit_fish(spawn.id, 0, true);
        assert!(boss.sync(&fish));
        assert!(!boss.is_active());
    }

    #[test]
    fn jackpot_accumulates_per_bet() {
        let catalog = GameCatalog::default();
        let mut jackpot = Jackpot::new(&catalog.jackpot);
        for _ in 0..100 {
            jackpot.accumulate(10);
        }
        assert_eq!(jackpot.amount(), 10_010);
    }

    #[test]
    fn certain_jackpot_pays_and_resets() {
        let mut catalog = GameCatalog::default();
        catalog.jackpot.win_probability = 1.0;
        catalog.jackpot.multipliers = vec![2];
        let mut jackpot = Jackpot::new(&catalog.jackpot);
        jackpot.accumulate(500);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(jackpot.draw(&mut rng), Some(20_010));
        assert_eq!(jackpot.last_win, 20_010);
        assert_eq!(jackpot.amount(), 10_000);
    }

    #[test]
    fn zero_probability_never_pays() {
        let mut catalog = GameCatalog::default();
        catalog.jackpot.win_probability = 0.0;
        let mut jackpot = Jackpot::new(&catalog.jackpot);
        let mut rng = StdRng::seed_from_u64(4);
        assert!((0..1_000).all(|_| jackpot.draw(&mut rng).is_none()));
    }
}
