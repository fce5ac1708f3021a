//! Combat resolution: bullet hits, area damage, chain reactions, kill
//! bookkeeping, special fish and skill effects.
//!
//! Everything here runs inside one `Session::update` or one intent. Follow-up
//! work that lands later goes through the session's scheduler, and special
//! fish effects are drained from a work-list so a kill never recurses into
//! another kill's handler.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use engine_core::{ms, Vec2};
use rand::Rng;

use crate::config::{AreaProfile, ChainConfig};
use crate::effects::{EffectKind, ELECTRIC, FIRE, GOLD, ICE, WHITE};
use crate::events::CoreEvent;
use crate::fish::{FishId, FishSpecial, FishView};
use crate::fish_manager::HitOutcome;
use crate::loadout::{ItemKind, SkillKind};
use crate::progress::{AchievementTrigger, Unlock, UnlockKind};
use crate::session::{damage_of, ScheduledTask, Session};

/// Consecutive scoring hits. The combo breaks on a miss or when no hit lands
/// within the window.
#[derive(Debug, Clone)]
pub struct ComboTracker {
    combo: u32,
    max_combo: u32,
    window: Duration,
    remaining: Duration,
}

impl ComboTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            combo: 0,
            max_combo: 0,
            window,
            remaining: Duration::ZERO,
        }
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Extend the combo and restart its window. Returns the new count.
    pub fn register_hit(&mut self) -> u32 {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.remaining = self.window;
        self.combo
    }

    pub fn break_combo(&mut self) {
        self.combo = 0;
        self.remaining = Duration::ZERO;
    }

    /// Bonus points for the current combo: `step` hits earn `points` each.
    pub fn bonus(&self, step: u32, points: u64) -> u64 {
        if step == 0 {
            return 0;
        }
        (self.combo / step) as u64 * points
    }

    pub fn update(&mut self, dt: Duration) {
        if self.combo == 0 {
            return;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.combo = 0;
        }
    }

    pub fn reset(&mut self) {
        self.combo = 0;
        self.max_combo = 0;
        self.remaining = Duration::ZERO;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    pub fish_caught: u64,
    pub total_shots: u64,
    /// Scoring hits from any source, so it can outrun `total_shots`.
    pub total_hits: u64,
    pub bosses_killed: u32,
    pub jackpots_won: u32,
}

impl SessionStats {
    /// Hits per shot as a percentage, capped at 100.
    pub fn accuracy(&self) -> f32 {
        if self.total_shots == 0 {
            return 0.0;
        }
        (self.total_hits as f32 / self.total_shots as f32 * 100.0).min(100.0)
    }
}

/// Splash damage at `distance` from the impact. Always at least 1.
pub fn area_damage(primary: u32, multiplier: f32, distance: f32, radius: f32, min_falloff: f32) -> u32 {
    let min_falloff = decimal(min_falloff);
    let falloff = if radius > 0.0 {
        (1.0 - distance as f64 / radius as f64).max(min_falloff)
    } else {
        min_falloff
    };
    let raw = (primary as f64 * decimal(multiplier) * falloff).floor();
    (raw as u32).max(1)
}

/// Catalog factors are written with at most four decimals; drop the f32
/// representation error before they scale integer damage.
fn decimal(factor: f32) -> f64 {
    (factor as f64 * 10_000.0).round() / 10_000.0
}

/// Damage dealt to a chain target at `depth` (1 for the first ring).
pub fn chain_damage(damage: u32, depth: u32) -> u32 {
    damage.checked_shr(depth).unwrap_or(0).max(1)
}

/// Bonus score for a chain target at `depth`: `origin × 0.5^depth`, floored.
pub fn chain_bonus(origin_score: u64, depth: u32) -> u64 {
    origin_score.checked_shr(depth).unwrap_or(0)
}

/// One hop of a chain reaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainHop {
    pub id: FishId,
    pub from: Vec2,
    pub to: Vec2,
    pub depth: u32,
}

/// Walk outward breadth-first from `origin`, picking the nearest unvisited
/// fish within range of each node. Ties keep population order.
pub fn chain_targets(fish: &[FishView], origin: Vec2, cfg: &ChainConfig) -> Vec<ChainHop> {
    let mut visited = HashSet::new();
    let mut hops = Vec::new();
    let mut frontier = VecDeque::from([(origin, 0u32)]);

    while let Some((from, depth)) = frontier.pop_front() {
        if depth >= cfg.max_depth {
            continue;
        }
        let mut near: Vec<&FishView> = fish
            .iter()
            .filter(|f| !visited.contains(&f.id) && f.position.distance(from) <= cfg.range)
            .collect();
        near.sort_by(|a, b| a.position.distance(from).total_cmp(&b.position.distance(from)));

        for f in near.into_iter().take(cfg.branching) {
            if hops.len() >= cfg.max_targets {
                return hops;
            }
            visited.insert(f.id);
            hops.push(ChainHop {
                id: f.id,
                from,
                to: f.position,
                depth: depth + 1,
            });
            frontier.push_back((f.position, depth + 1));
        }
    }
    hops
}

impl Session {
    // ── Bullets ─────────────────────────────────────────────────────────

    /// Resolve this frame's bullet/fish pairs in collision order. Every
    /// matched bullet is consumed.
    pub(crate) fn handle_collisions(&mut self) {
        let pairs = self.fish.check_bullet_collisions(self.bullets.as_slice());
        if pairs.is_empty() {
            return;
        }
        let mut spent = Vec::with_capacity(pairs.len());
        for (index, fish_id) in pairs {
            // Killed earlier this frame by splash, chain or explosion: the
            // bullet flies on.
            if !self.fish.is_alive(fish_id) {
                continue;
            }
            let Some(bullet) = self.bullets.as_slice().get(index) else {
                continue;
            };
            let (damage, level) = (bullet.damage, bullet.cannon_level);
            self.resolve_bullet_hit(fish_id, damage, level);
            spent.push(index);
        }
        self.bullets.remove_indices(&spent);
    }

    pub(crate) fn resolve_bullet_hit(&mut self, fish_id: FishId, damage: u32, level: usize) {
        let guaranteed = self.loadout.lucky_shot.consume();
        let outcome = self.fish.hit_fish(fish_id, damage, guaranteed);
        if outcome.damage_dealt > 0 {
            self.effects
                .push(EffectKind::HitSparks { count: 6 }, outcome.position, WHITE);
        }
        if outcome.score == 0 {
            self.combo.break_combo();
            return;
        }

        self.reward_hit(&outcome);
        let profile = self.catalog.combat.bullet_area;
        self.apply_area_damage(fish_id, outcome.position, damage, level, profile);
        if outcome.killed {
            self.trigger_chain(outcome.position, damage, outcome.score, level);
        }
        self.flush_specials();
    }

    // ── Rewards ─────────────────────────────────────────────────────────

    /// Add score (doubled while double score runs) and count it towards
    /// score missions. Returns the points actually added.
    pub(crate) fn credit_points(&mut self, points: u64) -> u64 {
        if points == 0 {
            return 0;
        }
        let added = self
            .wallet
            .credit_score(points, self.loadout.double_score.active);
        let unlocks = self.progress.record_score(added);
        self.pay_unlocks(unlocks);
        added
    }

    /// Credit a scoring hit: score, combo and its bonus, kill coins, then
    /// kill bookkeeping.
    pub(crate) fn reward_hit(&mut self, outcome: &HitOutcome) {
        let added = self.credit_points(outcome.score);
        self.stats.total_hits += 1;
        let combo = self.combo.register_hit();
        if outcome.killed {
            self.wallet.credit_coins(outcome.coins);
        }
        self.effects
            .push(EffectKind::ScoreText { amount: added }, outcome.position, GOLD);

        let combat = &self.catalog.combat;
        let bonus = self.combo.bonus(combat.combo_bonus_step, combat.combo_bonus_points);
        if bonus > 0 {
            let bonus = self.credit_points(bonus);
            self.effects
                .push(EffectKind::Combo { combo, bonus }, outcome.position, GOLD);
            self.events.push(CoreEvent::Combo { combo, bonus });
        }
        let unlocks = self.progress.record_combo(combo);
        self.pay_unlocks(unlocks);

        if outcome.killed {
            self.on_fish_killed(outcome);
        }
    }

    /// Bookkeeping shared by every kill, whatever caused it.
    pub(crate) fn on_fish_killed(&mut self, outcome: &HitOutcome) {
        self.stats.fish_caught += 1;
        self.events.push(CoreEvent::FishKilled {
            score: outcome.score,
            special: outcome.special,
        });
        let unlocks = self.progress.record_catch(self.stats.fish_caught);
        self.pay_unlocks(unlocks);

        if let Some(win) = self.jackpot.draw(&mut self.rng) {
            self.award_jackpot(win, outcome.position);
        }
        if outcome.special != FishSpecial::Plain {
            self.pending_specials
                .push_back((outcome.special, outcome.position));
        }
    }

    pub(crate) fn pay_unlocks(&mut self, unlocks: Vec<Unlock>) {
        for unlock in unlocks {
            self.wallet.credit_coins(unlock.reward);
            match unlock.kind {
                UnlockKind::Mission => {
                    self.messages
                        .success(format!("Mission complete: {} (+{})", unlock.name, unlock.reward));
                    self.events.push(CoreEvent::MissionCompleted {
                        id: unlock.id,
                        reward: unlock.reward,
                    });
                }
                UnlockKind::Achievement => {
                    self.messages
                        .success(format!("Achievement: {} (+{})", unlock.name, unlock.reward));
                    self.events.push(CoreEvent::AchievementUnlocked {
                        id: unlock.id,
                        reward: unlock.reward,
                    });
                }
            }
        }
    }

    fn award_jackpot(&mut self, amount: u64, at: Vec2) {
        self.wallet.credit_coins(amount);
        self.stats.jackpots_won += 1;
        self.effects.push(EffectKind::JackpotBurst { amount }, at, GOLD);
        self.messages.success(format!("JACKPOT! +{} coins", amount));
        self.events.push(CoreEvent::JackpotWon { amount });
        let unlocks = self.progress.unlock(AchievementTrigger::JackpotWinner);
        self.pay_unlocks(unlocks);
    }

    // ── Area damage ─────────────────────────────────────────────────────

    /// Splash every other live fish strictly inside the profile radius.
    /// Rewards are credited once; kills never cascade into more splash.
    pub(crate) fn apply_area_damage(
        &mut self,
        primary: FishId,
        centre: Vec2,
        damage: u32,
        level: usize,
        profile: AreaProfile,
    ) {
        let radius = profile.radius(level);
        let multiplier = profile.multiplier(level);
        let victims: Vec<FishView> = self
            .fish
            .get_fishes_in_range(centre, radius)
            .into_iter()
            .filter(|f| f.id != primary)
            .collect();
        if victims.is_empty() {
            return;
        }

        let (mut score, mut coins) = (0u64, 0u64);
        let mut kills = Vec::new();
        for victim in victims {
            let distance = victim.position.distance(centre);
            let splash = area_damage(damage, multiplier, distance, radius, profile.min_falloff);
            let outcome = self.fish.hit_fish(victim.id, splash, false);
            score += outcome.score;
            coins += outcome.coins;
            if outcome.killed {
                kills.push(outcome);
            }
        }
        self.credit_points(score);
        self.wallet.credit_coins(coins);
        self.stats.total_hits += kills.len() as u64;
        for kill in &kills {
            self.on_fish_killed(kill);
        }
        self.effects
            .push(EffectKind::AreaRing { radius }, centre, FIRE);
    }

    // ── Chain reactions ─────────────────────────────────────────────────

    /// Roll for a chain from a fresh kill and schedule its resolution.
    pub(crate) fn trigger_chain(&mut self, origin: Vec2, damage: u32, origin_score: u64, level: usize) {
        let cfg = &self.catalog.combat.chain;
        if self.active_chains >= cfg.max_active {
            return;
        }
        let chance = cfg.chance(level).min(1.0);
        if chance <= 0.0 || !self.rng.gen_bool(chance) {
            return;
        }
        let (delay, settle) = (ms(cfg.delay_ms), ms(cfg.delay_ms + cfg.settle_ms));

        self.active_chains += 1;
        let now = self.clock.now();
        self.scheduler.schedule_in(
            now,
            delay,
            ScheduledTask::ResolveChain {
                origin,
                damage,
                origin_score,
            },
        );
        self.scheduler
            .schedule_in(now, settle, ScheduledTask::ReleaseChain);
        log::debug!("Chain reaction armed ({} active)", self.active_chains);
    }

    pub(crate) fn resolve_chain(&mut self, origin: Vec2, damage: u32, origin_score: u64) {
        let cfg = self.catalog.combat.chain.clone();
        let hops = chain_targets(&self.fish.live_fish(), origin, &cfg);
        if hops.is_empty() {
            return;
        }

        let stagger = ms(cfg.reveal_stagger_ms);
        let mut bonus = 0u64;
        for hop in &hops {
            let outcome = self.fish.hit_fish(hop.id, chain_damage(damage, hop.depth), false);
            let points = chain_bonus(origin_score, hop.depth);
            bonus += points;
            self.effects.push_delayed(
                EffectKind::ChainLink {
                    to: hop.to,
                    depth: hop.depth,
                },
                hop.from,
                ELECTRIC,
                stagger * hop.depth,
            );
            self.effects.push_delayed(
                EffectKind::ScoreText { amount: points },
                hop.to,
                ELECTRIC,
                stagger * hop.depth,
            );
            if outcome.killed {
                self.wallet.credit_coins(outcome.coins);
                self.on_fish_killed(&outcome);
            }
        }

        self.credit_points(bonus);
        self.stats.total_hits += hops.len() as u64;
        self.events
            .push(CoreEvent::ChainReaction { targets: hops.len() });
        if hops.len() >= cfg.flourish_threshold {
            let centre = self.arena_centre();
            self.effects.push(
                EffectKind::ChainFlourish { length: hops.len() },
                centre,
                ELECTRIC,
            );
            self.messages
                .success(format!("Chain x{}!", hops.len()));
        }
        self.flush_specials();
    }

    // ── Lightning ───────────────────────────────────────────────────────

    fn lightning_hit(&mut self, target: FishId, damage: u32) -> HitOutcome {
        let outcome = self.fish.hit_fish(target, damage, false);
        if outcome.damage_dealt > 0 {
            self.effects
                .push(EffectKind::HitSparks { count: 4 }, outcome.position, ELECTRIC);
        }
        if outcome.score > 0 {
            self.reward_hit(&outcome);
            let profile = self.catalog.combat.lightning_area;
            let level = self.cannon.level;
            self.apply_area_damage(target, outcome.position, damage, level, profile);
        }
        outcome
    }

    /// Delayed damage from a continuous-lightning strike.
    pub(crate) fn land_continuous_strike(&mut self, target: FishId, damage: u32) {
        if !self.fish.is_alive(target) {
            self.lightning.remove(target);
            return;
        }
        let outcome = self.lightning_hit(target, damage);
        if outcome.killed {
            self.lightning.remove(target);
        }
        self.flush_specials();
    }

    /// Delayed damage from an interval or manual bolt. Bolt kills can chain.
    pub(crate) fn land_bolt(&mut self, target: FishId, damage: u32) {
        if !self.fish.is_alive(target) {
            return;
        }
        let outcome = self.lightning_hit(target, damage);
        if outcome.killed {
            let level = self.cannon.level;
            self.trigger_chain(outcome.position, damage, outcome.score, level);
        }
        self.flush_specials();
    }

    // ── Special fish ────────────────────────────────────────────────────

    /// Drain queued special effects. Kills made here queue their own
    /// specials, which this loop picks up in turn.
    pub(crate) fn flush_specials(&mut self) {
        while let Some((special, at)) = self.pending_specials.pop_front() {
            match special {
                FishSpecial::Plain => {}
                FishSpecial::Explosion => self.explode(at),
                FishSpecial::Freeze => {
                    let until = self.clock.now() + ms(self.catalog.combat.specials.freeze_ms);
                    self.fish.freeze_all(until);
                    self.effects.push(EffectKind::FreezeWave, at, ICE);
                    self.messages.info("The sea freezes over!");
                }
                FishSpecial::Multiplier => {
                    let span = ms(self.catalog.combat.specials.multiplier_ms);
                    self.loadout.double_score.activate_for(span);
                    self.events
                        .push(CoreEvent::ItemActivated(ItemKind::DoubleScore));
                    self.messages.success("Double score!");
                }
                FishSpecial::Jackpot => {
                    let bonus = self.catalog.combat.specials.jackpot_bonus;
                    self.award_jackpot(bonus, at);
                }
                FishSpecial::Boss => self.on_boss_defeated(),
            }
        }
    }

    fn explode(&mut self, at: Vec2) {
        let specials = &self.catalog.combat.specials;
        let (radius, damage) = (specials.explosion_radius, specials.explosion_damage);
        self.effects
            .push(EffectKind::Explosion { radius }, at, FIRE);
        for victim in self.fish.get_fishes_within(at, radius) {
            let outcome = self.fish.hit_fish(victim.id, damage, false);
            if outcome.killed {
                self.credit_points(outcome.score);
                self.wallet.credit_coins(outcome.coins);
                self.on_fish_killed(&outcome);
            }
        }
    }

    fn on_boss_defeated(&mut self) {
        self.stats.bosses_killed += 1;
        let tracked_dead = self.boss.active.is_some_and(|id| !self.fish.is_alive(id));
        let name = self
            .boss
            .name
            .clone()
            .filter(|_| tracked_dead)
            .unwrap_or_else(|| "Boss".to_string());
        if tracked_dead {
            self.boss.clear();
        }
        log::info!("{} defeated ({} bosses this session)", name, self.stats.bosses_killed);
        self.messages.success(format!("{} defeated!", name));
        self.events.push(CoreEvent::BossDefeated { name });
        let unlocks = self.progress.unlock(AchievementTrigger::FirstBoss);
        self.pay_unlocks(unlocks);
    }

    // ── Skills ──────────────────────────────────────────────────────────

    pub(crate) fn arena_centre(&self) -> Vec2 {
        let area = self.catalog.play_area;
        Vec2::new(area.width / 2.0, area.height / 2.0)
    }

    /// Apply a skill that was just paid for.
    pub(crate) fn apply_skill(&mut self, kind: SkillKind) {
        let centre = self.arena_centre();
        let bet = self.wallet.bet();
        match kind {
            SkillKind::Freeze => {
                let until = self.clock.now() + self.loadout.skill(SkillKind::Freeze).duration;
                self.fish.freeze_all(until);
                self.effects.push(EffectKind::FreezeWave, centre, ICE);
            }
            SkillKind::Bomb => {
                let cfg = &self.catalog.skills.bomb;
                let (radius, damage) = (cfg.radius, damage_of(bet.saturating_mul(cfg.bet_multiplier)));
                self.effects
                    .push(EffectKind::BombBlast { radius }, centre, FIRE);
                let victims: Vec<FishId> = self
                    .fish
                    .get_fishes_within(centre, radius)
                    .into_iter()
                    .map(|f| f.id)
                    .collect();
                for id in victims {
                    let outcome = self.fish.hit_fish(id, damage, false);
                    self.skill_reward(&outcome);
                }
            }
            SkillKind::Laser => {
                let cfg = &self.catalog.skills.laser;
                let (charge, damage) = (ms(cfg.charge_ms), damage_of(bet.saturating_mul(cfg.bet_multiplier)));
                self.effects
                    .push(EffectKind::LaserCharge, self.cannon.position, ELECTRIC);
                self.scheduler
                    .schedule_in(self.clock.now(), charge, ScheduledTask::FireLaser { damage });
            }
            SkillKind::Net => {
                let cfg = &self.catalog.skills.net;
                let (radius, capture) = (cfg.radius, cfg.capture_chance);
                self.effects
                    .push(EffectKind::NetCast { radius }, centre, WHITE);
                let caught = self.fish.get_fishes_within(centre, radius);
                for f in caught {
                    let p = capture.max(f.catch_rate).clamp(0.0, 1.0);
                    if self.rng.gen_bool(p) {
                        let outcome = self.fish.hit_fish(f.id, 0, true);
                        self.skill_reward(&outcome);
                    }
                }
            }
        }
        self.flush_specials();
    }

    /// The charged laser goes off across the horizontal centre band.
    pub(crate) fn fire_laser(&mut self, damage: u32) {
        let centre = self.arena_centre();
        let half_width = self.catalog.skills.laser.half_width;
        self.effects
            .push(EffectKind::LaserBeam { half_width }, centre, ELECTRIC);
        let victims: Vec<FishId> = self
            .fish
            .live_fish()
            .into_iter()
            .filter(|f| (f.position.y - centre.y).abs() <= half_width)
            .map(|f| f.id)
            .collect();
        for id in victims {
            let outcome = self.fish.hit_fish(id, damage, false);
            self.skill_reward(&outcome);
        }
        self.flush_specials();
    }

    fn skill_reward(&mut self, outcome: &HitOutcome) {
        if outcome.score > 0 {
            self.reward_hit(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FishType, GameCatalog};
    use crate::lightning::{LightningMode, TargetPolicy};
    use crate::session::testing::*;
    use crate::session::Intent;

    fn fish_type(score: u64, health: u32, special: FishSpecial) -> FishType {
        FishType {
            name: "Target".into(),
            size: 20.0,
            speed: 0.0,
            color: "#FFFFFF".into(),
            score,
            health,
            catch_rate: 0.1,
            special,
            spawn_weight: 1,
        }
    }

    fn plain(score: u64, health: u32) -> FishType {
        fish_type(score, health, FishSpecial::Plain)
    }

    /// No splash and no chains unless a test turns them on.
    fn isolated_catalog() -> GameCatalog {
        let mut catalog = quiet_catalog();
        catalog.combat.bullet_area.base_radius = 0.0;
        catalog.combat.bullet_area.radius_per_level = 0.0;
        catalog
    }

    fn run_for(s: &mut Session, millis: u64) {
        let end = s.now() + Duration::from_millis(millis);
        while s.now() < end {
            s.update(frame());
        }
    }

    #[test]
    fn combo_times_out_after_window() {
        let mut combo = ComboTracker::new(Duration::from_secs(3));
        combo.register_hit();
        combo.register_hit();
        combo.register_hit();
        combo.update(Duration::from_millis(2_999));
        assert_eq!(combo.combo(), 3);
        combo.update(Duration::from_millis(1));
        assert_eq!(combo.combo(), 0);
        assert_eq!(combo.max_combo(), 3);
    }

    #[test]
    fn combo_bonus_every_five_hits() {
        let mut combo = ComboTracker::new(Duration::from_secs(3));
        for _ in 0..4 {
            combo.register_hit();
        }
        assert_eq!(combo.bonus(5, 10), 0);
        combo.register_hit();
        assert_eq!(combo.bonus(5, 10), 10);
        for _ in 0..5 {
            combo.register_hit();
        }
        assert_eq!(combo.bonus(5, 10), 20);
    }

    #[test]
    fn area_falloff_is_linear_with_floor_of_one() {
        assert_eq!(area_damage(10, 0.7, 0.0, 80.0, 0.0), 7);
        assert_eq!(area_damage(10, 0.7, 40.0, 80.0, 0.0), 3);
        assert_eq!(area_damage(1, 0.7, 79.0, 80.0, 0.0), 1);
        assert_eq!(area_damage(10, 1.0, 75.0, 100.0, 0.3), 3);
        assert_eq!(area_damage(1, 2.9999, 0.0, 100.0, 0.0), 2);
    }

    #[test]
    fn chain_rewards_halve_per_depth() {
        let bonuses: Vec<u64> = (1..=5).map(|n| chain_bonus(100, n)).collect();
        assert_eq!(bonuses, vec![50, 25, 12, 6, 3]);
        assert!(bonuses.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(chain_damage(5, 1), 2);
        assert_eq!(chain_damage(5, 4), 1);
    }

    fn view(fm: &crate::fish_manager::FishManager, id: FishId) -> FishView {
        fm.get(id).unwrap()
    }

    #[test]
    fn chain_walks_outward_breadth_first() {
        let catalog = quiet_catalog();
        let mut s = Session::new(catalog.clone(), 1);
        let ids: Vec<FishId> = (1..=7)
            .map(|i| s.fish.insert_fish(&plain(10, 5), Vec2::new(60.0 * i as f32, 0.0), Vec2::ZERO))
            .collect();
        let live: Vec<FishView> = ids.iter().map(|&id| view(&s.fish, id)).collect();
        let hops = chain_targets(&live, Vec2::ZERO, &catalog.combat.chain);
        let depths: Vec<u32> = hops.iter().map(|h| h.depth).collect();
        assert_eq!(depths, vec![1, 2, 3, 4, 5]);
        assert_eq!(hops[0].id, ids[0]);
        assert_eq!(hops[4].id, ids[4]);
    }

    #[test]
    fn chain_branches_to_two_nearest() {
        let catalog = quiet_catalog();
        let mut s = Session::new(catalog.clone(), 1);
        let a = s.fish.insert_fish(&plain(1, 5), Vec2::new(30.0, 0.0), Vec2::ZERO);
        let b = s.fish.insert_fish(&plain(1, 5), Vec2::new(-40.0, 0.0), Vec2::ZERO);
        let c = s.fish.insert_fish(&plain(1, 5), Vec2::new(0.0, 90.0), Vec2::ZERO);
        let live = s.fish.live_fish();
        let hops = chain_targets(&live, Vec2::ZERO, &catalog.combat.chain);
        assert_eq!(hops.len(), 3);
        assert_eq!((hops[0].id, hops[0].depth), (a, 1));
        assert_eq!((hops[1].id, hops[1].depth), (b, 1));
        assert_eq!((hops[2].id, hops[2].depth), (c, 2));
    }

    #[test]
    fn chain_is_capped_at_max_targets() {
        let catalog = quiet_catalog();
        let mut s = Session::new(catalog.clone(), 1);
        for i in 0..40 {
            let p = Vec2::new((i % 8) as f32 * 20.0, (i / 8) as f32 * 20.0);
            s.fish.insert_fish(&plain(1, 5), p, Vec2::ZERO);
        }
        let hops = chain_targets(&s.fish.live_fish(), Vec2::ZERO, &catalog.combat.chain);
        assert_eq!(hops.len(), 12);
        let unique: HashSet<FishId> = hops.iter().map(|h| h.id).collect();
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn splash_hits_neighbours_by_distance() {
        let mut s = playing(quiet_catalog());
        let primary = s.fish.insert_fish(&plain(10, 1), Vec2::new(300.0, 300.0), Vec2::ZERO);
        let near = s.fish.insert_fish(&plain(10, 100), Vec2::new(340.0, 300.0), Vec2::ZERO);
        let far = s.fish.insert_fish(&plain(10, 100), Vec2::new(500.0, 300.0), Vec2::ZERO);

        // Level 2: radius 130, multiplier 1.0.
        s.resolve_bullet_hit(primary, 5, 2);
        assert_eq!(s.fish().get(near).unwrap().health.current, 97);
        assert_eq!(s.fish().get(far).unwrap().health.current, 100);
        assert!(s
            .effects()
            .all()
            .iter()
            .any(|e| matches!(e.kind, EffectKind::AreaRing { .. })));
    }

    #[test]
    fn miss_breaks_the_combo() {
        let mut s = playing(isolated_catalog());
        let a = s.fish.insert_fish(&plain(2, 1), Vec2::new(100.0, 100.0), Vec2::ZERO);
        let tough = s.fish.insert_fish(&plain(2, 50), Vec2::new(600.0, 100.0), Vec2::ZERO);
        s.resolve_bullet_hit(a, 5, 0);
        assert_eq!(s.combo.combo(), 1);
        s.resolve_bullet_hit(tough, 5, 0);
        assert_eq!(s.combo.combo(), 0);
        assert_eq!(s.fish().get(tough).unwrap().health.current, 45);
    }

    #[test]
    fn fifth_kill_in_a_row_pays_combo_bonus() {
        let mut s = playing(isolated_catalog());
        s.drain_events();
        for i in 0..5 {
            let id = s
                .fish
                .insert_fish(&plain(2, 1), Vec2::new(100.0 + 150.0 * i as f32, 200.0), Vec2::ZERO);
            s.resolve_bullet_hit(id, 5, 0);
        }
        assert_eq!(s.wallet().score(), 10_000 + 5 * 2 + 10);
        assert!(s
            .drain_events()
            .contains(&CoreEvent::Combo { combo: 5, bonus: 10 }));
    }

    #[test]
    fn lucky_shot_kills_outright() {
        let mut s = playing(isolated_catalog());
        s.handle_intent(Intent::UseItem(ItemKind::LuckyShot)).unwrap();
        let id = s.fish.insert_fish(&plain(50, 100), Vec2::new(300.0, 300.0), Vec2::ZERO);
        s.resolve_bullet_hit(id, 1, 0);
        assert!(s.fish().get(id).is_none());
        assert_eq!(s.loadout().lucky_shot.uses_left, 4);
        assert_eq!(s.wallet().coins(), 1_000 - 120 + 25);
    }

    #[test]
    fn chain_resolves_after_delay_and_releases_cap() {
        let mut catalog = isolated_catalog();
        catalog.combat.chain.base_chance = 1.0;
        catalog.combat.chain.max_chance = 1.0;
        let mut s = playing(catalog);
        let origin = s.fish.insert_fish(&plain(40, 1), Vec2::new(300.0, 300.0), Vec2::ZERO);
        let first = s.fish.insert_fish(&plain(10, 100), Vec2::new(360.0, 300.0), Vec2::ZERO);
        let second = s.fish.insert_fish(&plain(10, 100), Vec2::new(420.0, 300.0), Vec2::ZERO);

        s.resolve_bullet_hit(origin, 5, 0);
        assert_eq!(s.active_chains, 1);
        assert_eq!(s.wallet().score(), 10_040);

        run_for(&mut s, 240);
        assert_eq!(s.fish().get(first).unwrap().health.current, 98);
        assert_eq!(s.fish().get(second).unwrap().health.current, 99);
        assert_eq!(s.wallet().score(), 10_040 + 20 + 10);
        assert_eq!(s.stats().total_hits, 3);

        run_for(&mut s, 1_000);
        assert_eq!(s.active_chains, 0);
    }

    #[test]
    fn chain_cap_blocks_new_chains() {
        let mut catalog = isolated_catalog();
        catalog.combat.chain.base_chance = 1.0;
        catalog.combat.chain.max_chance = 1.0;
        let mut s = playing(catalog);
        s.active_chains = 5;
        let id = s.fish.insert_fish(&plain(10, 1), Vec2::new(300.0, 300.0), Vec2::ZERO);
        s.resolve_bullet_hit(id, 5, 0);
        assert_eq!(s.active_chains, 5);
        assert!(s.scheduler.is_empty());
    }

    #[test]
    fn explosion_special_takes_neighbours_along() {
        let mut s = playing(isolated_catalog());
        let blast = s
            .fish
            .insert_fish(&fish_type(30, 1, FishSpecial::Explosion), Vec2::new(300.0, 300.0), Vec2::ZERO);
        let victim = s.fish.insert_fish(&plain(10, 5), Vec2::new(350.0, 300.0), Vec2::ZERO);
        let survivor = s.fish.insert_fish(&plain(10, 50), Vec2::new(360.0, 300.0), Vec2::ZERO);
        s.resolve_bullet_hit(blast, 5, 0);
        assert!(s.fish().get(victim).is_none());
        assert_eq!(s.fish().get(survivor).unwrap().health.current, 40);
        assert_eq!(s.stats().fish_caught, 2);
        assert_eq!(s.wallet().score(), 10_040);
        assert_eq!(s.wallet().coins(), 1_000 + 15 + 5);
    }

    #[test]
    fn multiplier_special_turns_on_double_score() {
        let mut s = playing(isolated_catalog());
        let lucky = s
            .fish
            .insert_fish(&fish_type(60, 1, FishSpecial::Multiplier), Vec2::new(300.0, 300.0), Vec2::ZERO);
        s.resolve_bullet_hit(lucky, 5, 0);
        assert!(s.loadout().double_score.active);
        assert_eq!(s.loadout().double_score.remaining, Duration::from_secs(10));
    }

    #[test]
    fn boss_kill_unlocks_first_boss_once() {
        let mut s = playing(isolated_catalog());
        for x in [200.0, 600.0] {
            let boss = s
                .fish
                .insert_fish(&fish_type(200, 1, FishSpecial::Boss), Vec2::new(x, 300.0), Vec2::ZERO);
            s.resolve_bullet_hit(boss, 5, 0);
        }
        assert_eq!(s.stats().bosses_killed, 2);
        let unlocked: Vec<_> = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, CoreEvent::AchievementUnlocked { id, .. } if id == "first_boss"))
            .collect();
        assert_eq!(unlocked.len(), 1);
    }

    #[test]
    fn bomb_hits_fish_near_centre_only() {
        let mut s = playing(isolated_catalog());
        let centre = s.arena_centre();
        let inside = s.fish.insert_fish(&plain(10, 10), centre + Vec2::new(150.0, 0.0), Vec2::ZERO);
        let outside = s.fish.insert_fish(&plain(10, 10), centre + Vec2::new(151.0, 0.0), Vec2::ZERO);
        s.handle_intent(Intent::ActivateSkill(SkillKind::Bomb)).unwrap();
        assert!(s.fish().get(inside).is_none());
        assert_eq!(s.fish().get(outside).unwrap().health.current, 10);
        assert_eq!(s.wallet().coins(), 1_000 - 100 + 5);
        assert_eq!(s.combo.combo(), 1);
    }

    #[test]
    fn net_captures_within_radius() {
        let mut catalog = isolated_catalog();
        catalog.skills.net.capture_chance = 1.0;
        let mut s = playing(catalog);
        let centre = s.arena_centre();
        let big = s.fish.insert_fish(&plain(100, 500), centre + Vec2::new(0.0, 100.0), Vec2::ZERO);
        let away = s.fish.insert_fish(&plain(100, 500), centre + Vec2::new(0.0, 250.0), Vec2::ZERO);
        s.handle_intent(Intent::ActivateSkill(SkillKind::Net)).unwrap();
        assert!(s.fish().get(big).is_none());
        assert!(s.fish().get(away).is_some());
        assert_eq!(s.stats().fish_caught, 1);
    }

    #[test]
    fn laser_fires_after_charge() {
        let mut s = playing(isolated_catalog());
        let centre = s.arena_centre();
        let in_band = s.fish.insert_fish(&plain(10, 15), centre + Vec2::new(-200.0, 50.0), Vec2::ZERO);
        let off_band = s.fish.insert_fish(&plain(10, 15), centre + Vec2::new(0.0, 120.0), Vec2::ZERO);
        s.handle_intent(Intent::ActivateSkill(SkillKind::Laser)).unwrap();
        assert_eq!(s.wallet().coins(), 800);

        run_for(&mut s, 990);
        assert!(s.fish().get(in_band).is_some());
        run_for(&mut s, 30);
        assert!(s.fish().get(in_band).is_none());
        assert_eq!(s.fish().get(off_band).unwrap().health.current, 15);
    }

    #[test]
    fn continuous_lightning_locks_until_target_dies() {
        let mut catalog = quiet_catalog();
        catalog.lightning.mode = LightningMode::Continuous;
        catalog.lightning.policy = TargetPolicy::LockUntilDead;
        let mut s = playing(catalog);
        let high = s.fish.insert_fish(&plain(50, 10), Vec2::new(200.0, 300.0), Vec2::ZERO);
        let low = s.fish.insert_fish(&plain(5, 50), Vec2::new(800.0, 300.0), Vec2::ZERO);

        run_for(&mut s, 1_500);
        assert_eq!(s.lightning().entries().len(), 1);
        assert_eq!(s.lightning().entries()[0].target, high);
        assert_eq!(s.fish().get(high).unwrap().health.current, 5);
        assert!(s.fish().get(low).is_some());

        run_for(&mut s, 1_100);
        assert!(s.fish().get(high).is_none());
        assert_eq!(s.lightning().entries().len(), 1);
        assert_eq!(s.lightning().entries()[0].target, low);
    }

    #[test]
    fn broke_lightning_clears_the_registry() {
        let mut catalog = quiet_catalog();
        catalog.lightning.mode = LightningMode::Continuous;
        catalog.initial_coins = 4;
        let mut s = playing(catalog);
        s.fish.insert_fish(&plain(50, 10), Vec2::new(200.0, 300.0), Vec2::ZERO);
        run_for(&mut s, 1_000);
        assert!(s.lightning().entries().is_empty());
        assert_eq!(s.wallet().coins(), 4);
    }

    #[test]
    fn bullet_on_a_fish_killed_earlier_this_frame_flies_on() {
        let mut s = playing(quiet_catalog());
        let cannon = s.catalog().cannon.clone();
        let a = s.fish.insert_fish(&plain(10, 1), Vec2::new(300.0, 300.0), Vec2::ZERO);
        let b = s.fish.insert_fish(&plain(10, 1), Vec2::new(340.0, 300.0), Vec2::ZERO);
        s.bullets.fire(&cannon, Vec2::new(300.0, 300.0), 0.0, 5, 2, None);
        s.bullets.fire(&cannon, Vec2::new(340.0, 300.0), 0.0, 5, 2, None);

        s.handle_collisions();
        assert!(s.fish().get(a).is_none());
        assert!(s.fish().get(b).is_none());
        assert_eq!(s.combo.combo(), 1);
        assert_eq!(s.bullets().len(), 1);
        assert_eq!(s.stats().fish_caught, 2);
        assert_eq!(s.stats().total_hits, 2);
    }

    #[test]
    fn explosion_reaches_its_edge() {
        let mut s = playing(isolated_catalog());
        let blast = s
            .fish
            .insert_fish(&fish_type(30, 1, FishSpecial::Explosion), Vec2::new(300.0, 300.0), Vec2::ZERO);
        let edge = s.fish.insert_fish(&plain(10, 5), Vec2::new(420.0, 300.0), Vec2::ZERO);
        s.resolve_bullet_hit(blast, 5, 0);
        assert!(s.fish().get(edge).is_none());
        assert_eq!(s.stats().fish_caught, 2);
    }
}
