//! The game session: owns every piece of state, runs the per-frame loop,
//! applies player intents and drives the phase machine.

use std::collections::VecDeque;
use std::time::Duration;

use engine_core::{ms, GameClock, Scheduler, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::boss::{BossTracker, Jackpot};
use crate::bullet::Bullets;
use crate::cannon::Cannon;
use crate::combat::{ComboTracker, SessionStats};
use crate::config::{parse_hex_color, GameCatalog};
use crate::economy::Wallet;
use crate::effects::{EffectKind, EffectQueue, GameMessages, ALERT, ELECTRIC};
use crate::error::{GameError, GameResult};
use crate::events::CoreEvent;
use crate::fish::{FishId, FishSpecial};
use crate::fish_manager::FishManager;
use crate::lightning::{interval_targets, LightningMode, LightningRegistry};
use crate::loadout::{ItemKind, Loadout, LoadoutExpiry, SkillKind};
use crate::progress::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Loading,
    Playing,
    Paused,
    GameOver,
}

/// A discrete command from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Fire,
    AimAt(f32, f32),
    SetBet(u64),
    IncreaseBet,
    DecreaseBet,
    ActivateSkill(SkillKind),
    UseItem(ItemKind),
    TogglePause,
    Restart,
    ToggleAutoShoot,
    ToggleAutoAim,
    /// Manual lightning bolt at the fish nearest to this point.
    Lightning(f32, f32),
    FinishLoading,
}

/// Work that lands some game time after its trigger. Every task re-checks
/// its target when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledTask {
    ResolveChain {
        origin: Vec2,
        damage: u32,
        origin_score: u64,
    },
    ReleaseChain,
    ContinuousStrike {
        target: FishId,
        damage: u32,
    },
    LightningBolt {
        target: FishId,
        damage: u32,
    },
    FireLaser {
        damage: u32,
    },
}

pub struct Session {
    pub(crate) catalog: GameCatalog,
    pub(crate) phase: GamePhase,
    pub(crate) clock: GameClock,
    pub(crate) rng: StdRng,

    // ── Economy and player kit ──────────────────────────────────────────
    pub(crate) wallet: Wallet,
    pub(crate) cannon: Cannon,
    pub(crate) bullets: Bullets,
    pub(crate) loadout: Loadout,

    // ── World ───────────────────────────────────────────────────────────
    pub(crate) fish: FishManager,
    pub(crate) boss: BossTracker,
    pub(crate) jackpot: Jackpot,

    // ── Combat bookkeeping ──────────────────────────────────────────────
    pub(crate) combo: ComboTracker,
    pub(crate) stats: SessionStats,
    pub(crate) progress: Progress,
    pub(crate) active_chains: u32,
    pub(crate) pending_specials: VecDeque<(FishSpecial, Vec2)>,
    pub(crate) lightning: LightningRegistry,
    pub(crate) scheduler: Scheduler<ScheduledTask>,

    // ── Output to the presentation layer ────────────────────────────────
    pub(crate) effects: EffectQueue,
    pub(crate) messages: GameMessages,
    pub(crate) events: Vec<CoreEvent>,
    last_score: u64,
    last_coins: u64,

    pub(crate) auto_shoot: bool,
    auto_shoot_timer: Duration,
}

impl Session {
    /// A new session waiting in `Loading`. The seed fixes every random draw.
    pub fn new(catalog: GameCatalog, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise_seed = rng.gen();
        let wallet = Wallet::new(catalog.initial_score, catalog.initial_coins, &catalog.bets);
        Self {
            phase: GamePhase::Loading,
            clock: GameClock::new(),
            last_score: wallet.score(),
            last_coins: wallet.coins(),
            wallet,
            cannon: Cannon::new(&catalog),
            bullets: Bullets::new(),
            loadout: Loadout::new(&catalog.skills, &catalog.items),
            fish: FishManager::new(&catalog, noise_seed),
            boss: BossTracker::new(&catalog.boss),
            jackpot: Jackpot::new(&catalog.jackpot),
            combo: ComboTracker::new(ms(catalog.combat.combo_window_ms)),
            stats: SessionStats::default(),
            progress: Progress::new(&catalog.missions, &catalog.achievements),
            active_chains: 0,
            pending_specials: VecDeque::new(),
            lightning: LightningRegistry::new(&catalog.lightning),
            scheduler: Scheduler::new(),
            effects: EffectQueue::default(),
            messages: GameMessages::new(),
            events: Vec::new(),
            auto_shoot: false,
            auto_shoot_timer: Duration::ZERO,
            rng,
            catalog,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn cannon(&self) -> &Cannon {
        &self.cannon
    }

    pub fn fish(&self) -> &FishManager {
        &self.fish
    }

    pub fn bullets(&self) -> &Bullets {
        &self.bullets
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn effects(&self) -> &EffectQueue {
        &self.effects
    }

    pub fn messages(&self) -> &GameMessages {
        &self.messages
    }

    pub fn lightning(&self) -> &LightningRegistry {
        &self.lightning
    }

    /// Take the notifications raised since the last call.
    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(CoreEvent::PhaseChanged(phase));
        }
    }

    /// Advance one display frame. Game time only moves while playing.
    pub fn update(&mut self, dt: Duration) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.clock.advance(dt);
        let now = self.clock.now();

        self.update_auto_shoot(dt);
        self.cannon.update(dt, self.loadout.rapid_fire.active, &self.fish);
        self.fish.update(now, dt, &mut self.rng);
        self.update_lightning(dt);
        self.update_loadout(dt);
        self.combo.update(dt);
        self.update_boss_spawn();
        self.bullets
            .update(dt, &self.fish, &self.catalog.cannon, self.catalog.play_area);
        self.run_due_tasks();
        self.effects.update(dt);
        self.messages.update(dt);
        self.handle_collisions();
        self.sync_boss();

        if self.wallet.is_bankrupt_score() {
            self.messages.warning("Game over");
            self.set_phase(GamePhase::GameOver);
        }
        self.flush_economy_events();
    }

    /// Apply one intent. Rejections are logged and returned; they never
    /// leave partial state behind.
    pub fn handle_intent(&mut self, intent: Intent) -> GameResult<()> {
        let result = self.apply_intent(intent);
        if let Err(err) = &result {
            log::warn!("Intent {:?} rejected: {}", intent, err);
        }
        self.sync_boss();
        self.flush_economy_events();
        result
    }

    fn apply_intent(&mut self, intent: Intent) -> GameResult<()> {
        match intent {
            Intent::FinishLoading => {
                if self.phase == GamePhase::Loading {
                    self.set_phase(GamePhase::Playing);
                    self.messages.info("Game started");
                }
                return Ok(());
            }
            Intent::TogglePause => {
                match self.phase {
                    GamePhase::Playing => self.set_phase(GamePhase::Paused),
                    GamePhase::Paused => self.set_phase(GamePhase::Playing),
                    _ => return Err(GameError::NotPlaying),
                }
                return Ok(());
            }
            Intent::Restart => {
                if self.phase == GamePhase::Loading {
                    return Err(GameError::NotPlaying);
                }
                self.restart();
                return Ok(());
            }
            _ => {}
        }

        if self.phase != GamePhase::Playing {
            return Err(GameError::NotPlaying);
        }
        match intent {
            Intent::Fire => self.fire(),
            Intent::AimAt(x, y) => {
                self.cannon.aim_at(Vec2::new(x, y));
                Ok(())
            }
            Intent::SetBet(bet) => {
                self.wallet.set_bet(bet)?;
                self.reprice_cannon();
                Ok(())
            }
            Intent::IncreaseBet => {
                if self.wallet.increase_bet() {
                    self.reprice_cannon();
                }
                Ok(())
            }
            Intent::DecreaseBet => {
                if self.wallet.decrease_bet() {
                    self.reprice_cannon();
                }
                Ok(())
            }
            Intent::ActivateSkill(kind) => self.activate_skill(kind),
            Intent::UseItem(kind) => self.use_item(kind),
            Intent::ToggleAutoShoot => {
                self.auto_shoot = !self.auto_shoot;
                self.auto_shoot_timer = Duration::ZERO;
                self.messages
                    .info(if self.auto_shoot { "Auto shoot on" } else { "Auto shoot off" });
                Ok(())
            }
            Intent::ToggleAutoAim => {
                if self.cannon.auto_aim {
                    self.cannon.disable_auto_aim();
                } else {
                    self.cannon.enable_auto_aim(&self.fish);
                }
                Ok(())
            }
            Intent::Lightning(x, y) => self.manual_lightning(Vec2::new(x, y)),
            Intent::FinishLoading | Intent::TogglePause | Intent::Restart => Ok(()),
        }
    }

    fn reprice_cannon(&mut self) {
        let bet = self.wallet.bet();
        self.cannon.set_power(&self.catalog, bet);
        self.events.push(CoreEvent::BetChanged {
            bet,
            cannon_level: self.cannon.level,
        });
    }

    /// Reset everything session-scoped and start playing again.
    pub fn restart(&mut self) {
        log::info!(
            "Restarting session (score {}, coins {}, {} fish caught)",
            self.wallet.score(),
            self.wallet.coins(),
            self.stats.fish_caught
        );
        let catalog = &self.catalog;
        self.wallet = Wallet::new(catalog.initial_score, catalog.initial_coins, &catalog.bets);
        self.cannon.reset(catalog);
        self.bullets.clear();
        self.loadout = Loadout::new(&catalog.skills, &catalog.items);
        self.fish.clear();
        self.boss.reset();
        self.jackpot.reset();
        self.combo.reset();
        self.stats = SessionStats::default();
        self.progress = Progress::new(&catalog.missions, &catalog.achievements);
        self.active_chains = 0;
        self.pending_specials.clear();
        self.lightning.reset();
        self.scheduler.clear();
        self.effects.clear();
        self.messages.clear();
        self.clock.reset();
        self.auto_shoot = false;
        self.auto_shoot_timer = Duration::ZERO;
        self.set_phase(GamePhase::Playing);
    }

    // ── Spending ────────────────────────────────────────────────────────

    pub(crate) fn notify_insufficient(&mut self, needed: u64, available: u64) {
        self.events.push(CoreEvent::InsufficientFunds { needed, available });
        self.effects
            .push(EffectKind::InsufficientFunds, self.cannon.position, ALERT);
        self.messages.warning("Not enough coins!");
    }

    /// Surface a refused spend to the player, then pass the error on.
    pub(crate) fn report_refusal(&mut self, err: GameError) -> GameError {
        match &err {
            GameError::InsufficientFunds { needed, available } => self.notify_insufficient(*needed, *available),
            GameError::SkillCoolingDown { skill, remaining_ms } => self
                .messages
                .warning(format!("{} is cooling down ({}s)", skill, remaining_ms.div_ceil(1000))),
            _ => {}
        }
        err
    }

    /// Pay the current bet for one shot or strike.
    pub(crate) fn charge_bet(&mut self) -> GameResult<u64> {
        let bet = self.wallet.place_bet().map_err(|e| self.report_refusal(e))?;
        self.jackpot.accumulate(bet);
        Ok(bet)
    }

    fn fire(&mut self) -> GameResult<()> {
        if !self.cannon.can_fire() {
            return Ok(());
        }
        let bet = self.charge_bet()?;
        let Some((origin, heading)) = self.cannon.fire() else {
            return Ok(());
        };
        let homing = if self.cannon.auto_aim {
            self.fish.get_closest_fish(self.cannon.position).map(|f| f.id)
        } else {
            None
        };
        let level = self.cannon.level;
        self.bullets
            .fire(&self.catalog.cannon, origin, heading, damage_of(bet), level, homing);
        self.stats.total_shots += 1;
        let color = self
            .catalog
            .cannon
            .levels
            .get(level)
            .and_then(|l| parse_hex_color(&l.color))
            .unwrap_or(ELECTRIC);
        self.effects.push(EffectKind::MuzzleFlash, origin, color);
        Ok(())
    }

    fn update_auto_shoot(&mut self, dt: Duration) {
        if !self.auto_shoot {
            return;
        }
        self.auto_shoot_timer += dt;
        if self.auto_shoot_timer < ms(self.catalog.auto_shoot_interval_ms) {
            return;
        }
        self.auto_shoot_timer = Duration::ZERO;
        if let Err(GameError::InsufficientFunds { .. }) = self.fire() {
            self.auto_shoot = false;
            self.messages.warning("Auto shoot stopped");
        }
    }

    fn activate_skill(&mut self, kind: SkillKind) -> GameResult<()> {
        self.loadout
            .activate_skill(kind, &mut self.wallet)
            .map_err(|e| self.report_refusal(e))?;
        self.events.push(CoreEvent::SkillActivated(kind));
        let name = self.loadout.skill(kind).name.clone();
        self.messages.success(format!("{} activated!", name));
        self.apply_skill(kind);
        Ok(())
    }

    fn use_item(&mut self, kind: ItemKind) -> GameResult<()> {
        self.loadout
            .use_item(kind, &mut self.wallet)
            .map_err(|e| self.report_refusal(e))?;
        self.events.push(CoreEvent::ItemActivated(kind));
        self.messages.success(format!("{} activated!", kind));
        Ok(())
    }

    fn update_loadout(&mut self, dt: Duration) {
        for expiry in self.loadout.tick(dt) {
            match expiry {
                LoadoutExpiry::SkillEnded(kind) => {
                    if kind == SkillKind::Freeze {
                        self.fish.unfreeze_all_fish();
                    }
                    self.events.push(CoreEvent::SkillEnded(kind));
                }
                LoadoutExpiry::ItemExpired(kind) => {
                    self.events.push(CoreEvent::ItemExpired(kind));
                    self.messages.info(format!("{} wore off", kind));
                }
            }
        }
    }

    // ── Lightning ───────────────────────────────────────────────────────

    fn update_lightning(&mut self, dt: Duration) {
        let now = self.clock.now();
        match self.lightning.mode() {
            LightningMode::Off => {}
            LightningMode::Continuous => {
                if self.lightning.tick(dt) {
                    if self.wallet.can_afford(self.wallet.bet()) {
                        self.lightning.acquire_targets(now, &self.fish);
                    } else {
                        self.lightning.clear();
                    }
                }
                self.lightning.prune(now, &self.fish);
                let delay = ms(self.catalog.lightning.strike_delay_ms);
                for target in self.lightning.due_strikes(now) {
                    let Ok(bet) = self.charge_bet() else {
                        self.lightning.clear();
                        break;
                    };
                    self.bolt_effect(target, Duration::ZERO);
                    self.scheduler.schedule_in(
                        now,
                        delay,
                        ScheduledTask::ContinuousStrike {
                            target,
                            damage: damage_of(bet),
                        },
                    );
                }
            }
            LightningMode::Interval => {
                if !self.lightning.tick(dt) || !self.wallet.can_afford(self.wallet.bet()) {
                    return;
                }
                let cfg = &self.catalog.lightning;
                let (hit_delay, stagger, count) =
                    (ms(cfg.interval_hit_delay_ms), ms(cfg.interval_stagger_ms), cfg.interval_targets);
                for (index, target) in interval_targets(&self.fish, count).into_iter().enumerate() {
                    let Ok(bet) = self.charge_bet() else {
                        break;
                    };
                    let delay = hit_delay + stagger * index as u32;
                    self.bolt_effect(target.id, stagger * index as u32);
                    self.scheduler.schedule_in(
                        now,
                        delay,
                        ScheduledTask::LightningBolt {
                            target: target.id,
                            damage: damage_of(bet),
                        },
                    );
                }
            }
        }
    }

    fn manual_lightning(&mut self, point: Vec2) -> GameResult<()> {
        let target = self.fish.get_closest_fish(point).ok_or(GameError::InvalidTarget)?;
        let bet = self.charge_bet()?;
        self.bolt_effect(target.id, Duration::ZERO);
        self.scheduler.schedule_in(
            self.clock.now(),
            ms(self.catalog.lightning.interval_hit_delay_ms),
            ScheduledTask::LightningBolt {
                target: target.id,
                damage: damage_of(bet),
            },
        );
        Ok(())
    }

    fn bolt_effect(&mut self, target: FishId, delay: Duration) {
        if let Some(f) = self.fish.get(target) {
            self.effects.push_delayed(
                EffectKind::LightningBolt { to: f.position },
                self.cannon.position,
                ELECTRIC,
                delay,
            );
        }
    }

    // ── Boss ────────────────────────────────────────────────────────────

    fn update_boss_spawn(&mut self) {
        let now = self.clock.now();
        let area = self.catalog.play_area;
        if let Some(spawn) = self.boss.maybe_spawn(now, &mut self.fish, area, &mut self.rng) {
            self.effects.push(
                EffectKind::BossWarning,
                Vec2::new(area.width / 2.0, area.height / 2.0),
                ALERT,
            );
            self.messages.warning(format!("{} has appeared!", spawn.name));
            self.events.push(CoreEvent::BossSpawned {
                name: spawn.name,
                health: spawn.health,
            });
        }
    }

    pub(crate) fn sync_boss(&mut self) {
        self.boss.sync(&self.fish);
    }

    // ── Scheduled work ──────────────────────────────────────────────────

    fn run_due_tasks(&mut self) {
        let now = self.clock.now();
        while let Some(task) = self.scheduler.pop_due(now) {
            match task {
                ScheduledTask::ResolveChain {
                    origin,
                    damage,
                    origin_score,
                } => self.resolve_chain(origin, damage, origin_score),
                ScheduledTask::ReleaseChain => {
                    self.active_chains = self.active_chains.saturating_sub(1);
                }
                ScheduledTask::ContinuousStrike { target, damage } => self.land_continuous_strike(target, damage),
                ScheduledTask::LightningBolt { target, damage } => self.land_bolt(target, damage),
                ScheduledTask::FireLaser { damage } => self.fire_laser(damage),
            }
        }
    }

    pub(crate) fn flush_economy_events(&mut self) {
        let (score, coins) = (self.wallet.score(), self.wallet.coins());
        if score != self.last_score {
            self.last_score = score;
            self.events.push(CoreEvent::ScoreChanged { score });
        }
        if coins != self.last_coins {
            self.last_coins = coins;
            self.events.push(CoreEvent::CoinsChanged { coins });
        }
    }
}

/// Bets are small; clamp rather than wrap if a ladder ever exceeds u32.
pub(crate) fn damage_of(amount: u64) -> u32 {
    u32::try_from(amount).unwrap_or(u32::MAX)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A catalog with no ambient spawning, no jackpot luck and no lightning,
    /// so tests place every fish themselves.
    pub fn quiet_catalog() -> GameCatalog {
        let mut catalog = GameCatalog::default();
        catalog.population.min_fish = 0;
        catalog.population.max_fish = 0;
        catalog.jackpot.win_probability = 0.0;
        catalog.combat.chain.max_chance = 0.0;
        catalog.combat.chain.base_chance = 0.0;
        catalog.combat.chain.chance_per_level = 0.0;
        catalog
    }

    pub fn playing(catalog: GameCatalog) -> Session {
        let mut session = Session::new(catalog, 42);
        session.handle_intent(Intent::FinishLoading).unwrap();
        session
    }

    pub fn frame() -> Duration {
        Duration::from_millis(16)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::config::FishType;

    fn lone_fish(score: u64, health: u32) -> FishType {
        FishType {
            name: "Target".into(),
            size: 30.0,
            speed: 0.0,
            color: "#FFFFFF".into(),
            score,
            health,
            catch_rate: 0.5,
            special: FishSpecial::Plain,
            spawn_weight: 1,
        }
    }

    #[test]
    fn starts_loading_and_ignores_play_intents() {
        let mut s = Session::new(quiet_catalog(), 1);
        assert_eq!(s.phase(), GamePhase::Loading);
        assert!(matches!(s.handle_intent(Intent::Fire), Err(GameError::NotPlaying)));
        s.handle_intent(Intent::FinishLoading).unwrap();
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn single_shot_kill_pays_back_the_bet() {
        let mut s = playing(quiet_catalog());
        let target = s.cannon.position + Vec2::new(0.0, -200.0);
        let id = s.fish.insert_fish(&lone_fish(10, 1), target, Vec2::ZERO);

        s.handle_intent(Intent::Fire).unwrap();
        assert_eq!(s.wallet().coins(), 995);

        for _ in 0..60 {
            s.update(frame());
        }
        assert!(s.fish().get(id).is_none());
        assert_eq!(s.wallet().score(), 10_010);
        assert_eq!(s.wallet().coins(), 1_000);
        assert_eq!(s.stats().fish_caught, 1);
        assert_eq!(s.stats().total_hits, 1);
        assert!(s.bullets().is_empty());
    }

    #[test]
    fn double_score_doubles_the_kill() {
        let mut s = playing(quiet_catalog());
        s.handle_intent(Intent::UseItem(ItemKind::DoubleScore)).unwrap();
        let target = s.cannon.position + Vec2::new(0.0, -200.0);
        s.fish.insert_fish(&lone_fish(10, 1), target, Vec2::ZERO);
        s.handle_intent(Intent::Fire).unwrap();
        for _ in 0..60 {
            s.update(frame());
        }
        assert_eq!(s.wallet().score(), 10_020);
        assert_eq!(s.wallet().coins(), 1_000 - 80);
    }

    #[test]
    fn broke_fire_is_refused_cleanly() {
        let mut catalog = quiet_catalog();
        catalog.initial_coins = 3;
        let mut s = playing(catalog);
        s.drain_events();
        let err = s.handle_intent(Intent::Fire).unwrap_err();
        assert!(matches!(err, GameError::InsufficientFunds { needed: 5, available: 3 }));
        assert_eq!(s.wallet().coins(), 3);
        assert!(s.bullets().is_empty());
        assert!(s
            .drain_events()
            .iter()
            .any(|e| matches!(e, CoreEvent::InsufficientFunds { .. })));
        assert!(s
            .effects()
            .all()
            .iter()
            .any(|e| e.kind == EffectKind::InsufficientFunds));
    }

    #[test]
    fn freeze_skill_unfreezes_exactly_once() {
        let mut catalog = quiet_catalog();
        catalog.initial_coins = 200;
        let mut s = playing(catalog);
        let id = s.fish.insert_fish(&lone_fish(10, 5), Vec2::new(300.0, 300.0), Vec2::new(1.0, 0.0));

        s.handle_intent(Intent::ActivateSkill(SkillKind::Freeze)).unwrap();
        assert_eq!(s.wallet().coins(), 150);
        assert_eq!(
            s.loadout().skill(SkillKind::Freeze).cooldown_remaining,
            Duration::from_millis(30_000)
        );
        s.drain_events();

        let start = s.fish().get(id).unwrap().position;
        let mut ended = 0;
        for _ in 0..400 {
            s.update(frame());
            ended += s
                .drain_events()
                .iter()
                .filter(|e| **e == CoreEvent::SkillEnded(SkillKind::Freeze))
                .count();
            if s.now() < Duration::from_millis(4_990) {
                assert_eq!(s.fish().get(id).unwrap().position, start);
            }
        }
        assert_eq!(ended, 1);
        assert!(s.fish().get(id).unwrap().position.x > start.x);
    }

    #[test]
    fn pause_freezes_game_time_and_tasks() {
        let mut s = playing(quiet_catalog());
        s.update(frame());
        s.handle_intent(Intent::TogglePause).unwrap();
        let before = s.now();
        s.update(Duration::from_secs(5));
        assert_eq!(s.now(), before);
        assert!(matches!(s.handle_intent(Intent::Fire), Err(GameError::NotPlaying)));
        s.handle_intent(Intent::TogglePause).unwrap();
        s.update(frame());
        assert!(s.now() > before);
    }

    #[test]
    fn bet_changes_reprice_the_cannon() {
        let mut s = playing(quiet_catalog());
        s.handle_intent(Intent::SetBet(50)).unwrap();
        assert_eq!(s.cannon().level, 5);
        assert!(matches!(s.handle_intent(Intent::SetBet(7)), Err(GameError::InvalidBet(7))));
        s.handle_intent(Intent::DecreaseBet).unwrap();
        assert_eq!(s.wallet().bet(), 20);
        assert_eq!(s.cannon().power, 20);
        assert_eq!(s.cannon().level, 4);
    }

    #[test]
    fn restart_resets_session_state() {
        let mut s = playing(quiet_catalog());
        s.handle_intent(Intent::Fire).unwrap();
        s.handle_intent(Intent::ActivateSkill(SkillKind::Bomb)).unwrap();
        s.update(frame());
        s.handle_intent(Intent::Restart).unwrap();
        assert_eq!(s.wallet().coins(), 1_000);
        assert_eq!(s.wallet().total_bet(), 0);
        assert_eq!(s.wallet().total_win(), 0);
        assert_eq!(s.now(), Duration::ZERO);
        assert!(s.loadout().skill(SkillKind::Bomb).is_ready());
        assert!(s.bullets().is_empty());
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn score_exhaustion_ends_the_game() {
        let mut catalog = quiet_catalog();
        catalog.initial_score = 0;
        let mut s = playing(catalog);
        s.update(frame());
        assert_eq!(s.phase(), GamePhase::GameOver);
        s.handle_intent(Intent::Restart).unwrap();
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn same_seed_same_outcome() {
        let run = || {
            let mut catalog = GameCatalog::default();
            catalog.lightning.mode = LightningMode::Continuous;
            let mut s = Session::new(catalog, 2024);
            s.handle_intent(Intent::FinishLoading).unwrap();
            s.handle_intent(Intent::ToggleAutoShoot).unwrap();
            s.handle_intent(Intent::ToggleAutoAim).unwrap();
            for i in 0..1_500 {
                if i % 200 == 0 {
                    let _ = s.handle_intent(Intent::IncreaseBet);
                }
                s.update(frame());
            }
            (s.wallet().score(), s.wallet().coins(), s.stats().fish_caught)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn manual_lightning_strikes_nearest_fish() {
        let mut s = playing(quiet_catalog());
        let id = s.fish.insert_fish(&lone_fish(10, 1), Vec2::new(400.0, 300.0), Vec2::ZERO);
        s.handle_intent(Intent::Lightning(390.0, 300.0)).unwrap();
        assert_eq!(s.wallet().coins(), 995);
        for _ in 0..20 {
            s.update(frame());
        }
        assert!(s.fish().get(id).is_none());
        assert_eq!(s.wallet().coins(), 1_000);
    }

    #[test]
    fn manual_lightning_without_fish_costs_nothing() {
        let mut s = playing(quiet_catalog());
        assert!(matches!(
            s.handle_intent(Intent::Lightning(10.0, 10.0)),
            Err(GameError::InvalidTarget)
        ));
        assert_eq!(s.wallet().coins(), 1_000);
    }

    #[test]
    fn boss_mirror_follows_skill_damage() {
        let mut catalog = quiet_catalog();
        catalog.boss.spawn_interval_ms = 0;
        let mut s = playing(catalog);
        s.update(frame());
        let boss = s.boss.active.unwrap();

        s.handle_intent(Intent::ActivateSkill(SkillKind::Bomb)).unwrap();
        let health = s.fish().get(boss).unwrap().health;
        assert!(health.current < health.max);
        assert_eq!(s.snapshot().boss.unwrap().health, health.current);
    }

    #[test]
    fn broke_interval_lightning_stays_quiet() {
        let mut catalog = quiet_catalog();
        catalog.lightning.mode = LightningMode::Interval;
        let mut s = playing(catalog);
        let id = s.fish.insert_fish(&lone_fish(10, 50), Vec2::new(400.0, 300.0), Vec2::ZERO);
        s.wallet.try_spend(998).unwrap();
        s.drain_events();

        for _ in 0..125 {
            s.update(frame());
        }
        assert!(!s
            .drain_events()
            .iter()
            .any(|e| matches!(e, CoreEvent::InsufficientFunds { .. })));
        assert_eq!(s.fish().get(id).unwrap().health.current, 50);
        assert_eq!(s.wallet().coins(), 2);
    }
}
