//! Cooldown-gated skills and timed consumable items.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use engine_core::ms;

use crate::config::{ItemCatalog, SkillCatalog};
use crate::economy::Wallet;
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillKind {
    Freeze,
    Bomb,
    Laser,
    Net,
}

impl SkillKind {
    pub const ALL: [SkillKind; 4] = [SkillKind::Freeze, SkillKind::Bomb, SkillKind::Laser, SkillKind::Net];

    pub fn key(&self) -> &'static str {
        match self {
            SkillKind::Freeze => "freeze",
            SkillKind::Bomb => "bomb",
            SkillKind::Laser => "laser",
            SkillKind::Net => "net",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SkillKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillKind::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GameError::UnknownSkill(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    DoubleScore,
    LuckyShot,
    RapidFire,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::DoubleScore, ItemKind::LuckyShot, ItemKind::RapidFire];

    pub fn key(&self) -> &'static str {
        match self {
            ItemKind::DoubleScore => "double_score",
            ItemKind::LuckyShot => "lucky_shot",
            ItemKind::RapidFire => "rapid_fire",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ItemKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        ItemKind::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| GameError::UnknownItem(s.to_string()))
    }
}

/// Runtime state of one skill slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillState {
    pub kind: SkillKind,
    pub name: String,
    pub cost: u64,
    pub cooldown: Duration,
    pub cooldown_remaining: Duration,
    /// Lingering skills (freeze, laser) stay active for `duration`.
    pub duration: Duration,
    pub active: bool,
    pub active_remaining: Duration,
}

impl SkillState {
    fn new(kind: SkillKind, name: &str, cost: u64, cooldown_ms: u64, duration_ms: u64) -> Self {
        Self {
            kind,
            name: name.to_string(),
            cost,
            cooldown: ms(cooldown_ms),
            cooldown_remaining: Duration::ZERO,
            duration: ms(duration_ms),
            active: false,
            active_remaining: Duration::ZERO,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining.is_zero()
    }

    /// Cooldown progress for the HUD, 0.0 when ready.
    pub fn cooldown_fraction(&self) -> f32 {
        if self.cooldown.is_zero() {
            return 0.0;
        }
        self.cooldown_remaining.as_secs_f32() / self.cooldown.as_secs_f32()
    }
}

/// An item that lasts for a span of game time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEffect {
    pub name: String,
    pub cost: u64,
    pub duration: Duration,
    pub active: bool,
    pub remaining: Duration,
}

impl TimedEffect {
    fn new(name: &str, cost: u64, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            cost,
            duration: ms(duration_ms),
            active: false,
            remaining: Duration::ZERO,
        }
    }

    /// Activate for at least `span`. An already longer remaining time is kept.
    pub fn activate_for(&mut self, span: Duration) {
        self.active = true;
        self.remaining = self.remaining.max(span);
    }

    /// Returns true on the tick the effect runs out.
    fn tick(&mut self, dt: Duration) -> bool {
        if !self.active {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.active = false;
            return true;
        }
        false
    }
}

/// An item that lasts for a number of uses.
#[derive(Debug, Clone, PartialEq)]
pub struct CountedEffect {
    pub name: String,
    pub cost: u64,
    pub uses: u32,
    pub active: bool,
    pub uses_left: u32,
}

impl CountedEffect {
    fn new(name: &str, cost: u64, uses: u32) -> Self {
        Self {
            name: name.to_string(),
            cost,
            uses,
            active: false,
            uses_left: 0,
        }
    }

    /// Take one use. Returns false when nothing was left to take.
    pub fn consume(&mut self) -> bool {
        if !self.active || self.uses_left == 0 {
            return false;
        }
        self.uses_left -= 1;
        if self.uses_left == 0 {
            self.active = false;
        }
        true
    }
}

/// Something that ran out during [`Loadout::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadoutExpiry {
    SkillEnded(SkillKind),
    ItemExpired(ItemKind),
}

/// Skills and items owned by the player for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Loadout {
    skills: [SkillState; 4],
    pub double_score: TimedEffect,
    pub lucky_shot: CountedEffect,
    pub rapid_fire: TimedEffect,
}

impl Loadout {
    pub fn new(skills: &SkillCatalog, items: &ItemCatalog) -> Self {
        Self {
            skills: [
                SkillState::new(
                    SkillKind::Freeze,
                    &skills.freeze.name,
                    skills.freeze.cost,
                    skills.freeze.cooldown_ms,
                    skills.freeze.duration_ms,
                ),
                SkillState::new(SkillKind::Bomb, &skills.bomb.name, skills.bomb.cost, skills.bomb.cooldown_ms, 0),
                SkillState::new(
                    SkillKind::Laser,
                    &skills.laser.name,
                    skills.laser.cost,
                    skills.laser.cooldown_ms,
                    skills.laser.duration_ms,
                ),
                SkillState::new(SkillKind::Net, &skills.net.name, skills.net.cost, skills.net.cooldown_ms, 0),
            ],
            double_score: TimedEffect::new(
                &items.double_score.name,
                items.double_score.cost,
                items.double_score.duration_ms,
            ),
            lucky_shot: CountedEffect::new(&items.lucky_shot.name, items.lucky_shot.cost, items.lucky_shot.uses),
            rapid_fire: TimedEffect::new(&items.rapid_fire.name, items.rapid_fire.cost, items.rapid_fire.duration_ms),
        }
    }

    pub fn skill(&self, kind: SkillKind) -> &SkillState {
        &self.skills[kind.index()]
    }

    pub fn skills(&self) -> &[SkillState] {
        &self.skills
    }

    /// Check cooldown and coins, debit, start the cooldown. Nothing changes
    /// unless every check passes.
    pub fn activate_skill(&mut self, kind: SkillKind, wallet: &mut Wallet) -> GameResult<()> {
        let skill = &mut self.skills[kind.index()];
        if !skill.is_ready() {
            return Err(GameError::SkillCoolingDown {
                skill: kind,
                remaining_ms: skill.cooldown_remaining.as_millis() as u64,
            });
        }
        wallet.try_spend(skill.cost)?;
        skill.cooldown_remaining = skill.cooldown;
        if !skill.duration.is_zero() {
            skill.active = true;
            skill.active_remaining = skill.duration;
        }
        log::debug!("Skill {} activated, cooldown {:?}", kind, skill.cooldown);
        Ok(())
    }

    /// Buy an item, or refresh it when already active.
    pub fn use_item(&mut self, kind: ItemKind, wallet: &mut Wallet) -> GameResult<()> {
        let cost = match kind {
            ItemKind::DoubleScore => self.double_score.cost,
            ItemKind::LuckyShot => self.lucky_shot.cost,
            ItemKind::RapidFire => self.rapid_fire.cost,
        };
        wallet.try_spend(cost)?;
        match kind {
            ItemKind::DoubleScore => {
                let full = self.double_score.duration;
                self.double_score.activate_for(full);
            }
            ItemKind::LuckyShot => {
                self.lucky_shot.active = true;
                self.lucky_shot.uses_left = self.lucky_shot.uses;
            }
            ItemKind::RapidFire => {
                let full = self.rapid_fire.duration;
                self.rapid_fire.activate_for(full);
            }
        }
        log::debug!("Item {} used", kind);
        Ok(())
    }

    /// Count cooldowns and durations down by `dt`; report what ran out.
    pub fn tick(&mut self, dt: Duration) -> Vec<LoadoutExpiry> {
        let mut expired = Vec::new();
        for skill in &mut self.skills {
            skill.cooldown_remaining = skill.cooldown_remaining.saturating_sub(dt);
            if skill.active {
                skill.active_remaining = skill.active_remaining.saturating_sub(dt);
                if skill.active_remaining.is_zero() {
                    skill.active = false;
                    expired.push(LoadoutExpiry::SkillEnded(skill.kind));
                }
            }
        }
        if self.double_score.tick(dt) {
            expired.push(LoadoutExpiry::ItemExpired(ItemKind::DoubleScore));
        }
        if self.rapid_fire.tick(dt) {
            expired.push(LoadoutExpiry::ItemExpired(ItemKind::RapidFire));
        }
        expired
    }
}
