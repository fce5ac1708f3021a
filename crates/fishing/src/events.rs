//! Notifications raised during a frame for the presentation layer.

use crate::fish::FishSpecial;
use crate::loadout::{ItemKind, SkillKind};
use crate::session::GamePhase;

#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    ScoreChanged { score: u64 },
    CoinsChanged { coins: u64 },
    BetChanged { bet: u64, cannon_level: usize },
    FishKilled { score: u64, special: FishSpecial },
    Combo { combo: u32, bonus: u64 },
    SkillActivated(SkillKind),
    SkillEnded(SkillKind),
    ItemActivated(ItemKind),
    ItemExpired(ItemKind),
    BossSpawned { name: String, health: u32 },
    BossDefeated { name: String },
    JackpotWon { amount: u64 },
    ChainReaction { targets: usize },
    MissionCompleted { id: String, reward: u64 },
    AchievementUnlocked { id: String, reward: u64 },
    InsufficientFunds { needed: u64, available: u64 },
    PhaseChanged(GamePhase),
}
