//! Session missions and achievements.

use serde::{Deserialize, Serialize};

use crate::config::{AchievementDef, MissionDef};

/// Catches needed for the master-fisher achievement.
pub const MASTER_FISHER_CATCHES: u64 = 100;

/// What a mission counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionKind {
    /// Fish caught this session.
    CatchCount,
    /// Score earned this session.
    Score,
    /// Best combo reached.
    Combo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementTrigger {
    FirstBoss,
    JackpotWinner,
    MasterFisher,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mission {
    pub def: MissionDef,
    pub progress: u64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Achievement {
    pub def: AchievementDef,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockKind {
    Mission,
    Achievement,
}

/// A completion that pays out. Produced at most once per mission or achievement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlock {
    pub kind: UnlockKind,
    pub id: String,
    pub name: String,
    pub reward: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    missions: Vec<Mission>,
    achievements: Vec<Achievement>,
}

impl Progress {
    pub fn new(missions: &[MissionDef], achievements: &[AchievementDef]) -> Self {
        Self {
            missions: missions
                .iter()
                .map(|def| Mission {
                    def: def.clone(),
                    progress: 0,
                    completed: false,
                })
                .collect(),
            achievements: achievements
                .iter()
                .map(|def| Achievement {
                    def: def.clone(),
                    unlocked: false,
                })
                .collect(),
        }
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    /// One more fish caught; `total_caught` drives master fisher.
    pub fn record_catch(&mut self, total_caught: u64) -> Vec<Unlock> {
        let mut unlocks = self.advance(MissionKind::CatchCount, |p| p + 1);
        if total_caught >= MASTER_FISHER_CATCHES {
            unlocks.extend(self.unlock(AchievementTrigger::MasterFisher));
        }
        unlocks
    }

    pub fn record_score(&mut self, points: u64) -> Vec<Unlock> {
        self.advance(MissionKind::Score, |p| p.saturating_add(points))
    }

    pub fn record_combo(&mut self, combo: u32) -> Vec<Unlock> {
        self.advance(MissionKind::Combo, |p| p.max(combo as u64))
    }

    /// Unlock every achievement with this trigger that is still locked.
    pub fn unlock(&mut self, trigger: AchievementTrigger) -> Vec<Unlock> {
        let mut unlocks = Vec::new();
        for achievement in self.achievements.iter_mut().filter(|a| a.def.trigger == trigger) {
            if achievement.unlocked {
                continue;
            }
            achievement.unlocked = true;
            log::info!("Achievement unlocked: {}", achievement.def.name);
            unlocks.push(Unlock {
                kind: UnlockKind::Achievement,
                id: achievement.def.id.clone(),
                name: achievement.def.name.clone(),
                reward: achievement.def.reward,
            });
        }
        unlocks
    }

    fn advance(&mut self, kind: MissionKind, step: impl Fn(u64) -> u64) -> Vec<Unlock> {
        let mut unlocks = Vec::new();
        for mission in self.missions.iter_mut().filter(|m| m.def.kind == kind && !m.completed) {
            mission.progress = step(mission.progress).min(mission.def.target);
            if mission.progress >= mission.def.target {
                mission.completed = true;
                log::info!("Mission complete: {}", mission.def.name);
                unlocks.push(Unlock {
                    kind: UnlockKind::Mission,
                    id: mission.def.id.clone(),
                    name: mission.def.name.clone(),
                    reward: mission.def.reward,
                });
            }
        }
        unlocks
    }
}
