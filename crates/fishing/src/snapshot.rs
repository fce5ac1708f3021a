//! Read-only view of the session for drawing the HUD.

use crate::loadout::{ItemKind, SkillKind};
use crate::session::{GamePhase, Session};

#[derive(Debug, Clone, PartialEq)]
pub struct SkillHud {
    pub kind: SkillKind,
    pub name: String,
    pub cost: u64,
    pub ready: bool,
    pub active: bool,
    /// 1.0 right after use, 0.0 once ready.
    pub cooldown_fraction: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemHud {
    pub kind: ItemKind,
    pub name: String,
    pub cost: u64,
    pub active: bool,
    /// Milliseconds left for timed items, uses left for lucky shot.
    pub remaining: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossHud {
    pub name: String,
    pub health: u32,
    pub max_health: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub frame: u64,
    pub time_ms: u64,
    pub score: u64,
    pub coins: u64,
    pub bet: u64,
    pub cannon_level: usize,
    pub cannon_name: String,
    pub heat: f32,
    pub auto_shoot: bool,
    pub auto_aim: bool,
    pub fish_alive: usize,
    pub bullets_in_flight: usize,
    pub combo: u32,
    pub max_combo: u32,
    pub fish_caught: u64,
    pub bosses_killed: u32,
    pub accuracy: f32,
    pub jackpot: u64,
    pub last_jackpot: u64,
    pub boss: Option<BossHud>,
    pub skills: Vec<SkillHud>,
    pub items: Vec<ItemHud>,
    pub missions_done: usize,
    pub lightning_targets: usize,
    pub messages: Vec<String>,
}

impl HudSnapshot {
    pub fn capture(session: &Session) -> Self {
        let cannon = session.cannon();
        let loadout = session.loadout();
        let stats = session.stats();

        let skills = loadout
            .skills()
            .iter()
            .map(|s| SkillHud {
                kind: s.kind,
                name: s.name.clone(),
                cost: s.cost,
                ready: s.is_ready(),
                active: s.active,
                cooldown_fraction: s.cooldown_fraction(),
            })
            .collect();

        let items = vec![
            ItemHud {
                kind: ItemKind::DoubleScore,
                name: loadout.double_score.name.clone(),
                cost: loadout.double_score.cost,
                active: loadout.double_score.active,
                remaining: loadout.double_score.remaining.as_millis() as u64,
            },
            ItemHud {
                kind: ItemKind::LuckyShot,
                name: loadout.lucky_shot.name.clone(),
                cost: loadout.lucky_shot.cost,
                active: loadout.lucky_shot.active,
                remaining: loadout.lucky_shot.uses_left as u64,
            },
            ItemHud {
                kind: ItemKind::RapidFire,
                name: loadout.rapid_fire.name.clone(),
                cost: loadout.rapid_fire.cost,
                active: loadout.rapid_fire.active,
                remaining: loadout.rapid_fire.remaining.as_millis() as u64,
            },
        ];

        let boss = session.boss.name.as_ref().map(|name| BossHud {
            name: name.clone(),
            health: session.boss.health,
            max_health: session.boss.max_health,
        });

        Self {
            phase: session.phase(),
            frame: session.clock.frame_count(),
            time_ms: session.now().as_millis() as u64,
            score: session.wallet().score(),
            coins: session.wallet().coins(),
            bet: session.wallet().bet(),
            cannon_level: cannon.level,
            cannon_name: session
                .catalog()
                .cannon
                .levels
                .get(cannon.level)
                .map(|l| l.name.clone())
                .unwrap_or_default(),
            heat: cannon.heat_level(),
            auto_shoot: session.auto_shoot,
            auto_aim: cannon.auto_aim,
            fish_alive: session.fish().live_count(),
            bullets_in_flight: session.bullets().len(),
            combo: session.combo.combo(),
            max_combo: session.combo.max_combo(),
            fish_caught: stats.fish_caught,
            bosses_killed: stats.bosses_killed,
            accuracy: stats.accuracy(),
            jackpot: session.jackpot.amount(),
            last_jackpot: session.jackpot.last_win,
            boss,
            skills,
            items,
            missions_done: session.progress().missions().iter().filter(|m| m.completed).count(),
            lightning_targets: session.lightning().entries().len(),
            messages: session.messages().visible().iter().map(|m| m.text.clone()).collect(),
        }
    }
}

impl Session {
    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::*;
    use crate::session::Intent;

    #[test]
    fn fresh_session_snapshot() {
        let s = playing(quiet_catalog());
        let hud = s.snapshot();
        assert_eq!(hud.phase, GamePhase::Playing);
        assert_eq!((hud.score, hud.coins, hud.bet), (10_000, 1_000, 5));
        assert_eq!(hud.cannon_level, 2);
        assert_eq!(hud.cannon_name, "Advanced Cannon");
        assert_eq!(hud.skills.len(), 4);
        assert!(hud.skills.iter().all(|s| s.ready));
        assert_eq!(hud.jackpot, 10_000);
        assert!(hud.boss.is_none());
    }

    #[test]
    fn snapshot_reflects_spending() {
        let mut s = playing(quiet_catalog());
        s.handle_intent(Intent::ActivateSkill(SkillKind::Freeze)).unwrap();
        s.handle_intent(Intent::UseItem(ItemKind::LuckyShot)).unwrap();
        let hud = s.snapshot();
        assert_eq!(hud.coins, 1_000 - 50 - 120);
        let freeze = hud.skills.iter().find(|s| s.kind == SkillKind::Freeze).unwrap();
        assert!(!freeze.ready);
        assert_eq!(freeze.cooldown_fraction, 1.0);
        let lucky = hud.items.iter().find(|i| i.kind == ItemKind::LuckyShot).unwrap();
        assert!(lucky.active);
        assert_eq!(lucky.remaining, 5);
    }
}
