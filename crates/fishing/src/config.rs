//! Static game catalog (fish, cannon, skills, items, bosses, jackpot, missions).
//! Loaded once from `catalog.ron` at startup and treated as immutable for the session.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::fish::FishSpecial;
use crate::lightning::{LightningMode, TargetPolicy};
use crate::progress::{AchievementTrigger, MissionKind};

/// Everything the session reads from data rather than code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCatalog {
    pub initial_score: u64,
    pub initial_coins: u64,
    pub play_area: PlayArea,
    pub bets: BetConfig,
    pub population: PopulationConfig,
    pub fish_types: Vec<FishType>,
    pub cannon: CannonConfig,
    pub skills: SkillCatalog,
    pub items: ItemCatalog,
    pub boss: BossConfig,
    pub jackpot: JackpotConfig,
    pub combat: CombatConfig,
    pub lightning: LightningConfig,
    pub missions: Vec<MissionDef>,
    pub achievements: Vec<AchievementDef>,
    /// Interval between automatic shots while auto-shoot is on.
    pub auto_shoot_interval_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetConfig {
    pub default_bet: u64,
    /// Allowed bets in ascending order.
    pub ladder: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub min_fish: usize,
    pub max_fish: usize,
    pub spawn_interval_ms: u64,
    /// How far past the edge a fish may swim before it is despawned.
    pub despawn_margin: f32,
    /// Vertical band new fish are spawned in.
    pub lane_top: f32,
    pub lane_bottom: f32,
    /// Vertical wobble amplitude, in pixels per unit of fish speed.
    pub wobble: f32,
}

/// One fish archetype of the spawn catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishType {
    pub name: String,
    /// Collision radius in pixels.
    pub size: f32,
    /// Pixels per reference frame.
    pub speed: f32,
    pub color: String,
    pub score: u64,
    pub health: u32,
    pub catch_rate: f64,
    pub special: FishSpecial,
    /// Relative weight for normal spawns. Zero never spawns on its own.
    pub spawn_weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CannonLevel {
    pub name: String,
    pub power: u64,
    /// Minimum bet that unlocks this level.
    pub cost: u64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CannonConfig {
    pub reload_ms: u64,
    pub rapid_fire_factor: f32,
    pub heat_per_shot: f32,
    pub heat_decay_per_sec: f32,
    pub max_heat: f32,
    /// Heat above which the fire interval is stretched.
    pub heat_throttle: f32,
    pub heat_throttle_factor: f32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub bullet_lifetime_ms: u64,
    /// Bullets fired at or above this level split once mid-flight.
    pub split_min_level: usize,
    /// Angle between a split child and its parent, radians.
    pub split_spread: f32,
    pub muzzle_offset: f32,
    /// Max heading change per reference frame for homing bullets, radians.
    pub homing_turn_rate: f32,
    pub levels: Vec<CannonLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeSkill {
    pub name: String,
    pub cost: u64,
    pub cooldown_ms: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombSkill {
    pub name: String,
    pub cost: u64,
    pub cooldown_ms: u64,
    pub radius: f32,
    pub bet_multiplier: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserSkill {
    pub name: String,
    pub cost: u64,
    pub cooldown_ms: u64,
    pub duration_ms: u64,
    pub charge_ms: u64,
    pub half_width: f32,
    pub bet_multiplier: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetSkill {
    pub name: String,
    pub cost: u64,
    pub cooldown_ms: u64,
    pub radius: f32,
    pub capture_chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub freeze: FreezeSkill,
    pub bomb: BombSkill,
    pub laser: LaserSkill,
    pub net: NetSkill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedItem {
    pub name: String,
    pub cost: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountedItem {
    pub name: String,
    pub cost: u64,
    pub uses: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub double_score: TimedItem,
    pub lucky_shot: CountedItem,
    pub rapid_fire: TimedItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossType {
    pub name: String,
    pub health: u32,
    pub score: u64,
    pub size: f32,
    pub speed: f32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    pub spawn_interval_ms: u64,
    pub types: Vec<BossType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JackpotConfig {
    pub base_amount: u64,
    /// Share of every bet that flows into the pool.
    pub accumulation_rate: f64,
    pub win_probability: f64,
    pub multipliers: Vec<u64>,
}

/// Splash-damage shape: radius and multiplier grow with cannon level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaProfile {
    pub base_radius: f32,
    pub radius_per_level: f32,
    pub base_multiplier: f32,
    pub multiplier_per_level: f32,
    /// Lower bound of the distance falloff factor (0.0 = pure linear).
    pub min_falloff: f32,
}

impl AreaProfile {
    pub fn radius(&self, level: usize) -> f32 {
        self.base_radius + level as f32 * self.radius_per_level
    }

    pub fn multiplier(&self, level: usize) -> f32 {
        self.base_multiplier + level as f32 * self.multiplier_per_level
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub max_active: u32,
    pub base_chance: f64,
    pub chance_per_level: f64,
    pub max_chance: f64,
    pub delay_ms: u64,
    /// Time after resolution before the chain stops counting as active.
    pub settle_ms: u64,
    pub reveal_stagger_ms: u64,
    pub range: f32,
    /// Targets picked per chain node.
    pub branching: usize,
    pub max_depth: u32,
    pub max_targets: usize,
    /// Chain length that earns the full-screen flourish.
    pub flourish_threshold: usize,
}

impl ChainConfig {
    pub fn chance(&self, level: usize) -> f64 {
        (self.base_chance + level as f64 * self.chance_per_level).min(self.max_chance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialConfig {
    pub explosion_radius: f32,
    pub explosion_damage: u32,
    pub freeze_ms: u64,
    pub multiplier_ms: u64,
    pub jackpot_bonus: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConfig {
    pub combo_window_ms: u64,
    pub combo_bonus_step: u32,
    pub combo_bonus_points: u64,
    pub bullet_area: AreaProfile,
    pub lightning_area: AreaProfile,
    pub chain: ChainConfig,
    pub specials: SpecialConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningConfig {
    pub mode: LightningMode,
    pub policy: TargetPolicy,
    pub tick_interval_ms: u64,
    pub strike_interval_ms: u64,
    pub strike_delay_ms: u64,
    pub max_track_ms: u64,
    pub interval_targets: usize,
    pub interval_hit_delay_ms: u64,
    pub interval_stagger_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target: u64,
    pub reward: u64,
    pub kind: MissionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub reward: u64,
    pub icon: String,
    pub trigger: AchievementTrigger,
}

impl GameCatalog {
    /// Load the catalog from a RON file. A missing, unparsable or invalid
    /// catalog is a fatal error; nothing is defaulted field by field.
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| GameError::ConfigMissing {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: GameCatalog = ron::from_str(&data).map_err(|e| GameError::ConfigMalformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        catalog.validate()?;
        log::info!(
            "Loaded catalog from {:?}: {} fish types, {} cannon levels, {} bosses",
            path,
            catalog.fish_types.len(),
            catalog.cannon.levels.len(),
            catalog.boss.types.len()
        );
        Ok(catalog)
    }

    /// Check the cross-field rules serde cannot express.
    pub fn validate(&self) -> GameResult<()> {
        let invalid = |msg: String| Err(GameError::ConfigInvalid(msg));

        if self.bets.ladder.is_empty() {
            return invalid("bet ladder is empty".into());
        }
        if self.bets.ladder.windows(2).any(|w| w[0] >= w[1]) || self.bets.ladder[0] == 0 {
            return invalid("bet ladder must be positive and strictly ascending".into());
        }
        if !self.bets.ladder.contains(&self.bets.default_bet) {
            return invalid(format!("default bet {} is not on the ladder", self.bets.default_bet));
        }
        if self.population.min_fish > self.population.max_fish {
            return invalid("population min_fish exceeds max_fish".into());
        }
        if self.population.max_fish > 0 && self.fish_types.iter().all(|t| t.spawn_weight == 0) {
            return invalid("no fish type has a spawn weight".into());
        }
        if let Some(t) = self.fish_types.iter().find(|t| t.health == 0) {
            return invalid(format!("fish type '{}' has zero health", t.name));
        }
        if self.cannon.levels.is_empty() {
            return invalid("no cannon levels".into());
        }
        if self.boss.types.is_empty() {
            return invalid("no boss types".into());
        }
        if let Some(b) = self.boss.types.iter().find(|b| b.health == 0) {
            return invalid(format!("boss '{}' has zero health", b.name));
        }
        if self.jackpot.multipliers.is_empty() {
            return invalid("jackpot multiplier table is empty".into());
        }
        if self.play_area.width <= 0.0 || self.play_area.height <= 0.0 {
            return invalid("play area must have a positive size".into());
        }

        let colors = self
            .fish_types
            .iter()
            .map(|t| (&t.name, &t.color))
            .chain(self.cannon.levels.iter().map(|l| (&l.name, &l.color)))
            .chain(self.boss.types.iter().map(|b| (&b.name, &b.color)));
        for (name, color) in colors {
            if parse_hex_color(color).is_none() {
                return invalid(format!("'{}' has an unreadable color '{}'", name, color));
            }
        }
        Ok(())
    }

    /// Highest cannon level whose cost the given power covers.
    pub fn cannon_level_for_power(&self, power: u64) -> usize {
        self.cannon
            .levels
            .iter()
            .rposition(|l| l.cost <= power)
            .unwrap_or(0)
    }
}

/// `#RRGGBB` to linear RGBA in `0.0..=1.0`.
pub fn parse_hex_color(hex: &str) -> Option<[f32; 4]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok().map(|v| v as f32 / 255.0);
    Some([channel(0)?, channel(2)?, channel(4)?, 1.0])
}

#[allow(clippy::too_many_arguments)]
fn fish(
    name: &str,
    size: f32,
    speed: f32,
    color: &str,
    score: u64,
    health: u32,
    catch_rate: f64,
    special: FishSpecial,
    spawn_weight: u32,
) -> FishType {
    FishType {
        name: name.into(),
        size,
        speed,
        color: color.into(),
        score,
        health,
        catch_rate,
        special,
        spawn_weight,
    }
}

fn cannon_level(name: &str, power: u64, cost: u64, color: &str) -> CannonLevel {
    CannonLevel {
        name: name.into(),
        power,
        cost,
        color: color.into(),
    }
}

impl Default for GameCatalog {
    /// The built-in catalog; `catalog.ron` ships the same values.
    fn default() -> Self {
        use FishSpecial::*;
        Self {
            initial_score: 10_000,
            initial_coins: 1_000,
            play_area: PlayArea {
                width: 1024.0,
                height: 768.0,
            },
            bets: BetConfig {
                default_bet: 5,
                ladder: vec![1, 2, 5, 10, 20, 50, 100],
            },
            population: PopulationConfig {
                min_fish: 20,
                max_fish: 50,
                spawn_interval_ms: 1_000,
                despawn_margin: 60.0,
                lane_top: 60.0,
                lane_bottom: 600.0,
                wobble: 0.4,
            },
            fish_types: vec![
                fish("Clownfish", 15.0, 1.5, "#FF6B35", 2, 1, 0.9, Plain, 30),
                fish("Goldfish", 20.0, 1.2, "#FFD700", 5, 2, 0.8, Plain, 25),
                fish("Tropical Fish", 25.0, 1.0, "#00CED1", 10, 3, 0.7, Plain, 20),
                fish("Flounder", 30.0, 0.8, "#8B4513", 20, 5, 0.6, Plain, 12),
                fish("Shark", 50.0, 0.6, "#708090", 50, 10, 0.4, Plain, 6),
                fish("Whale", 80.0, 0.4, "#2F4F4F", 100, 20, 0.3, Plain, 3),
                fish("Blast Fish", 35.0, 1.0, "#FF4500", 30, 8, 0.5, Explosion, 4),
                fish("Frost Fish", 40.0, 0.7, "#87CEEB", 40, 12, 0.4, Freeze, 3),
                fish("Lucky Fish", 45.0, 0.5, "#9370DB", 60, 15, 0.3, Multiplier, 2),
                fish("Dragon King", 100.0, 0.3, "#DC143C", 200, 50, 0.2, Boss, 1),
                fish("Golden Dragon", 120.0, 0.2, "#FFD700", 500, 100, 0.1, Jackpot, 1),
            ],
            cannon: CannonConfig {
                reload_ms: 200,
                rapid_fire_factor: 0.5,
                heat_per_shot: 6.0,
                heat_decay_per_sec: 20.0,
                max_heat: 100.0,
                heat_throttle: 80.0,
                heat_throttle_factor: 1.5,
                bullet_speed: 10.0,
                bullet_radius: 6.0,
                bullet_lifetime_ms: 2_000,
                split_min_level: 3,
                split_spread: 0.26,
                muzzle_offset: 40.0,
                homing_turn_rate: 0.08,
                levels: vec![
                    cannon_level("Starter Cannon", 5, 1, "#87CEEB"),
                    cannon_level("Standard Cannon", 10, 2, "#4682B4"),
                    cannon_level("Advanced Cannon", 20, 5, "#1E90FF"),
                    cannon_level("Elite Cannon", 40, 10, "#0000FF"),
                    cannon_level("Legendary Cannon", 80, 20, "#4B0082"),
                    cannon_level("Mythic Cannon", 150, 50, "#8B008B"),
                ],
            },
            skills: SkillCatalog {
                freeze: FreezeSkill {
                    name: "Deep Freeze".into(),
                    cost: 50,
                    cooldown_ms: 30_000,
                    duration_ms: 5_000,
                },
                bomb: BombSkill {
                    name: "Depth Bomb".into(),
                    cost: 100,
                    cooldown_ms: 45_000,
                    radius: 150.0,
                    bet_multiplier: 2,
                },
                laser: LaserSkill {
                    name: "Laser Cannon".into(),
                    cost: 200,
                    cooldown_ms: 60_000,
                    duration_ms: 3_000,
                    charge_ms: 1_000,
                    half_width: 50.0,
                    bet_multiplier: 3,
                },
                net: NetSkill {
                    name: "Fishing Net".into(),
                    cost: 150,
                    cooldown_ms: 50_000,
                    radius: 200.0,
                    capture_chance: 0.8,
                },
            },
            items: ItemCatalog {
                double_score: TimedItem {
                    name: "Double Score".into(),
                    cost: 80,
                    duration_ms: 15_000,
                },
                lucky_shot: CountedItem {
                    name: "Lucky Shot".into(),
                    cost: 120,
                    uses: 5,
                },
                rapid_fire: TimedItem {
                    name: "Rapid Fire".into(),
                    cost: 60,
                    duration_ms: 10_000,
                },
            },
            boss: BossConfig {
                spawn_interval_ms: 180_000,
                types: vec![
                    BossType {
                        name: "Kraken King".into(),
                        health: 500,
                        score: 1_000,
                        size: 150.0,
                        speed: 0.3,
                        color: "#8B0000".into(),
                    },
                    BossType {
                        name: "Abyss Overlord".into(),
                        health: 800,
                        score: 2_000,
                        size: 200.0,
                        speed: 0.2,
                        color: "#000080".into(),
                    },
                ],
            },
            jackpot: JackpotConfig {
                base_amount: 10_000,
                accumulation_rate: 0.01,
                win_probability: 0.001,
                multipliers: vec![1, 2, 5, 10, 50, 100],
            },
            combat: CombatConfig {
                combo_window_ms: 3_000,
                combo_bonus_step: 5,
                combo_bonus_points: 10,
                bullet_area: AreaProfile {
                    base_radius: 80.0,
                    radius_per_level: 25.0,
                    base_multiplier: 0.7,
                    multiplier_per_level: 0.15,
                    min_falloff: 0.0,
                },
                lightning_area: AreaProfile {
                    base_radius: 120.0,
                    radius_per_level: 30.0,
                    base_multiplier: 0.8,
                    multiplier_per_level: 0.2,
                    min_falloff: 0.3,
                },
                chain: ChainConfig {
                    max_active: 5,
                    base_chance: 0.2,
                    chance_per_level: 0.15,
                    max_chance: 0.7,
                    delay_ms: 200,
                    settle_ms: 1_000,
                    reveal_stagger_ms: 100,
                    range: 100.0,
                    branching: 2,
                    max_depth: 5,
                    max_targets: 12,
                    flourish_threshold: 8,
                },
                specials: SpecialConfig {
                    explosion_radius: 120.0,
                    explosion_damage: 10,
                    freeze_ms: 3_000,
                    multiplier_ms: 10_000,
                    jackpot_bonus: 1_000,
                },
            },
            lightning: LightningConfig {
                mode: LightningMode::Off,
                policy: TargetPolicy::LockUntilDead,
                tick_interval_ms: 500,
                strike_interval_ms: 2_000,
                strike_delay_ms: 10,
                max_track_ms: 10_000,
                interval_targets: 3,
                interval_hit_delay_ms: 150,
                interval_stagger_ms: 100,
            },
            missions: vec![
                MissionDef {
                    id: "catch_fish_10".into(),
                    name: "Novice Angler".into(),
                    description: "Catch 10 fish".into(),
                    target: 10,
                    reward: 100,
                    kind: MissionKind::CatchCount,
                },
                MissionDef {
                    id: "score_1000".into(),
                    name: "Score Hunter".into(),
                    description: "Earn 1000 points in one session".into(),
                    target: 1_000,
                    reward: 200,
                    kind: MissionKind::Score,
                },
                MissionDef {
                    id: "combo_5".into(),
                    name: "Combo Master".into(),
                    description: "Reach a 5-hit combo".into(),
                    target: 5,
                    reward: 150,
                    kind: MissionKind::Combo,
                },
            ],
            achievements: vec![
                AchievementDef {
                    id: "first_boss".into(),
                    name: "Boss Hunter".into(),
                    description: "Defeat your first boss".into(),
                    reward: 500,
                    icon: "👑".into(),
                    trigger: AchievementTrigger::FirstBoss,
                },
                AchievementDef {
                    id: "jackpot_winner".into(),
                    name: "Lucky Winner".into(),
                    description: "Win a jackpot".into(),
                    reward: 1_000,
                    icon: "💰".into(),
                    trigger: AchievementTrigger::JackpotWinner,
                },
                AchievementDef {
                    id: "master_fisher".into(),
                    name: "Master Fisher".into(),
                    description: "Catch 100 fish".into(),
                    reward: 2_000,
                    icon: "🎣".into(),
                    trigger: AchievementTrigger::MasterFisher,
                },
            ],
            auto_shoot_interval_ms: 150,
        }
    }
}
