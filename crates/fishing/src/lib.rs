//! Fish-shooting arcade combat core.
//!
//! A [`Session`] owns the whole game: the fish population, the cannon and
//! its bullets, the coin/score economy, skills and items, bosses, the
//! jackpot, lightning and every delayed effect. The presentation layer feeds
//! it [`Intent`]s and frame deltas, then reads back a [`HudSnapshot`], the
//! live visual effect requests and the drained [`CoreEvent`]s.

pub mod boss;
pub mod bullet;
pub mod cannon;
pub mod combat;
pub mod config;
pub mod economy;
pub mod effects;
pub mod error;
pub mod events;
pub mod fish;
pub mod fish_manager;
pub mod lightning;
pub mod loadout;
pub mod progress;
pub mod session;
pub mod snapshot;

pub use config::GameCatalog;
pub use error::{GameError, GameResult};
pub use events::CoreEvent;
pub use fish::{FishId, FishSpecial};
pub use lightning::{LightningMode, TargetPolicy};
pub use loadout::{ItemKind, SkillKind};
pub use session::{GamePhase, Intent, Session};
pub use snapshot::HudSnapshot;
