//! Error type shared by the game core.

use std::path::PathBuf;

use thiserror::Error;

use crate::loadout::SkillKind;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("game catalog not found at {path:?}")]
    ConfigMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("game catalog at {path:?} could not be parsed: {message}")]
    ConfigMalformed { path: PathBuf, message: String },

    #[error("game catalog is invalid: {0}")]
    ConfigInvalid(String),

    #[error("insufficient coins: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("{skill} is cooling down ({remaining_ms} ms left)")]
    SkillCoolingDown { skill: SkillKind, remaining_ms: u64 },

    #[error("bet {0} is not on the bet ladder")]
    InvalidBet(u64),

    #[error("unknown skill '{0}'")]
    UnknownSkill(String),

    #[error("unknown item '{0}'")]
    UnknownItem(String),

    #[error("target is no longer in play")]
    InvalidTarget,

    #[error("intent ignored outside of play")]
    NotPlaying,
}

impl GameError {
    /// Configuration errors halt start-up; everything else is recoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GameError::ConfigMissing { .. } | GameError::ConfigMalformed { .. } | GameError::ConfigInvalid(_)
        )
    }
}

pub type GameResult<T> = Result<T, GameError>;
