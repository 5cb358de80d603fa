//! Controller configuration: chapter limit and restart behaviour.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from validating configuration input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("chapter limit must be between {min} and {max}, got {value}")]
    ChapterLimitOutOfRange { value: i64, min: u32, max: u32 },

    #[error("chapter limit must be a whole number, got {0:?}")]
    ChapterLimitNotANumber(String),
}

/// Number of chapters after which the story concludes.
///
/// Always within [`ChapterLimit::MIN`]..=[`ChapterLimit::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ChapterLimit(u32);

impl ChapterLimit {
    pub const MIN: u32 = 3;
    pub const MAX: u32 = 50;
    /// Upper end of the preset selector. Longer stories need custom entry.
    pub const PRESET_MAX: u32 = 20;
    pub const DEFAULT: ChapterLimit = ChapterLimit(10);

    /// Validate an explicit chapter count.
    pub fn new(value: u32) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::ChapterLimitOutOfRange {
                value: i64::from(value),
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    /// Parse free-form custom input such as `" 25 "`.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let trimmed = input.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| ConfigError::ChapterLimitNotANumber(trimmed.to_string()))?;
        match u32::try_from(value) {
            Ok(v) => Self::new(v),
            Err(_) => Err(ConfigError::ChapterLimitOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            }),
        }
    }

    /// Move along the preset range by `delta`, clamping to `[MIN, PRESET_MAX]`.
    pub fn step_preset(self, delta: i32) -> Self {
        let next = i64::from(self.0) + i64::from(delta);
        let clamped = next.clamp(i64::from(Self::MIN), i64::from(Self::PRESET_MAX));
        Self(clamped as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Whether the preset selector can represent this value.
    pub fn is_preset(self) -> bool {
        self.0 <= Self::PRESET_MAX
    }

    pub fn tier(self) -> LengthTier {
        if self.0 < 10 {
            LengthTier::Short
        } else if self.0 < 20 {
            LengthTier::Medium
        } else {
            LengthTier::Epic
        }
    }
}

impl Default for ChapterLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for ChapterLimit {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChapterLimit> for u32 {
    fn from(limit: ChapterLimit) -> Self {
        limit.0
    }
}

impl fmt::Display for ChapterLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rough length of an adventure, used for the setup blurb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthTier {
    Short,
    Medium,
    Epic,
}

impl LengthTier {
    pub fn description(self) -> &'static str {
        match self {
            LengthTier::Short => {
                "A shorter adventure will conclude quickly, offering a concise experience."
            }
            LengthTier::Medium => {
                "A medium-length adventure balances story depth with completion time."
            }
            LengthTier::Epic => {
                "An epic journey allows for rich character development and complex storylines."
            }
        }
    }
}

/// What Restart does after clearing the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartMode {
    /// Go back to the setup screen.
    #[default]
    Setup,
    /// Skip setup and fetch a new opening with the same chapter limit.
    Immediate,
}

/// Configuration for a [`Controller`](crate::Controller).
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    /// Initial chapter limit. Can be changed while configuring.
    pub chapter_limit: ChapterLimit,

    /// Behaviour of Restart.
    pub restart_mode: RestartMode,

    /// Tell the service to drop the old session on Restart.
    pub release_on_restart: bool,
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chapter_limit(mut self, limit: ChapterLimit) -> Self {
        self.chapter_limit = limit;
        self
    }

    pub fn with_restart_mode(mut self, mode: RestartMode) -> Self {
        self.restart_mode = mode;
        self
    }

    pub fn with_release_on_restart(mut self, release: bool) -> Self {
        self.release_on_restart = release;
        self
    }
}
