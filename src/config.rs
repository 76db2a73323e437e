use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::grid::MIN_DIMENSION;
use crate::spawner::{LevelProvider, RangeLevels, WeightedLevels};
use crate::tile::LEVEL_CEILING;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_DIMENSION: usize = 4;
/// Level 17 shows 65536, the largest face value on a classic 4x4 game.
pub const DEFAULT_MAX_LEVEL: u8 = 17;
/// Chance of a level-2 spawn under [`SpawnPolicy::Classic`].
pub const CLASSIC_HIGH_CHANCE: f64 = 0.1;

/// Seed tiles placed by a new game, in order.
pub const SEED_LEVELS: [u8; 2] = [1, 2];

/// When a move that changed nothing ends the game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossRule {
    /// Lost when the attempted direction moves nothing and no cell is empty.
    #[default]
    AttemptedDirection,
    /// Lost when no cell is empty and no direction has a merge left.
    NoLegalMove,
}

/// Level distribution of the tile spawned after each move.
#[derive(Clone, Copy, PartialEq, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// Draws from `1..2`, which only ever yields level 1.
    #[default]
    Original,
    /// Level 2 one time in ten, level 1 otherwise.
    Classic,
    Fixed(u8),
}

impl SpawnPolicy {
    pub fn provider(self) -> Box<dyn LevelProvider> {
        match self {
            SpawnPolicy::Original => Box::new(RangeLevels::new(1, 2)),
            SpawnPolicy::Classic => Box::new(WeightedLevels::new(CLASSIC_HIGH_CHANCE)),
            SpawnPolicy::Fixed(level) => Box::new(RangeLevels::inclusive(level, level)),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub dimension: usize,
    pub max_level: u8,
    pub seed_tiles: bool,
    pub loss_rule: LossRule,
    pub spawn_policy: SpawnPolicy,
    /// Fixed RNG seed for reproducible games, entropy otherwise.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            max_level: DEFAULT_MAX_LEVEL,
            seed_tiles: true,
            loss_rule: LossRule::default(),
            spawn_policy: SpawnPolicy::default(),
            rng_seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension < MIN_DIMENSION {
            return Err(ConfigError::InvalidDimension(self.dimension));
        }
        // Seed tiles go up to level 2.
        if self.max_level < 2 {
            return Err(ConfigError::MaxLevelTooLow(self.max_level));
        }
        if self.max_level > LEVEL_CEILING {
            return Err(ConfigError::MaxLevelTooHigh {
                level: self.max_level,
                ceiling: LEVEL_CEILING,
            });
        }
        if let SpawnPolicy::Fixed(level) = self.spawn_policy {
            if level < 1 || level > self.max_level {
                return Err(ConfigError::SpawnLevelOutOfRange {
                    level,
                    max_level: self.max_level,
                });
            }
        }
        Ok(())
    }
}
