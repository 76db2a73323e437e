use thiserror::Error;

/// Rejected configuration. Nothing is mutated when one of these is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board dimension {0} is too small, need at least 2")]
    InvalidDimension(usize),

    #[error("maximum tile level {0} is too low, need at least 2")]
    MaxLevelTooLow(u8),

    #[error("maximum tile level {level} is too high, at most {ceiling} is supported")]
    MaxLevelTooHigh { level: u8, ceiling: u8 },

    #[error("spawn level {level} is outside 1..={max_level}")]
    SpawnLevelOutOfRange { level: u8, max_level: u8 },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Reasons a direct placement or spawn request was ignored.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("the game is lost, start a new game first")]
    GameLost,

    #[error("({x}, {y}) is outside a {dimension}x{dimension} board")]
    OutOfBounds { x: usize, y: usize, dimension: usize },

    #[error("cell ({x}, {y}) already holds a tile")]
    Occupied { x: usize, y: usize },

    #[error("tile level {level} is outside 1..={max_level}")]
    LevelOutOfRange { level: u8, max_level: u8 },
}
