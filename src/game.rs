use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, trace};

use crate::board::Board;
use crate::config::{GameConfig, LossRule, SEED_LEVELS};
use crate::direction::Direction;
use crate::error::{ConfigError, PlaceError};
use crate::grid::Coord;
use crate::resolver::resolve_move;
use crate::spawner::{self, LevelProvider, SpawnOutcome};
use crate::tile::{Tile, TileId};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Active,
    /// Terminal until the next new game. Blocks every board mutation.
    Lost,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    TileCreated { at: Coord, level: u8 },
    Moved(Direction),
    TileMerged { at: Coord, level: u8 },
    ScoreIncrement(u64),
    Lost,
    GameRestarted,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    board: Board,
    config: GameConfig,
    state: GameState,
    score: u64,
    level_provider: Box<dyn LevelProvider>,
    rng: StdRng,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let provider = config.spawn_policy.provider();
        Self::with_provider(config, provider)
    }

    pub fn with_provider(config: GameConfig, level_provider: Box<dyn LevelProvider>) -> Result<Self, ConfigError> {
        config.validate()?;
        if level_provider.max_level() > config.max_level {
            return Err(ConfigError::SpawnLevelOutOfRange {
                level: level_provider.max_level(),
                max_level: config.max_level,
            });
        }

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut game = Self {
            board: Board::new(config.dimension)?,
            config,
            state: GameState::Active,
            score: 0,
            level_provider,
            rng,
            events: Vec::new(),
        };
        game.start();
        Ok(game)
    }

    /// Empties the board and starts over, rebuilding the grid if the
    /// dimension changed. Invalid input leaves the current game untouched.
    pub fn new_game(&mut self, dimension: usize, seed_tiles: bool) -> Result<(), ConfigError> {
        let config = GameConfig {
            dimension,
            seed_tiles,
            ..self.config.clone()
        };
        config.validate()?;

        if dimension == self.board.dimension() {
            self.board.clear();
        } else {
            self.board = Board::new(dimension)?;
        }
        self.config = config;
        self.state = GameState::Active;
        self.score = 0;
        self.events.clear();
        self.events.push(GameEvent::GameRestarted);
        self.start();
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), ConfigError> {
        self.new_game(self.config.dimension, self.config.seed_tiles)
    }

    fn start(&mut self) {
        info!(
            dimension = self.config.dimension,
            seed_tiles = self.config.seed_tiles,
            "new game"
        );
        if self.config.seed_tiles {
            for level in SEED_LEVELS {
                self.spawn_tile(level);
            }
        }
    }

    // ========================================================================
    // Moves
    // ========================================================================

    /// Slides every tile toward `direction`. Returns whether anything moved.
    pub fn apply_move(&mut self, direction: Direction) -> bool {
        if self.state == GameState::Lost {
            return false;
        }

        let outcome = resolve_move(&mut self.board, direction);
        if outcome.moved {
            self.events.push(GameEvent::Moved(direction));
        }
        for merge in &outcome.merges {
            self.events.push(GameEvent::TileMerged {
                at: merge.at,
                level: merge.level,
            });
            self.add_score(u64::from(merge.level));
        }

        if outcome.moved {
            let level = self.level_provider.next_level(&mut self.rng);
            match self.spawn_tile(level) {
                SpawnOutcome::BoardFull => self.lose(),
                SpawnOutcome::Placed { .. } => {
                    if self.config.loss_rule == LossRule::NoLegalMove && !self.board.has_legal_move() {
                        self.lose();
                    }
                }
            }
        } else {
            let lost = match self.config.loss_rule {
                LossRule::AttemptedDirection => self.board.is_full(),
                LossRule::NoLegalMove => !self.board.has_legal_move(),
            };
            if lost {
                self.lose();
            }
        }

        outcome.moved
    }

    fn lose(&mut self) {
        self.state = GameState::Lost;
        self.events.push(GameEvent::Lost);
        info!(score = self.score, "game lost");
    }

    fn add_score(&mut self, amount: u64) {
        self.score += amount;
        self.events.push(GameEvent::ScoreIncrement(amount));
    }

    // ========================================================================
    // Tile creation
    // ========================================================================

    fn spawn_tile(&mut self, level: u8) -> SpawnOutcome {
        let outcome = spawner::spawn_random(&mut self.board, &mut self.rng, level);
        if let SpawnOutcome::Placed { at, level, .. } = outcome {
            self.tile_created(at, level);
        }
        outcome
    }

    fn tile_created(&mut self, at: Coord, level: u8) {
        self.events.push(GameEvent::TileCreated { at, level });
        self.add_score(u64::from(level));
    }

    fn check_level(&self, level: u8) -> Result<(), PlaceError> {
        if level < 1 || level > self.config.max_level {
            return Err(PlaceError::LevelOutOfRange {
                level,
                max_level: self.config.max_level,
            });
        }
        Ok(())
    }

    /// Puts a tile of `level` into a uniformly chosen empty cell.
    pub fn spawn_random(&mut self, level: u8) -> Result<SpawnOutcome, PlaceError> {
        if self.state == GameState::Lost {
            return Err(PlaceError::GameLost);
        }
        self.check_level(level)?;
        Ok(self.spawn_tile(level))
    }

    /// Puts a tile at an exact coordinate.
    pub fn place_tile(&mut self, x: usize, y: usize, level: u8) -> Result<TileId, PlaceError> {
        if self.state == GameState::Lost {
            return Err(PlaceError::GameLost);
        }
        self.check_level(level)?;

        let at = Coord::new(x, y);
        let dimension = self.board.dimension();
        let cell = self
            .board
            .grid()
            .cell_at(at)
            .ok_or(PlaceError::OutOfBounds { x, y, dimension })?;
        if !cell.is_empty() {
            return Err(PlaceError::Occupied { x, y });
        }

        let id = self.board.create_tile(at, level);
        trace!(x, y, level, "placed tile");
        self.tile_created(at, level);
        Ok(id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_lost(&self) -> bool {
        self.state == GameState::Lost
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn dimension(&self) -> usize {
        self.board.dimension()
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Option<&Tile> {
        self.board.tile_at(Coord::new(x, y))
    }

    pub fn unoccupied_count(&self) -> usize {
        self.board.unoccupied_count()
    }

    pub fn is_full(&self) -> bool {
        self.board.is_full()
    }

    pub fn has_legal_move(&self) -> bool {
        self.board.has_legal_move()
    }

    /// Row-major level snapshot for renderers, `None` for empty cells.
    pub fn levels(&self) -> Vec<Vec<Option<u8>>> {
        self.board.levels()
    }

    pub fn highest_level(&self) -> Option<u8> {
        self.board.tiles().map(Tile::level).max()
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::spawner::SequenceLevels;

    pub const TEST_SEED: u64 = 2048;

    /// Unseeded board, fixed RNG seed, spawns always level 1.
    pub fn test_config(dimension: usize) -> GameConfig {
        GameConfig {
            dimension,
            seed_tiles: false,
            rng_seed: Some(TEST_SEED),
            ..GameConfig::default()
        }
    }

    /// Builds a game from square rows of levels, 0 meaning empty.
    /// Setup events and score are discarded.
    pub fn game_from_rows(rows: &[&[u8]]) -> Game {
        game_from_rows_with(rows, test_config(rows.len()))
    }

    pub fn game_from_rows_with(rows: &[&[u8]], config: GameConfig) -> Game {
        let dimension = rows.len();
        assert!(rows.iter().all(|row| row.len() == dimension), "rows must form a square");

        let mut game = Game::with_provider(config, Box::new(SequenceLevels::new(vec![1])))
            .expect("test config is valid");
        for (y, row) in rows.iter().enumerate() {
            for (x, &level) in row.iter().enumerate() {
                if level > 0 {
                    game.place_tile(x, y, level).expect("test tile placement");
                }
            }
        }
        game.score = 0;
        game.events.clear();
        game
    }

    /// Levels in row `y`, 0 for empty cells.
    pub fn row(game: &Game, y: usize) -> Vec<u8> {
        (0..game.dimension())
            .map(|x| game.tile_at(x, y).map_or(0, Tile::level))
            .collect()
    }

    pub fn all_rows(game: &Game) -> Vec<Vec<u8>> {
        (0..game.dimension()).map(|y| row(game, y)).collect()
    }

    /// Full board where no two neighbors share a level.
    pub fn checkerboard(dimension: usize) -> Vec<Vec<u8>> {
        (0..dimension)
            .map(|y| (0..dimension).map(|x| 1 + ((x + y) % 2) as u8).collect())
            .collect()
    }
}
