use rand::{Rng, RngCore};
use tracing::trace;

use crate::board::Board;
use crate::direction::Direction;
use crate::grid::Coord;
use crate::tile::TileId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpawnOutcome {
    Placed { tile: TileId, at: Coord, level: u8 },
    /// No unoccupied cell was left. Nothing was created.
    BoardFull,
}

/// Places a tile of `level` into a uniformly chosen unoccupied cell.
///
/// # Panics
///
/// If the unoccupied count and the sweep disagree, which means the board's
/// bookkeeping is broken.
pub fn spawn_random<R: Rng + ?Sized>(board: &mut Board, rng: &mut R, level: u8) -> SpawnOutcome {
    let unoccupied = board.unoccupied_count();
    if unoccupied == 0 {
        trace!(level, "no room to spawn");
        return SpawnOutcome::BoardFull;
    }

    let countdown = rng.gen_range(0..unoccupied);
    let target = board
        .grid()
        .sweep(Direction::Up)
        .filter(|&coord| board.tile_at(coord).is_none())
        .nth(countdown);

    let Some(at) = target else {
        panic!("counted {unoccupied} unoccupied cells but the sweep found fewer");
    };
    let tile = board.create_tile(at, level);
    trace!(x = at.x, y = at.y, level, "spawned tile");
    SpawnOutcome::Placed { tile, at, level }
}

// ============================================================================
// Level Provider Trait
// ============================================================================

/// Chooses the level of the tile spawned after each move.
pub trait LevelProvider {
    fn next_level(&mut self, rng: &mut dyn RngCore) -> u8;

    /// Highest level this provider can return.
    fn max_level(&self) -> u8;
}

/// Uniform over `low..=high`. `RangeLevels::new(1, 2)` always yields 1.
#[derive(Clone, Copy, Debug)]
pub struct RangeLevels {
    low: u8,
    high: u8,
}

impl RangeLevels {
    /// Half-open range `low..high_exclusive`, never narrower than `low` alone.
    pub fn new(low: u8, high_exclusive: u8) -> Self {
        Self::inclusive(low, high_exclusive.saturating_sub(1))
    }

    pub fn inclusive(low: u8, high: u8) -> Self {
        Self {
            low,
            high: high.max(low),
        }
    }
}

impl LevelProvider for RangeLevels {
    fn next_level(&mut self, rng: &mut dyn RngCore) -> u8 {
        rng.gen_range(self.low..=self.high)
    }

    fn max_level(&self) -> u8 {
        self.high
    }
}

/// Level 2 with probability `high_chance`, level 1 otherwise.
#[derive(Clone, Copy, Debug)]
pub struct WeightedLevels {
    high_chance: f64,
}

impl WeightedLevels {
    pub fn new(high_chance: f64) -> Self {
        Self {
            high_chance: high_chance.clamp(0.0, 1.0),
        }
    }
}

impl LevelProvider for WeightedLevels {
    fn next_level(&mut self, rng: &mut dyn RngCore) -> u8 {
        if rng.gen_bool(self.high_chance) {
            2
        } else {
            1
        }
    }

    fn max_level(&self) -> u8 {
        2
    }
}

pub struct SequenceLevels {
    levels: Vec<u8>,
    index: usize,
}

impl SequenceLevels {
    pub fn new(levels: Vec<u8>) -> Self {
        assert!(!levels.is_empty(), "a level sequence needs at least one level");
        Self { levels, index: 0 }
    }
}

impl LevelProvider for SequenceLevels {
    fn next_level(&mut self, _rng: &mut dyn RngCore) -> u8 {
        let level = self.levels[self.index % self.levels.len()];
        self.index += 1;
        level
    }

    fn max_level(&self) -> u8 {
        self.levels.iter().copied().max().unwrap_or(1)
    }
}
