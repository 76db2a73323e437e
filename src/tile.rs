use crate::grid::Coord;

/// Highest level a tile can hold. Its face value, `2^63`, is the largest
/// power of two a `u64` holds. Tiles at this level no longer merge.
pub const LEVEL_CEILING: u8 = 64;

/// Identifier of a tile within one game. Never reused until the next game.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TileId(pub(crate) u64);

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tile {
    id: TileId,
    level: u8,
    cell: Coord,
}

impl Tile {
    pub(crate) fn new(id: TileId, level: u8, cell: Coord) -> Self {
        debug_assert!(level >= 1, "tile level starts at 1");
        Self { id, level, cell }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Coordinate of the cell currently holding this tile.
    pub fn cell(&self) -> Coord {
        self.cell
    }

    /// Face value shown to the player: `2^(level - 1)`.
    pub fn value(&self) -> u64 {
        display_value(self.level)
    }

    pub fn can_merge_with(&self, other: &Tile) -> bool {
        self.level == other.level && self.level < LEVEL_CEILING
    }

    pub(crate) fn relocate(&mut self, cell: Coord) {
        self.cell = cell;
    }

    /// # Panics
    ///
    /// If the tile is already at [`LEVEL_CEILING`].
    pub(crate) fn level_up(&mut self) {
        self.level = self
            .level
            .checked_add(1)
            .filter(|&level| level <= LEVEL_CEILING)
            .unwrap_or_else(|| panic!("tile {:?} cannot level up past {LEVEL_CEILING}", self.id));
    }
}

/// Face value of a tile at `level`, which must lie in `1..=LEVEL_CEILING`.
pub fn display_value(level: u8) -> u64 {
    debug_assert!(
        (1..=LEVEL_CEILING).contains(&level),
        "level {level} has no face value"
    );
    1u64 << (level - 1)
}
