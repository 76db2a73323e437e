use std::collections::HashMap;

use crate::direction::Direction;
use crate::error::ConfigError;
use crate::grid::{Coord, Grid};
use crate::tile::{Tile, TileId, LEVEL_CEILING};

// ============================================================================
// Types
// ============================================================================

/// What a tile would run into if it took one step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Advance {
    /// Board edge, or a neighbor of a different level.
    Blocked,
    /// Neighbor cell is empty.
    Free,
    /// Neighbor holds a tile of the same level.
    Merge(TileId),
}

/// A completed merge: the surviving tile, where it sits and its new level.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Merge {
    pub into: TileId,
    pub at: Coord,
    pub level: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Slide {
    pub moved: bool,
    pub merge: Option<Merge>,
}

/// Grid plus the tiles sitting on it.
///
/// Every tile in the arena is claimed by exactly one cell, and that cell's
/// slot holds exactly that tile.
#[derive(Clone, Debug)]
pub struct Board {
    grid: Grid,
    tiles: HashMap<TileId, Tile>,
    next_id: u64,
}

// ============================================================================
// Construction and queries
// ============================================================================

impl Board {
    pub fn new(dimension: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            grid: Grid::build(dimension)?,
            tiles: HashMap::new(),
            next_id: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn dimension(&self) -> usize {
        self.grid.dimension()
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn tile_at(&self, coord: Coord) -> Option<&Tile> {
        self.grid
            .cell_at(coord)
            .and_then(|cell| cell.tile())
            .and_then(|id| self.tiles.get(&id))
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn unoccupied_count(&self) -> usize {
        self.grid.unoccupied_count()
    }

    pub fn is_full(&self) -> bool {
        self.unoccupied_count() == 0
    }

    /// True if some move in some direction would change the board.
    pub fn has_legal_move(&self) -> bool {
        if !self.is_full() {
            return true;
        }
        self.tiles.values().any(|tile| {
            [Direction::Right, Direction::Down]
                .into_iter()
                .any(|direction| matches!(self.can_advance(tile.id(), direction), Advance::Merge(_)))
        })
    }

    /// Levels in row-major order, `None` for empty cells.
    pub fn levels(&self) -> Vec<Vec<Option<u8>>> {
        let n = self.dimension();
        (0..n)
            .map(|y| {
                (0..n)
                    .map(|x| self.tile_at(Coord::new(x, y)).map(Tile::level))
                    .collect()
            })
            .collect()
    }

    /// Removes every tile. The grid itself is kept.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.tiles.clear();
        self.next_id = 0;
    }

    // ========================================================================
    // Creation and removal
    // ========================================================================

    /// Puts a new tile into an empty cell.
    ///
    /// # Panics
    ///
    /// If the coordinate is off the board, the cell is occupied, or the level
    /// is outside `1..=LEVEL_CEILING`.
    pub fn create_tile(&mut self, coord: Coord, level: u8) -> TileId {
        assert!(
            (1..=LEVEL_CEILING).contains(&level),
            "cannot create a tile of level {level}"
        );
        let index = self
            .grid
            .index_of(coord)
            .unwrap_or_else(|| panic!("cannot create a tile off the board at {coord:?}"));
        assert!(
            self.grid.cell(index).is_empty(),
            "cannot create a tile in occupied cell {coord:?}"
        );

        let id = TileId(self.next_id);
        self.next_id += 1;
        self.tiles.insert(id, Tile::new(id, level, coord));
        self.grid.set_tile(index, Some(id));
        id
    }

    fn remove_tile(&mut self, id: TileId) -> Tile {
        let tile = self
            .tiles
            .remove(&id)
            .unwrap_or_else(|| panic!("tile {id:?} is not on the board"));
        let index = self.claimed_index(&tile);
        self.grid.set_tile(index, None);
        tile
    }

    fn claimed_index(&self, tile: &Tile) -> usize {
        let index = self
            .grid
            .index_of(tile.cell())
            .unwrap_or_else(|| panic!("tile {:?} claims off-board cell {:?}", tile.id(), tile.cell()));
        assert_eq!(
            self.grid.cell(index).tile(),
            Some(tile.id()),
            "cell {:?} does not hold the tile that claims it",
            tile.cell()
        );
        index
    }

    // ========================================================================
    // Movement primitives
    // ========================================================================

    pub fn can_advance(&self, id: TileId, direction: Direction) -> Advance {
        let tile = &self.tiles[&id];
        let here = self.claimed_index(tile);
        let Some(next) = self.grid.cell(here).neighbor(direction) else {
            return Advance::Blocked;
        };
        match self.grid.cell(next).tile() {
            None => Advance::Free,
            Some(other) if self.tiles[&other].can_merge_with(tile) => Advance::Merge(other),
            Some(_) => Advance::Blocked,
        }
    }

    /// Moves a tile into a different, empty cell.
    ///
    /// # Panics
    ///
    /// If the destination is occupied, is the tile's own cell, or the tile's
    /// cell does not hold it.
    pub fn step_into(&mut self, id: TileId, destination: usize) {
        let source = self.claimed_index(&self.tiles[&id]);
        assert_ne!(source, destination, "tile {id:?} cannot step into its own cell");
        assert!(
            self.grid.cell(destination).is_empty(),
            "tile {id:?} cannot step into occupied cell {:?}",
            self.grid.cell(destination).coord()
        );

        let coord = self.grid.cell(destination).coord();
        self.grid.set_tile(source, None);
        self.grid.set_tile(destination, Some(id));
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.relocate(coord);
        }
    }

    /// Destroys `moving` and raises `stationary` by one level.
    ///
    /// # Panics
    ///
    /// If the two tiles are the same tile, have different levels, or are
    /// already at `LEVEL_CEILING`.
    pub fn merge(&mut self, moving: TileId, stationary: TileId) -> Merge {
        assert_ne!(moving, stationary, "a tile cannot merge with itself");
        let moving_level = self.tiles[&moving].level();
        let stationary_level = self.tiles[&stationary].level();
        assert_eq!(
            moving_level, stationary_level,
            "cannot merge level {moving_level} into level {stationary_level}"
        );
        assert!(
            stationary_level < LEVEL_CEILING,
            "cannot merge tiles already at level {LEVEL_CEILING}"
        );

        self.remove_tile(moving);
        let tile = self
            .tiles
            .get_mut(&stationary)
            .unwrap_or_else(|| panic!("tile {stationary:?} is not on the board"));
        tile.level_up();
        Merge {
            into: stationary,
            at: tile.cell(),
            level: tile.level(),
        }
    }

    /// Steps a tile until it is blocked, merging at most once at the end.
    ///
    /// `mergeable` decides whether a same-level neighbor may absorb the tile.
    pub fn slide_as_far_as_possible<F>(&mut self, id: TileId, direction: Direction, mergeable: F) -> Slide
    where
        F: Fn(TileId) -> bool,
    {
        let mut slide = Slide::default();
        loop {
            match self.can_advance(id, direction) {
                Advance::Free => {
                    let here = self.claimed_index(&self.tiles[&id]);
                    let next = self
                        .grid
                        .cell(here)
                        .neighbor(direction)
                        .unwrap_or_else(|| panic!("free advance from {here} has no neighbor"));
                    self.step_into(id, next);
                    slide.moved = true;
                }
                Advance::Merge(other) if mergeable(other) => {
                    slide.merge = Some(self.merge(id, other));
                    slide.moved = true;
                    return slide;
                }
                Advance::Merge(_) | Advance::Blocked => return slide,
            }
        }
    }

    /// Checks that tiles and cells agree with each other.
    pub fn is_consistent(&self) -> bool {
        let claimed = self.grid.cells().filter(|cell| !cell.is_empty()).count();
        claimed == self.tiles.len()
            && self.tiles.values().all(|tile| {
                self.grid
                    .cell_at(tile.cell())
                    .is_some_and(|cell| cell.tile() == Some(tile.id()))
            })
    }
}
