use crate::direction::Direction;
use crate::error::ConfigError;
use crate::tile::TileId;

pub const MIN_DIMENSION: usize = 2;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A fixed board location. Only the tile slot changes after the grid is built.
#[derive(Clone, Debug)]
pub struct Cell {
    coord: Coord,
    neighbors: [Option<usize>; 4],
    tile: Option<TileId>,
}

impl Cell {
    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// Index of the adjacent cell, `None` at the board edge.
    pub fn neighbor(&self, direction: Direction) -> Option<usize> {
        self.neighbors[direction.index()]
    }

    pub fn tile(&self) -> Option<TileId> {
        self.tile
    }

    pub fn is_empty(&self) -> bool {
        self.tile.is_none()
    }
}

/// N×N cells stored row-major, so cell `(x, y)` lives at `y * N + x`.
#[derive(Clone, Debug)]
pub struct Grid {
    dimension: usize,
    cells: Vec<Cell>,
}

// ============================================================================
// Construction
// ============================================================================

impl Grid {
    pub fn build(dimension: usize) -> Result<Self, ConfigError> {
        if dimension < MIN_DIMENSION {
            return Err(ConfigError::InvalidDimension(dimension));
        }

        let last = dimension - 1;
        let mut cells = Vec::with_capacity(dimension * dimension);
        for y in 0..dimension {
            for x in 0..dimension {
                let mut neighbors = [None; 4];
                if y > 0 {
                    neighbors[Direction::Up.index()] = Some((y - 1) * dimension + x);
                }
                if y < last {
                    neighbors[Direction::Down.index()] = Some((y + 1) * dimension + x);
                }
                if x > 0 {
                    neighbors[Direction::Left.index()] = Some(y * dimension + x - 1);
                }
                if x < last {
                    neighbors[Direction::Right.index()] = Some(y * dimension + x + 1);
                }
                cells.push(Cell {
                    coord: Coord { x, y },
                    neighbors,
                    tile: None,
                });
            }
        }

        Ok(Self { dimension, cells })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn index_of(&self, coord: Coord) -> Option<usize> {
        if coord.x < self.dimension && coord.y < self.dimension {
            Some(coord.y * self.dimension + coord.x)
        } else {
            None
        }
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn cell_at(&self, coord: Coord) -> Option<&Cell> {
        self.index_of(coord).map(|index| &self.cells[index])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn set_tile(&mut self, index: usize, tile: Option<TileId>) {
        self.cells[index].tile = tile;
    }

    pub(crate) fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.tile = None;
        }
    }

    /// Visits every cell once, starting at the edge tiles are moving toward.
    pub fn sweep(&self, direction: Direction) -> Sweep {
        Sweep {
            dimension: self.dimension,
            direction,
            step: 0,
        }
    }

    pub fn unoccupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Lazy, restartable cell order for one direction.
///
/// The outer loop runs over `x`, the inner over `y`. Down walks `y` from the
/// bottom and Right walks `x` from the right; Up and Left ascend on both axes.
/// Callers that only need a prefix stop with ordinary iterator adaptors.
#[derive(Clone, Debug)]
pub struct Sweep {
    dimension: usize,
    direction: Direction,
    step: usize,
}

impl Iterator for Sweep {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let n = self.dimension;
        if self.step >= n * n {
            return None;
        }
        let outer = self.step / n;
        let inner = self.step % n;
        self.step += 1;

        let coord = match self.direction {
            Direction::Up | Direction::Left => Coord::new(outer, inner),
            Direction::Down => Coord::new(outer, n - 1 - inner),
            Direction::Right => Coord::new(n - 1 - outer, inner),
        };
        Some(coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.dimension * self.dimension).saturating_sub(self.step);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Sweep {}
