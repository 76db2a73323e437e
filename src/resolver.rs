use std::collections::HashSet;

use tracing::debug;

use crate::board::{Board, Merge};
use crate::direction::Direction;
use crate::tile::TileId;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MoveOutcome {
    /// True if at least one tile moved or merged.
    pub moved: bool,
    pub merges: Vec<Merge>,
}

/// Slides and merges every tile on the board in one pass.
///
/// Cells are visited from the edge the tiles move toward, so every tile ahead
/// of the current one has already settled. A tile that absorbed a merge in
/// this pass will not absorb another one.
pub fn resolve_move(board: &mut Board, direction: Direction) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();
    let mut merged: HashSet<TileId> = HashSet::new();

    let order: Vec<_> = board.grid().sweep(direction).collect();
    for coord in order {
        let Some(id) = board.tile_at(coord).map(|tile| tile.id()) else {
            continue;
        };
        let slide = board.slide_as_far_as_possible(id, direction, |other| !merged.contains(&other));
        outcome.moved |= slide.moved;
        if let Some(merge) = slide.merge {
            merged.insert(merge.into);
            outcome.merges.push(merge);
        }
    }

    debug!(
        ?direction,
        moved = outcome.moved,
        merges = outcome.merges.len(),
        "resolved move"
    );
    outcome
}
