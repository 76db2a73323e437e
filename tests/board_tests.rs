//! Tests for the board layer below the game
//!
//! Test categories:
//! - Grid construction and neighbor links
//! - Sweep order per direction
//! - Movement primitives (advance, step, merge, slide)
//! - Whole-board move resolution
//! - Random spawning and spawn-level providers

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use merge_tiles::board::{Advance, Board, Merge};
use merge_tiles::direction::Direction;
use merge_tiles::error::ConfigError;
use merge_tiles::grid::{Coord, Grid};
use merge_tiles::resolver::resolve_move;
use merge_tiles::spawner::{
    spawn_random, LevelProvider, RangeLevels, SequenceLevels, SpawnOutcome, WeightedLevels,
};
use merge_tiles::tile::{display_value, LEVEL_CEILING};

fn board_from_rows(rows: &[&[u8]]) -> Board {
    let mut board = Board::new(rows.len()).unwrap();
    for (y, row) in rows.iter().enumerate() {
        for (x, &level) in row.iter().enumerate() {
            if level > 0 {
                board.create_tile(Coord::new(x, y), level);
            }
        }
    }
    board
}

fn rows_of(board: &Board) -> Vec<Vec<u8>> {
    board
        .levels()
        .into_iter()
        .map(|row| row.into_iter().map(|level| level.unwrap_or(0)).collect())
        .collect()
}

fn position(order: &[Coord], x: usize, y: usize) -> usize {
    order.iter().position(|&c| c == Coord::new(x, y)).unwrap()
}

// ============================================================================
// Grid Construction Tests
// ============================================================================

mod grid_construction {
    use super::*;

    #[test]
    fn rejects_boards_smaller_than_two() {
        assert!(matches!(Grid::build(0), Err(ConfigError::InvalidDimension(0))));
        assert!(matches!(Grid::build(1), Err(ConfigError::InvalidDimension(1))));
    }

    #[test]
    fn builds_one_cell_per_coordinate() {
        let grid = Grid::build(4).unwrap();
        assert_eq!(grid.cells().count(), 16);
        assert_eq!(grid.unoccupied_count(), 16);

        let coords: HashSet<Coord> = grid.cells().map(|cell| cell.coord()).collect();
        assert_eq!(coords.len(), 16);
    }

    #[test]
    fn corner_has_no_outward_neighbors() {
        let grid = Grid::build(4).unwrap();
        let corner = grid.cell_at(Coord::new(0, 0)).unwrap();

        assert_eq!(corner.neighbor(Direction::Up), None);
        assert_eq!(corner.neighbor(Direction::Left), None);
        assert_eq!(corner.neighbor(Direction::Right), grid.index_of(Coord::new(1, 0)));
        assert_eq!(corner.neighbor(Direction::Down), grid.index_of(Coord::new(0, 1)));
    }

    #[test]
    fn far_corner_has_no_outward_neighbors() {
        let grid = Grid::build(4).unwrap();
        let corner = grid.cell_at(Coord::new(3, 3)).unwrap();

        assert_eq!(corner.neighbor(Direction::Down), None);
        assert_eq!(corner.neighbor(Direction::Right), None);
        assert_eq!(corner.neighbor(Direction::Up), grid.index_of(Coord::new(3, 2)));
        assert_eq!(corner.neighbor(Direction::Left), grid.index_of(Coord::new(2, 3)));
    }

    #[test]
    fn neighbors_are_symmetric() {
        let grid = Grid::build(5).unwrap();
        for (index, cell) in grid.cells().enumerate() {
            for direction in Direction::ALL {
                if let Some(next) = cell.neighbor(direction) {
                    assert_eq!(grid.cell(next).neighbor(direction.opposite()), Some(index));
                }
            }
        }
    }

    #[test]
    fn off_board_coordinates_have_no_cell() {
        let grid = Grid::build(3).unwrap();
        assert!(grid.cell_at(Coord::new(3, 0)).is_none());
        assert!(grid.cell_at(Coord::new(0, 3)).is_none());
    }
}

// ============================================================================
// Sweep Order Tests
// ============================================================================

mod sweep_order {
    use super::*;

    fn order(direction: Direction) -> Vec<Coord> {
        Grid::build(4).unwrap().sweep(direction).collect()
    }

    #[test]
    fn every_direction_visits_each_cell_once() {
        for direction in Direction::ALL {
            let visited = order(direction);
            let distinct: HashSet<Coord> = visited.iter().copied().collect();
            assert_eq!(visited.len(), 16);
            assert_eq!(distinct.len(), 16);
        }
    }

    #[test]
    fn left_starts_at_left_edge() {
        let visited = order(Direction::Left);
        assert!(position(&visited, 0, 0) < position(&visited, 3, 0));
        assert_eq!(visited[0], Coord::new(0, 0));
    }

    #[test]
    fn right_starts_at_right_edge() {
        let visited = order(Direction::Right);
        assert!(position(&visited, 3, 0) < position(&visited, 0, 0));
        assert_eq!(visited[0], Coord::new(3, 0));
    }

    #[test]
    fn up_starts_at_top_edge() {
        let visited = order(Direction::Up);
        assert!(position(&visited, 0, 0) < position(&visited, 0, 3));
    }

    #[test]
    fn down_starts_at_bottom_edge() {
        let visited = order(Direction::Down);
        assert!(position(&visited, 0, 3) < position(&visited, 0, 0));
        assert_eq!(visited[0], Coord::new(0, 3));
    }

    #[test]
    fn sweep_can_stop_early() {
        let grid = Grid::build(4).unwrap();
        let mut sweep = grid.sweep(Direction::Up);
        assert_eq!(sweep.len(), 16);
        assert_eq!(sweep.nth(5), Some(Coord::new(1, 1)));
        assert_eq!(sweep.len(), 10);
    }

    #[test]
    fn sweep_restarts_from_a_clone() {
        let grid = Grid::build(3).unwrap();
        let sweep = grid.sweep(Direction::Right);
        let first: Vec<Coord> = sweep.clone().take(2).collect();
        let again: Vec<Coord> = sweep.take(2).collect();
        assert_eq!(first, again);
    }
}

// ============================================================================
// Movement Primitive Tests
// ============================================================================

mod primitives {
    use super::*;

    #[test]
    fn edge_blocks_advance() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(0, 0), 1);

        assert_eq!(board.can_advance(tile, Direction::Left), Advance::Blocked);
        assert_eq!(board.can_advance(tile, Direction::Up), Advance::Blocked);
        assert_eq!(board.can_advance(tile, Direction::Right), Advance::Free);
    }

    #[test]
    fn equal_neighbor_allows_merge() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(0, 0), 1);
        let other = board.create_tile(Coord::new(1, 0), 1);

        assert_eq!(board.can_advance(tile, Direction::Right), Advance::Merge(other));
    }

    #[test]
    fn different_neighbor_blocks_advance() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(0, 0), 1);
        board.create_tile(Coord::new(0, 1), 2);

        assert_eq!(board.can_advance(tile, Direction::Down), Advance::Blocked);
    }

    #[test]
    fn step_into_moves_claim() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(0, 0), 3);
        let destination = board.grid().index_of(Coord::new(1, 0)).unwrap();

        board.step_into(tile, destination);

        assert_eq!(board.tile(tile).unwrap().cell(), Coord::new(1, 0));
        assert!(board.tile_at(Coord::new(0, 0)).is_none());
        assert_eq!(board.tile_at(Coord::new(1, 0)).unwrap().id(), tile);
        assert!(board.is_consistent());
    }

    #[test]
    #[should_panic(expected = "occupied")]
    fn step_into_occupied_cell_panics() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(0, 0), 1);
        board.create_tile(Coord::new(1, 0), 2);
        let destination = board.grid().index_of(Coord::new(1, 0)).unwrap();

        board.step_into(tile, destination);
    }

    #[test]
    #[should_panic(expected = "own cell")]
    fn step_into_own_cell_panics() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(2, 2), 1);
        let here = board.grid().index_of(Coord::new(2, 2)).unwrap();

        board.step_into(tile, here);
    }

    #[test]
    #[should_panic(expected = "occupied cell")]
    fn create_tile_in_occupied_cell_panics() {
        let mut board = Board::new(2).unwrap();
        board.create_tile(Coord::new(0, 0), 1);
        board.create_tile(Coord::new(0, 0), 1);
    }

    #[test]
    fn merge_removes_moving_and_levels_up_stationary() {
        let mut board = Board::new(4).unwrap();
        let moving = board.create_tile(Coord::new(0, 0), 1);
        let stationary = board.create_tile(Coord::new(1, 0), 1);

        let merge = board.merge(moving, stationary);

        assert_eq!(
            merge,
            Merge {
                into: stationary,
                at: Coord::new(1, 0),
                level: 2
            }
        );
        assert!(board.tile(moving).is_none());
        assert_eq!(board.tile(stationary).unwrap().level(), 2);
        assert_eq!(board.tile_count(), 1);
        assert!(board.is_consistent());
    }

    #[test]
    #[should_panic(expected = "cannot merge")]
    fn merge_of_different_levels_panics() {
        let mut board = Board::new(4).unwrap();
        let moving = board.create_tile(Coord::new(0, 0), 1);
        let stationary = board.create_tile(Coord::new(1, 0), 2);

        board.merge(moving, stationary);
    }

    #[test]
    fn slide_runs_to_the_edge() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(0, 0), 2);

        let slide = board.slide_as_far_as_possible(tile, Direction::Right, |_| true);

        assert!(slide.moved);
        assert_eq!(slide.merge, None);
        assert_eq!(board.tile(tile).unwrap().cell(), Coord::new(3, 0));
    }

    #[test]
    fn slide_ends_in_merge() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(0, 0), 1);
        let target = board.create_tile(Coord::new(3, 0), 1);

        let slide = board.slide_as_far_as_possible(tile, Direction::Right, |_| true);

        assert!(slide.moved);
        assert_eq!(slide.merge.map(|m| m.into), Some(target));
        assert_eq!(board.tile(target).unwrap().level(), 2);
        assert_eq!(board.tile_count(), 1);
    }

    #[test]
    fn slide_stops_next_to_unmergeable_tile() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(0, 0), 1);
        board.create_tile(Coord::new(3, 0), 1);

        let slide = board.slide_as_far_as_possible(tile, Direction::Right, |_| false);

        assert!(slide.moved);
        assert_eq!(slide.merge, None);
        assert_eq!(board.tile(tile).unwrap().cell(), Coord::new(2, 0));
    }

    #[test]
    fn blocked_slide_reports_no_movement() {
        let mut board = Board::new(4).unwrap();
        let tile = board.create_tile(Coord::new(3, 1), 1);

        let slide = board.slide_as_far_as_possible(tile, Direction::Right, |_| true);

        assert!(!slide.moved);
        assert_eq!(board.tile(tile).unwrap().cell(), Coord::new(3, 1));
    }

    #[test]
    fn tiles_at_the_ceiling_do_not_merge() {
        let mut board = Board::new(2).unwrap();
        let tile = board.create_tile(Coord::new(0, 0), LEVEL_CEILING);
        board.create_tile(Coord::new(1, 0), LEVEL_CEILING);

        assert_eq!(board.can_advance(tile, Direction::Right), Advance::Blocked);
        assert!(!resolve_move(&mut board, Direction::Right).moved);
        assert_eq!(rows_of(&board)[0], vec![LEVEL_CEILING, LEVEL_CEILING]);
    }

    #[test]
    fn tiles_below_the_ceiling_merge_up_to_it() {
        let mut board = board_from_rows(&[&[LEVEL_CEILING - 1, LEVEL_CEILING - 1], &[0, 0]]);

        let outcome = resolve_move(&mut board, Direction::Right);

        assert_eq!(outcome.merges[0].level, LEVEL_CEILING);
        assert_eq!(rows_of(&board)[0], vec![0, LEVEL_CEILING]);
    }

    #[test]
    #[should_panic(expected = "already at level")]
    fn merge_at_the_ceiling_panics() {
        let mut board = Board::new(2).unwrap();
        let moving = board.create_tile(Coord::new(0, 0), LEVEL_CEILING);
        let stationary = board.create_tile(Coord::new(1, 0), LEVEL_CEILING);

        board.merge(moving, stationary);
    }

    #[test]
    #[should_panic(expected = "cannot create a tile of level")]
    fn create_tile_above_the_ceiling_panics() {
        let mut board = Board::new(2).unwrap();
        board.create_tile(Coord::new(0, 0), LEVEL_CEILING + 1);
    }

    #[test]
    fn display_value_at_the_ceiling_fits() {
        assert_eq!(display_value(LEVEL_CEILING), 1u64 << 63);
    }

    #[test]
    fn display_value_doubles_per_level() {
        assert_eq!(display_value(1), 1);
        assert_eq!(display_value(2), 2);
        assert_eq!(display_value(11), 1024);
    }
}

// ============================================================================
// Move Resolution Tests
// ============================================================================

mod resolution {
    use super::*;

    #[test]
    fn pair_merges_at_far_edge() {
        let mut board = board_from_rows(&[&[1, 1, 0, 0], &[0; 4], &[0; 4], &[0; 4]]);

        let outcome = resolve_move(&mut board, Direction::Right);

        assert!(outcome.moved);
        assert_eq!(outcome.merges.len(), 1);
        assert_eq!(outcome.merges[0].level, 2);
        assert_eq!(rows_of(&board)[0], vec![0, 0, 0, 2]);
    }

    #[test]
    fn three_equal_tiles_do_not_chain() {
        let mut board = board_from_rows(&[&[1, 1, 1, 0], &[0; 4], &[0; 4], &[0; 4]]);

        let outcome = resolve_move(&mut board, Direction::Right);

        assert_eq!(outcome.merges.len(), 1);
        assert_eq!(rows_of(&board)[0], vec![0, 0, 1, 2]);
    }

    #[test]
    fn merged_tile_does_not_absorb_a_second_merge() {
        let mut board = board_from_rows(&[&[2, 1, 1, 0], &[0; 4], &[0; 4], &[0; 4]]);

        let outcome = resolve_move(&mut board, Direction::Right);

        assert_eq!(outcome.merges.len(), 1);
        assert_eq!(rows_of(&board)[0], vec![0, 0, 2, 2]);
    }

    #[test]
    fn four_equal_tiles_make_two_pairs() {
        let mut board = board_from_rows(&[&[1, 1, 1, 1], &[2, 2, 2, 2], &[0; 4], &[0; 4]]);

        resolve_move(&mut board, Direction::Right);
        assert_eq!(rows_of(&board)[0], vec![0, 0, 2, 2]);
        assert_eq!(rows_of(&board)[1], vec![0, 0, 3, 3]);
    }

    #[test]
    fn left_mirrors_right() {
        let mut board = board_from_rows(&[&[0, 1, 1, 1], &[0; 4], &[0; 4], &[0; 4]]);

        resolve_move(&mut board, Direction::Left);
        assert_eq!(rows_of(&board)[0], vec![2, 1, 0, 0]);
    }

    #[test]
    fn up_merges_within_a_column() {
        let mut board = board_from_rows(&[&[1, 0, 0], &[0, 0, 3], &[1, 0, 0]]);

        resolve_move(&mut board, Direction::Up);
        assert_eq!(rows_of(&board), vec![vec![2, 0, 3], vec![0; 3], vec![0; 3]]);
    }

    #[test]
    fn down_merges_within_a_column() {
        let mut board = board_from_rows(&[&[1, 2, 0], &[1, 0, 0], &[0, 0, 0]]);

        resolve_move(&mut board, Direction::Down);
        assert_eq!(rows_of(&board), vec![vec![0; 3], vec![0; 3], vec![2, 2, 0]]);
    }

    #[test]
    fn settled_board_is_left_untouched() {
        let mut board = board_from_rows(&[&[0, 0, 0, 1], &[0, 0, 2, 3], &[0; 4], &[0; 4]]);
        let before = rows_of(&board);

        let outcome = resolve_move(&mut board, Direction::Right);

        assert!(!outcome.moved);
        assert!(outcome.merges.is_empty());
        assert_eq!(rows_of(&board), before);
    }

    #[test]
    fn tiles_stay_consistent_after_resolution() {
        let mut board = board_from_rows(&[&[1, 2, 1, 2], &[2, 2, 1, 1], &[3, 0, 3, 0], &[1, 1, 0, 1]]);

        for direction in Direction::ALL {
            resolve_move(&mut board, direction);
            assert!(board.is_consistent());
            assert!(board.tile_count() <= 16);
        }
    }
}

// ============================================================================
// Spawner Tests
// ============================================================================

mod spawning {
    use super::*;

    #[test]
    fn spawn_places_requested_level() {
        let mut board = Board::new(4).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = spawn_random(&mut board, &mut rng, 3);

        let SpawnOutcome::Placed { tile, at, level } = outcome else {
            panic!("expected a placement, got {outcome:?}");
        };
        assert_eq!(level, 3);
        assert_eq!(board.tile(tile).unwrap().cell(), at);
        assert_eq!(board.tile_at(at).unwrap().level(), 3);
        assert_eq!(board.unoccupied_count(), 15);
    }

    #[test]
    fn full_board_reports_board_full() {
        let mut board = board_from_rows(&[&[1, 2], &[3, 4]]);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(spawn_random(&mut board, &mut rng, 1), SpawnOutcome::BoardFull);
        assert_eq!(board.tile_count(), 4);
    }

    #[test]
    fn last_empty_cell_is_always_chosen() {
        for seed in 0..20 {
            let mut board = board_from_rows(&[&[1, 2, 3], &[4, 0, 5], &[6, 7, 8]]);
            let mut rng = StdRng::seed_from_u64(seed);

            let outcome = spawn_random(&mut board, &mut rng, 1);

            assert!(matches!(outcome, SpawnOutcome::Placed { at, .. } if at == Coord::new(1, 1)));
            assert!(board.is_full());
        }
    }

    #[test]
    fn every_empty_cell_can_be_chosen() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();

        for _ in 0..200 {
            let mut board = Board::new(2).unwrap();
            if let SpawnOutcome::Placed { at, .. } = spawn_random(&mut board, &mut rng, 1) {
                seen.insert(at);
            }
        }

        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn original_range_only_yields_level_one() {
        let mut provider = RangeLevels::new(1, 2);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            assert_eq!(provider.next_level(&mut rng), 1);
        }
        assert_eq!(provider.max_level(), 1);
    }

    #[test]
    fn wider_range_yields_both_levels() {
        let mut provider = RangeLevels::new(1, 3);
        let mut rng = StdRng::seed_from_u64(3);

        let levels: HashSet<u8> = (0..100).map(|_| provider.next_level(&mut rng)).collect();
        assert_eq!(levels, HashSet::from([1, 2]));
    }

    #[test]
    fn weighted_extremes_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut never = WeightedLevels::new(0.0);
        let mut always = WeightedLevels::new(1.0);

        for _ in 0..50 {
            assert_eq!(never.next_level(&mut rng), 1);
            assert_eq!(always.next_level(&mut rng), 2);
        }
    }

    #[test]
    fn single_level_range_yields_that_level() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut ceiling = RangeLevels::inclusive(LEVEL_CEILING, LEVEL_CEILING);
        let mut top = RangeLevels::new(u8::MAX, u8::MAX);

        for _ in 0..10 {
            assert_eq!(ceiling.next_level(&mut rng), LEVEL_CEILING);
            assert_eq!(top.next_level(&mut rng), u8::MAX);
        }
        assert_eq!(ceiling.max_level(), LEVEL_CEILING);
    }

    #[test]
    fn sequence_cycles() {
        let mut provider = SequenceLevels::new(vec![1, 2, 3]);
        let mut rng = StdRng::seed_from_u64(0);

        let levels: Vec<u8> = (0..4).map(|_| provider.next_level(&mut rng)).collect();
        assert_eq!(levels, vec![1, 2, 3, 1]);
        assert_eq!(provider.max_level(), 3);
    }
}
