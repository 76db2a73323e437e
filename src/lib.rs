//! Rules engine for a sliding-tile merge puzzle.
//!
//! A square grid of cells holds leveled tiles. A directional move slides every
//! tile as far as it can go, merges equal-level neighbors once per move, and
//! spawns a new tile when anything moved. [`game::Game`] is the entry point.

pub mod board;
pub mod config;
pub mod direction;
pub mod error;
pub mod game;
pub mod grid;
pub mod resolver;
pub mod spawner;
pub mod tile;
