//! lightup-rs
//!
//! Engine for the Nikoli pencil puzzle "Light Up" (also known as Akari):
//! place lights on white cells so that every white cell is illuminated, no
//! two lights illuminate each other, and every numbered black cell has
//! exactly that many neighbouring lights.
//!
//! The crate provides the grid state model with incrementally maintained
//! illumination counts, a deductive solver with bounded backtracking, a
//! generator that guarantees unique solutions, and the ASCII descriptor and
//! move protocols used to persist and replay puzzles. It is intended to back
//! interactive frontends, which layer input handling and drawing on top.

pub mod desc;
pub mod generate;
pub mod grid;
pub mod moves;
pub mod params;
pub mod solver;

pub use desc::{encode_description, new_state, validate_description};
pub use generate::{generate_puzzle, new_description};
pub use grid::{CellFlags, GameState, LightLine};
pub use moves::{execute_move, solve_game, status, GameStatus};
pub use params::{fetch_preset, ConfigItem, GameParams, Symmetry};
pub use solver::solve;
