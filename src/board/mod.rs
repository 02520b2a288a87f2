//! Board engine for N×N grid games.
//!
//! The grid is plain data. Rules are pure functions over a grid snapshot,
//! kept apart from storage so the state machine can compose them.

mod grid;
pub mod rules;

pub use grid::{Grid, GridShapeError, Square};
pub use rules::{check_winner, is_full, validate_coordinates};
