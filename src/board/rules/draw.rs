//! Draw detection logic.

use crate::board::{Grid, Square};
use tracing::instrument;

/// Checks if the grid is full (no empty squares).
///
/// A full grid with no winner indicates a draw.
#[instrument(skip(grid), fields(size = grid.size()))]
pub fn is_full(grid: &Grid) -> bool {
    grid.squares().iter().all(|s| *s != Square::Empty)
}
