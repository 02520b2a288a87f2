//! Coordinate validation.

use crate::board::Grid;
use tracing::instrument;

/// Checks that `(row, col)` addresses a cell on the grid.
///
/// True iff `0 <= row, col < N`.
#[instrument(skip(grid), fields(size = grid.size()))]
pub fn validate_coordinates(grid: &Grid, row: i64, col: i64) -> bool {
    grid.locate(row, col).is_some()
}
