//! Win detection logic.

use crate::board::{Grid, Square};
use crate::types::PlayerId;
use tracing::instrument;

/// Checks if there is a winner on the grid.
///
/// Scans every row, then every column, then the main diagonal and the
/// anti-diagonal. A line wins when all N cells hold the same player.
/// Returns the first winner found in that order.
#[instrument(skip(grid), fields(size = grid.size()))]
pub fn check_winner(grid: &Grid) -> Option<PlayerId> {
    let n = grid.size();

    (0..n)
        .find_map(|r| line_winner(grid, (0..n).map(move |c| (r, c))))
        .or_else(|| (0..n).find_map(|c| line_winner(grid, (0..n).map(move |r| (r, c)))))
        .or_else(|| line_winner(grid, (0..n).map(|i| (i, i))))
        .or_else(|| line_winner(grid, (0..n).map(|i| (i, n - 1 - i))))
}

/// Returns the player owning every cell of the line, if any.
fn line_winner(grid: &Grid, mut cells: impl Iterator<Item = (usize, usize)>) -> Option<PlayerId> {
    let (row, col) = cells.next()?;
    let first = grid.get(row, col)?.occupant()?;
    cells
        .all(|(r, c)| grid.get(r, c) == Some(Square::Occupied(first)))
        .then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(grid: &mut Grid, cells: &[(usize, usize)], player: PlayerId) {
        for (r, c) in cells {
            grid.place(*r, *c, player);
        }
    }

    #[test]
    fn test_no_winner_empty_grid() {
        assert_eq!(check_winner(&Grid::new(3)), None);
        assert_eq!(check_winner(&Grid::new(10)), None);
    }

    #[test]
    fn test_winner_top_row() {
        let x = PlayerId::new(1);
        let mut grid = Grid::new(3);
        fill(&mut grid, &[(0, 0), (0, 1), (0, 2)], x);
        assert_eq!(check_winner(&grid), Some(x));
    }

    #[test]
    fn test_winner_column_on_larger_grid() {
        let o = PlayerId::new(2);
        let mut grid = Grid::new(4);
        fill(&mut grid, &[(0, 3), (1, 3), (2, 3), (3, 3)], o);
        assert_eq!(check_winner(&grid), Some(o));
    }

    #[test]
    fn test_winner_diagonal() {
        let o = PlayerId::new(2);
        let mut grid = Grid::new(3);
        fill(&mut grid, &[(0, 0), (1, 1), (2, 2)], o);
        assert_eq!(check_winner(&grid), Some(o));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let x = PlayerId::new(9);
        let mut grid = Grid::new(5);
        fill(&mut grid, &[(0, 4), (1, 3), (2, 2), (3, 1), (4, 0)], x);
        assert_eq!(check_winner(&grid), Some(x));
    }

    #[test]
    fn test_no_winner_incomplete() {
        let x = PlayerId::new(1);
        let mut grid = Grid::new(3);
        fill(&mut grid, &[(0, 0), (0, 1)], x);
        assert_eq!(check_winner(&grid), None);
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let (x, o) = (PlayerId::new(1), PlayerId::new(2));
        let mut grid = Grid::new(3);
        fill(&mut grid, &[(2, 0), (2, 1)], x);
        fill(&mut grid, &[(2, 2)], o);
        assert_eq!(check_winner(&grid), None);
    }
}
