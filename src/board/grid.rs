//! Square grid storage.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::types::PlayerId;

/// A cell on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Square {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell claimed by a player.
    Occupied(PlayerId),
}

impl Square {
    /// Returns the occupying player, if any.
    pub fn occupant(self) -> Option<PlayerId> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

impl From<Option<PlayerId>> for Square {
    fn from(cell: Option<PlayerId>) -> Self {
        cell.map_or(Square::Empty, Square::Occupied)
    }
}

/// N×N board stored in row-major order.
///
/// Serializes as a `size × size` array of nullable player ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "Vec<Vec<Option<PlayerId>>>",
    try_from = "Vec<Vec<Option<PlayerId>>>"
)]
pub struct Grid {
    size: usize,
    squares: Vec<Square>,
}

impl Grid {
    /// Creates an empty `size × size` grid.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            squares: vec![Square::Empty; size * size],
        }
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the square at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<Square> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.squares.get(row * self.size + col).copied()
    }

    /// Converts signed request coordinates into an in-range cell address.
    pub fn locate(&self, row: i64, col: i64) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.size && col < self.size).then_some((row, col))
    }

    /// Checks if a square is empty.
    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        matches!(self.get(row, col), Some(Square::Empty))
    }

    /// Returns all squares in row-major order.
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Claims a cell. Callers validate coordinates and occupancy first.
    pub(crate) fn place(&mut self, row: usize, col: usize, player: PlayerId) {
        if let Some(square) = self.squares.get_mut(row * self.size + col) {
            *square = Square::Occupied(player);
        }
    }

    /// Returns the grid as nested rows of nullable player ids.
    pub fn rows(&self) -> Vec<Vec<Option<PlayerId>>> {
        self.squares
            .chunks(self.size.max(1))
            .map(|row| row.iter().map(|sq| sq.occupant()).collect())
            .collect()
    }

    /// Formats the grid as a human-readable string.
    pub fn display(&self) -> String {
        self.squares
            .chunks(self.size.max(1))
            .map(|row| {
                row.iter()
                    .map(|sq| match sq {
                        Square::Empty => ".".to_string(),
                        Square::Occupied(player) => player.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Grid> for Vec<Vec<Option<PlayerId>>> {
    fn from(grid: Grid) -> Self {
        grid.rows()
    }
}

/// Nested rows did not form a square grid.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("grid must be square: expected {expected} cells in row {row}, found {found}")]
pub struct GridShapeError {
    /// Zero-based index of the offending row.
    pub row: usize,
    /// Row length required by the number of rows.
    pub expected: usize,
    /// Row length actually supplied.
    pub found: usize,
}

impl TryFrom<Vec<Vec<Option<PlayerId>>>> for Grid {
    type Error = GridShapeError;

    fn try_from(rows: Vec<Vec<Option<PlayerId>>>) -> Result<Self, Self::Error> {
        let size = rows.len();
        let mut squares = Vec::with_capacity(size * size);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(GridShapeError {
                    row: index,
                    expected: size,
                    found: row.len(),
                });
            }
            squares.extend(row.into_iter().map(Square::from));
        }
        Ok(Self { size, squares })
    }
}
