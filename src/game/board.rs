//! Board Primitives
//!
//! Coordinates, cell tags, and the flattened board a player commits to.
//! Ship placement legality is the board producer's concern; the
//! verification core only cares about cell tags and indices.

use serde::{Serialize, Deserialize};

/// Tag value for a water cell.
pub const WATER_TAG: u8 = 0;

/// Tag value for a ship cell.
///
/// Boards submitted for audit collapse hit/sunk markers back to this
/// tag so leaves can be re-derived.
pub const SHIP_TAG: u8 = 1;

/// A board coordinate, zero-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Row index.
    pub row: u16,
    /// Column index.
    pub col: u16,
}

impl Coord {
    /// Create a coordinate.
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Flattened row-major index, the leaf index a proof must carry.
    #[inline]
    pub fn flatten(self, board_size: u16) -> usize {
        (self.row as usize) * (board_size as usize) + (self.col as usize)
    }

    /// True if both components are inside a `board_size` square board.
    #[inline]
    pub fn in_bounds(self, board_size: u16) -> bool {
        self.row < board_size && self.col < board_size
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A full board as committed: `size * size` flattened cell tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: u16,
    cells: Vec<u8>,
}

impl Board {
    /// Wrap flattened cells; `None` if the length is not `size²`.
    pub fn from_cells(size: u16, cells: Vec<u8>) -> Option<Self> {
        if size == 0 || cells.len() != (size as usize) * (size as usize) {
            return None;
        }
        Some(Self { size, cells })
    }

    /// Board side length.
    pub fn size(&self) -> u16 {
        self.size
    }

    /// Flattened cell tags, row-major.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Tag at a coordinate, `None` out of bounds.
    pub fn cell(&self, coord: Coord) -> Option<u8> {
        if !coord.in_bounds(self.size) {
            return None;
        }
        self.cells.get(coord.flatten(self.size)).copied()
    }

    /// Number of cells carrying the ship tag.
    pub fn ship_count(&self) -> usize {
        count_ship_cells(&self.cells)
    }
}

/// Count ship-tagged cells in a raw flattened board.
///
/// Works on unvalidated input so the audit can inspect a board whose
/// length is itself under suspicion.
pub fn count_ship_cells(cells: &[u8]) -> usize {
    cells.iter().filter(|&&c| c == SHIP_TAG).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_row_major() {
        assert_eq!(Coord::new(0, 0).flatten(8), 0);
        assert_eq!(Coord::new(0, 7).flatten(8), 7);
        assert_eq!(Coord::new(1, 0).flatten(8), 8);
        assert_eq!(Coord::new(7, 7).flatten(8), 63);
    }

    #[test]
    fn test_in_bounds() {
        assert!(Coord::new(0, 0).in_bounds(1));
        assert!(!Coord::new(0, 1).in_bounds(1));
        assert!(Coord::new(7, 7).in_bounds(8));
        assert!(!Coord::new(8, 0).in_bounds(8));
    }

    #[test]
    fn test_board_length_validation() {
        assert!(Board::from_cells(2, vec![0; 4]).is_some());
        assert!(Board::from_cells(2, vec![0; 5]).is_none());
        assert!(Board::from_cells(0, vec![]).is_none());
    }

    #[test]
    fn test_ship_count() {
        let board = Board::from_cells(2, vec![1, 0, 1, 1]).unwrap();
        assert_eq!(board.ship_count(), 3);
        assert_eq!(count_ship_cells(&[0, 0, 2, 1]), 1);
    }

    #[test]
    fn test_cell_lookup() {
        let board = Board::from_cells(2, vec![0, 1, 2, 3]).unwrap();
        assert_eq!(board.cell(Coord::new(1, 0)), Some(2));
        assert_eq!(board.cell(Coord::new(2, 0)), None);
    }
}
