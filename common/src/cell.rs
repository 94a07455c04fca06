use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A (row, column) coordinate on the board.
///
/// Ordering is row-major, which is what the agent uses when it has to pick
/// one cell out of a set deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    /// Whether the cell lies inside a `height` x `width` grid.
    pub fn in_bounds(self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// All valid neighbor coordinates of this cell on a `height` x `width`
    /// grid: the up-to-8 cells at Chebyshev distance 1, excluding the cell
    /// itself. Edges and corners are clipped.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Cell> {
        (-1..=1isize).flat_map(move |dr| {
            (-1..=1isize).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let nr = self.row as isize + dr;
                let nc = self.col as isize + dc;

                if nr >= 0 && nr < height as isize && nc >= 0 && nc < width as isize {
                    Some(Cell::new(nr as usize, nc as usize))
                } else {
                    None
                }
            })
        })
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell::new(row, col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Every cell of a `height` x `width` grid in row-major order.
pub fn grid(height: usize, width: usize) -> impl Iterator<Item = Cell> {
    iproduct!(0..height, 0..width).map(Cell::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors() {
        // Corner cell should have 3 neighbors
        assert_eq!(Cell::new(0, 0).neighbors(3, 3).count(), 3);

        // Center cell should have 8 neighbors
        assert_eq!(Cell::new(1, 1).neighbors(3, 3).count(), 8);

        // Edge cell should have 5 neighbors
        assert_eq!(Cell::new(0, 1).neighbors(3, 3).count(), 5);

        // A 1x1 board has no neighbors at all
        assert_eq!(Cell::new(0, 0).neighbors(1, 1).count(), 0);
    }

    #[test]
    fn test_neighbors_exclude_self_and_stay_in_bounds() {
        let cell = Cell::new(2, 3);
        for neighbor in cell.neighbors(3, 4) {
            assert_ne!(neighbor, cell);
            assert!(neighbor.in_bounds(3, 4));
            assert!(neighbor.row.abs_diff(cell.row) <= 1);
            assert!(neighbor.col.abs_diff(cell.col) <= 1);
        }
    }

    #[test]
    fn test_grid_is_row_major() {
        let cells: Vec<Cell> = grid(2, 3).collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[2], Cell::new(0, 2));
        assert_eq!(cells[3], Cell::new(1, 0));
        assert!(cells.windows(2).all(|w| w[0] < w[1]));
    }
}
