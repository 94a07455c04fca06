use rand::Rng;
use rand::seq::index;
use std::collections::HashSet;

use crate::{Cell, Error, Result};

/// Ground truth for one game: the grid size and where the mines are.
///
/// Mines are placed once at construction and never move. `mines_found` only
/// ever holds real mines, so `won()` is a plain set comparison.
#[derive(Debug, Clone)]
pub struct Board {
    height: usize,
    width: usize,
    mines: HashSet<Cell>,
    mines_found: HashSet<Cell>,
}

impl Board {
    /// Places `mines` distinct mines uniformly at random.
    pub fn new(height: usize, width: usize, mines: usize) -> Result<Self> {
        Self::with_rng(height, width, mines, &mut rand::rng())
    }

    /// Same as [`Board::new`], drawing the layout from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let invalid = Error::InvalidConfiguration {
            height,
            width,
            mines,
        };
        if height == 0 || width == 0 {
            return Err(invalid);
        }
        let total = height.checked_mul(width).ok_or(invalid.clone())?;
        if mines > total {
            return Err(invalid);
        }

        let mines = index::sample(rng, total, mines)
            .into_iter()
            .map(|i| Cell::new(i / width, i % width))
            .collect();

        Ok(Board {
            height,
            width,
            mines,
            mines_found: HashSet::new(),
        })
    }

    /// Builds a board with an explicit layout. Duplicate mines collapse.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Cell>,
    ) -> Result<Self> {
        let mines: HashSet<Cell> = mines.into_iter().collect();
        if height == 0 || width == 0 || height.checked_mul(width).is_none() {
            return Err(Error::InvalidConfiguration {
                height,
                width,
                mines: mines.len(),
            });
        }

        let board = Board {
            height,
            width,
            mines,
            mines_found: HashSet::new(),
        };
        for &mine in &board.mines {
            board.check_bounds(mine)?;
        }
        Ok(board)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    /// Number of cells that are not mines.
    pub fn safe_count(&self) -> usize {
        self.height * self.width - self.mines.len()
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn mines_found(&self) -> &HashSet<Cell> {
        &self.mines_found
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.in_bounds(self.height, self.width)
    }

    fn check_bounds(&self, cell: Cell) -> Result<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            })
        }
    }

    pub fn is_mine(&self, cell: Cell) -> Result<bool> {
        self.check_bounds(cell)?;
        Ok(self.mines.contains(&cell))
    }

    /// The clue for `cell`: how many of its in-bounds neighbors are mines.
    pub fn nearby_mines(&self, cell: Cell) -> Result<usize> {
        self.check_bounds(cell)?;
        Ok(cell
            .neighbors(self.height, self.width)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count())
    }

    /// Flags `cell` as a mine. Returns whether the flag landed on a real
    /// mine; wrong flags are not recorded.
    pub fn flag(&mut self, cell: Cell) -> Result<bool> {
        if self.is_mine(cell)? {
            self.mines_found.insert(cell);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// True once every mine has been flagged.
    pub fn won(&self) -> bool {
        self.mines_found == self.mines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_board_initialization() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let board = Board::with_rng(5, 7, 12, &mut rng).unwrap();
            assert_eq!(board.height(), 5);
            assert_eq!(board.width(), 7);
            assert_eq!(board.mines().len(), 12);
            assert!(board.mines().iter().all(|&m| board.contains(m)));
            assert!(board.mines_found().is_empty());
        }
    }

    #[test]
    fn test_full_and_empty_boards() {
        let full = Board::new(3, 3, 9).unwrap();
        assert_eq!(full.mines().len(), 9);
        assert_eq!(full.safe_count(), 0);

        let empty = Board::new(3, 3, 0).unwrap();
        assert!(empty.mines().is_empty());
        assert!(empty.won());
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            Board::new(3, 3, 10),
            Err(Error::InvalidConfiguration { mines: 10, .. })
        ));
        assert!(matches!(
            Board::new(0, 3, 0),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            Board::new(3, 0, 0),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            Board::with_mines(0, 0, []),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_with_mines_rejects_oversized_grid() {
        assert!(matches!(
            Board::with_mines(usize::MAX, 2, []),
            Err(Error::InvalidConfiguration { mines: 0, .. })
        ));
        assert!(Board::with_rng(usize::MAX, 2, 0, &mut StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_with_mines_rejects_outside_mine() {
        let result = Board::with_mines(2, 2, [Cell::new(2, 0)]);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_out_of_bounds_queries() {
        let board = Board::with_mines(2, 3, [Cell::new(0, 0)]).unwrap();
        assert_eq!(
            board.is_mine(Cell::new(2, 0)),
            Err(Error::OutOfBounds {
                cell: Cell::new(2, 0),
                height: 2,
                width: 3,
            })
        );
        assert!(board.nearby_mines(Cell::new(0, 3)).is_err());
    }

    #[test]
    fn test_nearby_mines_matches_neighbor_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::with_rng(6, 6, 11, &mut rng).unwrap();
        for cell in grid(6, 6) {
            let expected = grid(6, 6)
                .filter(|&other| other != cell)
                .filter(|other| {
                    other.row.abs_diff(cell.row) <= 1 && other.col.abs_diff(cell.col) <= 1
                })
                .filter(|other| board.mines().contains(other))
                .count();
            assert_eq!(board.nearby_mines(cell).unwrap(), expected);
        }
    }

    #[test]
    fn test_nearby_mines_ignores_own_mine() {
        let board = Board::with_mines(3, 3, [Cell::new(1, 1), Cell::new(0, 0)]).unwrap();
        assert_eq!(board.nearby_mines(Cell::new(1, 1)).unwrap(), 1);
        assert_eq!(board.nearby_mines(Cell::new(2, 2)).unwrap(), 1);
        assert_eq!(board.nearby_mines(Cell::new(0, 1)).unwrap(), 2);
    }

    #[test]
    fn test_flagging_and_win() {
        let mut board = Board::with_mines(2, 2, [Cell::new(0, 0), Cell::new(1, 1)]).unwrap();
        assert!(!board.won());

        assert!(!board.flag(Cell::new(0, 1)).unwrap());
        assert!(board.mines_found().is_empty());

        assert!(board.flag(Cell::new(0, 0)).unwrap());
        assert!(!board.won());
        assert!(board.flag(Cell::new(1, 1)).unwrap());
        assert!(board.won());
        assert!(board.mines_found().is_subset(board.mines()));
    }
}
