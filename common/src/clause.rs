use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::Cell;

/// A logical statement about the board: exactly `count` of `cells` are mines
/// and the rest are safe.
///
/// Two clauses are equal when both their cell sets and their counts match.
/// A new clause has `count <= cells.len()`. Marking a cell safe never touches
/// the count, so a clause contradicted by a safe verdict is left with more
/// mines than cells instead of being silently repaired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    cells: HashSet<Cell>,
    count: usize,
}

impl Clause {
    /// Builds a clause, clamping `count` to the number of distinct cells.
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Self {
        let cells: HashSet<Cell> = cells.into_iter().collect();
        let count = count.min(cells.len());
        Clause { cells, count }
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }

    /// Whether every cell of `self` is in `other` and `other` has more.
    pub fn is_proper_subset(&self, other: &Clause) -> bool {
        self.cells.len() < other.cells.len() && self.cells.is_subset(&other.cells)
    }

    /// Returns every cell if all of them must be mines, otherwise nothing.
    pub fn known_mines(&self) -> HashSet<Cell> {
        if self.count == self.cells.len() {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// Returns every cell if none of them can be a mine, otherwise nothing.
    pub fn known_safes(&self) -> HashSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// Drops a cell now known to be a mine. The count only goes down while it
    /// is positive: a clause that already accounts for all its mines keeps 0.
    pub fn mark_mine(&mut self, cell: Cell) {
        if self.cells.remove(&cell) && self.count > 0 {
            self.count -= 1;
        }
    }

    /// Drops a cell now known to be safe. The count is unchanged.
    pub fn mark_safe(&mut self, cell: Cell) {
        self.cells.remove(&cell);
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} = {}",
            self.cells.iter().sorted().join(", "),
            self.count
        )
    }
}
