use itertools::Itertools;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashSet;

use crate::{Cell, Clause, Error, Result, grid};

/// A Minesweeper player that only knows what it has been told.
///
/// The agent keeps three monotonically growing fact sets (`moves_made`,
/// `safes`, `mines`) and a knowledge base of [`Clause`]s. `safes` and `mines`
/// never intersect, and the knowledge base never holds two equal clauses or
/// an empty one once an operation returns.
#[derive(Debug, Clone)]
pub struct Agent {
    height: usize,
    width: usize,
    moves_made: HashSet<Cell>,
    mines: HashSet<Cell>,
    safes: HashSet<Cell>,
    knowledge: Vec<Clause>,
}

impl Agent {
    pub fn new(height: usize, width: usize) -> Self {
        Agent {
            height,
            width,
            moves_made: HashSet::new(),
            mines: HashSet::new(),
            safes: HashSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    pub fn knowledge(&self) -> &[Clause] {
        &self.knowledge
    }

    fn check_bounds(&self, cell: Cell) -> Result<()> {
        if cell.in_bounds(self.height, self.width) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            })
        }
    }

    /// Whether what is already known rules out `cell` being a mine (`mine`)
    /// or being safe (`!mine`): either the opposite fact is recorded, or some
    /// clause alone already forces the opposite verdict.
    fn contradicts(&self, cell: Cell, mine: bool) -> bool {
        if mine {
            self.safes.contains(&cell)
                || self
                    .knowledge
                    .iter()
                    .any(|clause| clause.contains(&cell) && clause.count() == 0)
        } else {
            self.mines.contains(&cell)
                || self
                    .knowledge
                    .iter()
                    .any(|clause| clause.contains(&cell) && clause.count() >= clause.len())
        }
    }

    /// Records `cell` as a mine and removes it from every clause.
    ///
    /// Fails without touching any state if `cell` is already known safe or a
    /// clause with no mines left contains it.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<()> {
        self.check_bounds(cell)?;
        if self.contradicts(cell, true) {
            return Err(Error::ContradictoryKnowledge { cell });
        }
        self.apply_mine(cell);
        self.prune();
        Ok(())
    }

    /// Records `cell` as safe and removes it from every clause.
    ///
    /// Fails without touching any state if `cell` is already known to be a
    /// mine or a clause that is all mines contains it.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<()> {
        self.check_bounds(cell)?;
        if self.contradicts(cell, false) {
            return Err(Error::ContradictoryKnowledge { cell });
        }
        self.apply_safe(cell);
        self.prune();
        Ok(())
    }

    fn apply_mine(&mut self, cell: Cell) {
        self.mines.insert(cell);
        for clause in &mut self.knowledge {
            clause.mark_mine(cell);
        }
    }

    fn apply_safe(&mut self, cell: Cell) {
        self.safes.insert(cell);
        for clause in &mut self.knowledge {
            clause.mark_safe(cell);
        }
    }

    /// Drops empty clauses and clauses that became equal to an earlier one.
    fn prune(&mut self) {
        let mut kept: Vec<Clause> = Vec::with_capacity(self.knowledge.len());
        for clause in self.knowledge.drain(..) {
            if !clause.is_empty() && !kept.contains(&clause) {
                kept.push(clause);
            }
        }
        self.knowledge = kept;
    }

    /// Called when the board reveals that the safe cell `cell` has `count`
    /// mines among its neighbors.
    ///
    /// The cell is recorded as a move and as safe, a clause over its still
    /// unknown neighbors is added, and the knowledge base is then resolved to
    /// a fixpoint, marking every cell it can prove safe or mined.
    ///
    /// A clue that disagrees with what is already known is clamped into
    /// range. `ContradictoryKnowledge` is returned untouched if `cell` is
    /// already proven to be a mine, or after the fact if inference proves
    /// some cell both safe and mined; in the latter case every consistent
    /// conclusion has still been applied.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) -> Result<()> {
        self.check_bounds(cell)?;
        if self.contradicts(cell, false) {
            return Err(Error::ContradictoryKnowledge { cell });
        }

        self.moves_made.insert(cell);
        self.apply_safe(cell);

        let mut explained = 0;
        let mut unknown = HashSet::new();
        for neighbor in cell.neighbors(self.height, self.width) {
            if self.mines.contains(&neighbor) {
                explained += 1;
            } else if !self.safes.contains(&neighbor) {
                unknown.insert(neighbor);
            }
        }

        let remaining = count.checked_sub(explained).unwrap_or_else(|| {
            tracing::warn!(%cell, count, explained, "clue is below the known mines around it");
            0
        });
        if remaining > unknown.len() {
            tracing::warn!(
                %cell,
                count,
                unknown = unknown.len(),
                "clue exceeds the unknown neighbors, clamping"
            );
        }

        let clause = Clause::new(unknown, remaining);
        tracing::debug!(%cell, %clause, "new observation");
        if !clause.is_empty() && !self.knowledge.contains(&clause) {
            self.knowledge.push(clause);
        }
        self.prune();

        self.infer()
    }

    /// Runs subset resolution and fact extraction until a pass proves no new
    /// safe or mined cell.
    fn infer(&mut self) -> Result<()> {
        let mut contradiction = None;

        for pass in 1.. {
            let derived = self.resolve_subsets();

            let mut new_safes = HashSet::new();
            let mut new_mines = HashSet::new();
            for clause in &self.knowledge {
                new_safes.extend(clause.known_safes());
                new_mines.extend(clause.known_mines());
            }
            new_safes.retain(|cell| !self.safes.contains(cell));
            new_mines.retain(|cell| !self.mines.contains(cell));

            tracing::debug!(
                pass,
                derived,
                clauses = self.knowledge.len(),
                safes = new_safes.len(),
                mines = new_mines.len(),
                "resolution pass"
            );

            if new_safes.is_empty() && new_mines.is_empty() {
                break;
            }

            let mut conflicts: HashSet<Cell> = new_safes
                .iter()
                .filter(|&cell| new_mines.contains(cell) || self.mines.contains(cell))
                .chain(new_mines.iter().filter(|&cell| self.safes.contains(cell)))
                .copied()
                .collect();
            for clause in &self.knowledge {
                if !self.satisfiable_after(clause, &new_safes, &new_mines) {
                    tracing::warn!(%clause, "clause cannot hold under this pass's verdicts");
                    conflicts.extend(
                        clause
                            .cells()
                            .iter()
                            .filter(|&cell| new_safes.contains(cell) || new_mines.contains(cell)),
                    );
                }
            }
            if !conflicts.is_empty() {
                tracing::warn!(?conflicts, "knowledge base proves cells both safe and mined");
                // Every clause involved is unreliable; forget them.
                self.knowledge
                    .retain(|clause| clause.cells().is_disjoint(&conflicts));
                new_safes.retain(|cell| !conflicts.contains(cell));
                new_mines.retain(|cell| !conflicts.contains(cell));
                contradiction = contradiction.or_else(|| conflicts.iter().min().copied());
            }

            for &cell in &new_safes {
                self.apply_safe(cell);
            }
            for &cell in &new_mines {
                self.apply_mine(cell);
            }
            self.prune();
        }

        match contradiction {
            Some(cell) => Err(Error::ContradictoryKnowledge { cell }),
            None => Ok(()),
        }
    }

    /// Whether `clause` still admits exactly `count` mines once `safes` and
    /// `mines` are applied to it.
    fn satisfiable_after(
        &self,
        clause: &Clause,
        safes: &HashSet<Cell>,
        mines: &HashSet<Cell>,
    ) -> bool {
        let mut mined = 0;
        let mut open = 0;
        for cell in clause.cells() {
            if mines.contains(cell) {
                mined += 1;
            } else if !safes.contains(cell) {
                open += 1;
            }
        }
        clause
            .count()
            .checked_sub(mined)
            .is_some_and(|left| left <= open)
    }

    /// For every pair of clauses where one's cells are a proper subset of the
    /// other's, adds the clause over the difference. Repeats over the grown
    /// knowledge base until nothing new appears. Returns the number of
    /// clauses added.
    fn resolve_subsets(&mut self) -> usize {
        let mut added = 0;
        loop {
            let mut staged: Vec<Clause> = Vec::new();
            for (a, b) in self.knowledge.iter().tuple_combinations() {
                let (subset, superset) = if a.is_proper_subset(b) {
                    (a, b)
                } else if b.is_proper_subset(a) {
                    (b, a)
                } else {
                    continue;
                };

                let Some(count) = superset.count().checked_sub(subset.count()) else {
                    tracing::warn!(%subset, %superset, "subset holds more mines than its superset");
                    continue;
                };
                let difference = superset.cells().difference(subset.cells()).copied();
                let derived = Clause::new(difference, count);
                if !self.knowledge.contains(&derived) && !staged.contains(&derived) {
                    tracing::trace!(%derived, "derived clause");
                    staged.push(derived);
                }
            }

            if staged.is_empty() {
                return added;
            }
            added += staged.len();
            self.knowledge.extend(staged);
        }
    }

    /// A cell known to be safe that has not been played yet. Picks the
    /// row-major smallest so repeated calls agree.
    pub fn make_safe_move(&self) -> Option<Cell> {
        self.safes.difference(&self.moves_made).min().copied()
    }

    /// A uniformly random cell that is neither played nor a known mine.
    pub fn make_random_move(&self) -> Option<Cell> {
        self.make_random_move_with(&mut rand::rng())
    }

    pub fn make_random_move_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let candidates: Vec<Cell> = grid(self.height, self.width)
            .filter(|cell| !self.mines.contains(cell) && !self.moves_made.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }
}
