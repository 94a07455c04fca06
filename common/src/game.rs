use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Agent, Board, Cell, GameConfig, Result};

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// What a single call to [`Game::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// A safe cell was opened. `deduced` tells a proven-safe move from a guess.
    Revealed {
        cell: Cell,
        clue: usize,
        deduced: bool,
    },
    /// The agent guessed a mine.
    Detonated { cell: Cell },
    /// The agent has no cell left to try.
    Stuck,
    /// The game had already ended.
    Over(GameState),
}

/// One session: a board, the agent playing it, and the RNG used for guesses.
///
/// The agent only ever sees the clues this driver hands it.
pub struct Game {
    board: Board,
    agent: Agent,
    rng: StdRng,
    clues: HashMap<Cell, usize>,
    state: GameState,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = config.rng();
        let board = Board::with_rng(config.height, config.width, config.mines, &mut rng)?;
        Ok(Self::with_board(board, rng))
    }

    /// Plays an existing board, guessing with `rng`.
    pub fn with_board(board: Board, rng: StdRng) -> Self {
        let agent = Agent::new(board.height(), board.width());
        let state = if board.safe_count() == 0 {
            GameState::Won
        } else {
            GameState::Playing
        };
        Game {
            board,
            agent,
            rng,
            clues: HashMap::new(),
            state,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Clue of every opened cell.
    pub fn clues(&self) -> &HashMap<Cell, usize> {
        &self.clues
    }

    /// Makes one move: a proven-safe cell if the agent knows one, otherwise a
    /// random guess among cells not known to be mines.
    ///
    /// After a successful reveal every mine the agent has proven is flagged.
    /// The game is won once every safe cell is open, or once a board with at
    /// least one mine has all of its mines flagged. A mine-free board is
    /// therefore only won after every cell has been opened.
    pub fn step(&mut self) -> Result<Step> {
        if self.state != GameState::Playing {
            return Ok(Step::Over(self.state));
        }

        let (cell, deduced) = match self.agent.make_safe_move() {
            Some(cell) => (cell, true),
            None => match self.agent.make_random_move_with(&mut self.rng) {
                Some(cell) => (cell, false),
                None => return Ok(Step::Stuck),
            },
        };

        if self.board.is_mine(cell)? {
            tracing::debug!(%cell, "revealed a mine");
            self.state = GameState::Lost;
            return Ok(Step::Detonated { cell });
        }

        let clue = self.board.nearby_mines(cell)?;
        self.clues.insert(cell, clue);
        self.agent.add_knowledge(cell, clue)?;

        for &mine in self.agent.mines() {
            self.board.flag(mine)?;
        }

        let all_flagged = self.board.mine_count() > 0 && self.board.won();
        if all_flagged || self.clues.len() == self.board.safe_count() {
            self.state = GameState::Won;
        }

        Ok(Step::Revealed {
            cell,
            clue,
            deduced,
        })
    }

    /// Steps until the game ends or the agent runs out of moves.
    pub fn play(&mut self) -> Result<GameState> {
        loop {
            match self.step()? {
                Step::Revealed { .. } => {}
                Step::Detonated { .. } | Step::Stuck | Step::Over(_) => return Ok(self.state),
            }
        }
    }

    /// A read-only view of the session for front ends.
    pub fn snapshot(&self) -> Snapshot {
        let mut clues: Vec<(Cell, usize)> = self.clues.iter().map(|(&c, &n)| (c, n)).collect();
        clues.sort_unstable();
        let mut flagged: Vec<Cell> = self.agent.mines().iter().copied().collect();
        flagged.sort_unstable();
        let mut safes: Vec<Cell> = self
            .agent
            .safes()
            .difference(self.agent.moves_made())
            .copied()
            .collect();
        safes.sort_unstable();

        Snapshot {
            height: self.board.height(),
            width: self.board.width(),
            state: self.state,
            clues,
            flagged,
            safes,
            clauses: self.agent.knowledge().len(),
        }
    }
}

/// What a renderer needs to draw a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub height: usize,
    pub width: usize,
    pub state: GameState,
    /// Opened cells and their clues, row-major.
    pub clues: Vec<(Cell, usize)>,
    /// Cells the agent has proven to be mines.
    pub flagged: Vec<Cell>,
    /// Cells proven safe but not opened yet.
    pub safes: Vec<Cell>,
    pub clauses: usize,
}

impl Snapshot {
    pub fn serialize(&self) -> std::result::Result<Vec<u8>, bcs::Error> {
        bcs::to_bytes(self)
    }

    pub fn deserialize(bts: &[u8]) -> std::result::Result<Self, bcs::Error> {
        bcs::from_bytes(bts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn seeded(board: Board) -> Game {
        Game::with_board(board, StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_game_initialization() {
        let game = Game::new(GameConfig {
            height: 5,
            width: 6,
            mines: 4,
            seed: Some(1),
        })
        .unwrap();
        assert_eq!(game.board().height(), 5);
        assert_eq!(game.board().width(), 6);
        assert_eq!(game.board().mine_count(), 4);
        assert_eq!(game.state(), GameState::Playing);
        assert!(game.clues().is_empty());
    }

    #[test]
    fn test_seed_fixes_the_layout() {
        let config = GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        };
        let a = Game::new(config).unwrap();
        let b = Game::new(config).unwrap();
        assert_eq!(a.board().mines(), b.board().mines());
    }

    #[test]
    fn test_mine_free_board_is_always_won() {
        let mut game = seeded(Board::with_mines(4, 4, []).unwrap());
        assert_eq!(game.play().unwrap(), GameState::Won);
        assert_eq!(game.clues().len(), 16);
        assert!(game.clues().values().all(|&clue| clue == 0));
    }

    #[test]
    fn test_mine_free_board_stays_playing_until_fully_open() {
        let mut game = seeded(Board::with_mines(2, 2, []).unwrap());
        assert!(game.board().won());

        assert!(matches!(game.step().unwrap(), Step::Revealed { clue: 0, .. }));
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.clues().len(), 1);

        assert_eq!(game.play().unwrap(), GameState::Won);
        assert_eq!(game.clues().len(), 4);
    }

    #[test]
    fn test_won_game_has_every_mine_flagged() {
        for seed in 0..10 {
            let board = Board::with_mines(1, 3, [Cell::new(0, 0)]).unwrap();
            let mut game = Game::with_board(board, StdRng::seed_from_u64(seed));
            if game.play().unwrap() == GameState::Won {
                assert!(game.board().won());
                assert!(game.agent().mines().contains(&Cell::new(0, 0)));
            }
        }
    }

    #[test]
    fn test_guessing_a_mine_loses() {
        let mut game = seeded(Board::with_mines(1, 1, []).unwrap());
        assert_eq!(game.play().unwrap(), GameState::Won);

        let board = Board::with_mines(1, 2, [Cell::new(0, 0), Cell::new(0, 1)]).unwrap();
        let mut game = seeded(board);
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.step().unwrap(), Step::Over(GameState::Won));

        let board = Board::with_mines(3, 3, [Cell::new(0, 0), Cell::new(0, 1)]).unwrap();
        let mut game = seeded(board);
        let last = loop {
            match game.step().unwrap() {
                Step::Revealed { .. } => continue,
                other => break other,
            }
        };
        match last {
            Step::Detonated { cell } => {
                assert!(game.board().mines().contains(&cell));
                assert_eq!(game.state(), GameState::Lost);
            }
            Step::Over(GameState::Won) => assert_eq!(game.state(), GameState::Won),
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_play_never_breaks_agent_invariants() {
        for seed in 0..25 {
            let mut game = Game::new(GameConfig {
                height: 9,
                width: 9,
                mines: 10,
                seed: Some(seed),
            })
            .unwrap();
            let state = game.play().unwrap();
            assert_ne!(state, GameState::Playing);

            let agent = game.agent();
            assert!(agent.safes().is_disjoint(agent.mines()));
            assert!(agent.mines().is_subset(game.board().mines()));
            assert!(
                agent
                    .safes()
                    .iter()
                    .all(|cell| !game.board().mines().contains(cell))
            );
            assert!(game.board().mines_found().is_subset(game.board().mines()));
        }
    }

    #[test]
    fn test_snapshot_survives_serialization() {
        let mut game = Game::new(GameConfig {
            seed: Some(11),
            ..GameConfig::default()
        })
        .unwrap();
        game.step().unwrap();

        let snapshot = game.snapshot();
        assert_eq!(snapshot.height, 8);
        assert!(snapshot.clues.len() <= 64);

        let bts = snapshot.serialize().unwrap();
        assert_eq!(Snapshot::deserialize(&bts).unwrap(), snapshot);
    }
}
