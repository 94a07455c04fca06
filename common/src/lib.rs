//! Deduction engine for an autonomous Minesweeper player.
//!
//! A [`Board`] holds the hidden mine layout and answers clue queries. An
//! [`Agent`] is fed `(cell, clue)` observations and keeps a knowledge base of
//! [`Clause`]s ("exactly `count` of these cells are mines"), from which it
//! derives cells that are provably safe or provably mined. [`Game`] glues the
//! two together into a playable session.

mod agent;
mod board;
mod cell;
mod clause;
mod config;
mod error;
mod game;

pub use agent::Agent;
pub use board::Board;
pub use cell::{Cell, grid};
pub use clause::Clause;
pub use config::GameConfig;
pub use error::{Error, Result};
pub use game::{Game, GameState, Snapshot, Step};
