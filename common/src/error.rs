use crate::Cell;

/// Errors raised by the board, the configuration layer and the agent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Zero-sized board, or more mines than cells.
    #[error("invalid board configuration: {height}x{width} with {mines} mines")]
    InvalidConfiguration {
        height: usize,
        width: usize,
        mines: usize,
    },

    #[error("cell {cell} is outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    /// The knowledge base was asked to believe both that `cell` is safe and
    /// that it is a mine.
    #[error("contradictory knowledge about cell {cell}")]
    ContradictoryKnowledge { cell: Cell },

    #[error("invalid value for {key}: {value:?}")]
    InvalidSetting { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
