//! Error types for rules handling and puzzle data.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Illegal position '{fen}': {reason}")]
    InvalidPosition { fen: String, reason: String },

    #[error("Invalid move text: {0}")]
    InvalidMove(String),

    #[error("No move to undo")]
    NothingToUndo,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("Puzzle {id} has an empty solution")]
    EmptySolution { id: String },

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error("Puzzle {id}: ply {index} '{ply}' does not match any legal move")]
    UnresolvablePly { id: String, index: usize, ply: String },

    #[error("Puzzle {id}: setup move '{mv}' is not legal")]
    InvalidSetupMove { id: String, mv: String },
}
