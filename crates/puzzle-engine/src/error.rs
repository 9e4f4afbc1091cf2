//! Engine error types

use chess_core::{PuzzleError, RulesError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid puzzle: {0}")]
    InvalidPuzzle(#[from] PuzzleError),

    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    /// The stored solution names a move that is not legal in the position
    /// reached. Bad puzzle content, not a player error.
    #[error("Corrupt solution in puzzle {puzzle_id}: ply {index} '{ply}' matches no legal move")]
    CorruptSolution {
        puzzle_id: String,
        index: usize,
        ply: String,
    },

    #[error("No puzzle loaded")]
    NoAttempt,

    #[error("No opponent reply is expected in the current position")]
    NoOpponentReply,
}
