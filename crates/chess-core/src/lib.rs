//! Chess rules adapter and puzzle data for the puzzle trainer.
//!
//! shakmaty does the move generation; this crate wraps it in a position
//! handle with undo, keeps the SAN normalization used for solution matching,
//! and defines the `Puzzle` record the engine consumes.

pub mod error;
pub mod notation;
pub mod puzzle;
pub mod rules;

pub use error::{PuzzleError, RulesError};
pub use puzzle::{Difficulty, Puzzle};
pub use rules::{MoveRecord, MoveRequest, PositionHandle};
