//! Puzzle solving engine.
//!
//! `PuzzleSolutionEngine` owns one attempt at a puzzle and decides, move by
//! move, whether the player is following the stored solution. `PuzzleSession`
//! runs it on tokio so the opponent's replies arrive after a short delay.

pub mod attempt;
pub mod config;
pub mod engine;
pub mod error;
pub mod reply;
pub mod session;

pub use attempt::{AttemptState, AttemptStatus, Hint, PlyRecord, PlySide, SolveReport};
pub use config::EngineConfig;
pub use engine::{MoveOutcome, PuzzleSolutionEngine, Rejection, SubmitOutcome};
pub use error::EngineError;
pub use reply::{ReplyOutcome, ReplyTicket};
pub use session::PuzzleSession;
