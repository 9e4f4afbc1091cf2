//! Puzzle data model.

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::error::PuzzleError;
use crate::notation;
use crate::rules::{MoveRequest, PositionHandle};

/// Difficulty buckets derived from the puzzle rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn from_rating(rating: u32) -> Self {
        match rating {
            r if r < 1200 => Difficulty::Beginner,
            r if r < 1600 => Difficulty::Easy,
            r if r < 2000 => Difficulty::Medium,
            r if r < 2400 => Difficulty::Hard,
            _ => Difficulty::Expert,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

/// A puzzle as supplied by the puzzle provider.
///
/// `solution` alternates sides starting with the side to move in
/// `initial_fen`; that side is the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: String,
    #[serde(alias = "fen")]
    pub initial_fen: String,
    #[serde(alias = "moves")]
    pub solution: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_url: Option<String>,
}

impl Puzzle {
    pub fn new(id: impl Into<String>, initial_fen: impl Into<String>, solution: Vec<String>) -> Self {
        Self {
            id: id.into(),
            initial_fen: initial_fen.into(),
            solution,
            name: None,
            rating: None,
            themes: Vec::new(),
            explanation: None,
            game_url: None,
        }
    }

    /// Build a puzzle from a written line such as `"1. Rc8+ Kh7 2. Rh8#"`.
    pub fn parse(id: impl Into<String>, initial_fen: impl Into<String>, line: &str) -> Self {
        Self::new(id, initial_fen, notation::split_solution(line))
    }

    /// Build a puzzle from a Lichess record.
    ///
    /// In the Lichess format the FEN is the position before the opponent's
    /// last move, `moves[0]` is that move and the solver plays from
    /// `moves[1]` on.
    pub fn from_lichess(id: &str, fen: &str, moves: &str) -> Result<Self, PuzzleError> {
        let mut plies = moves.split_whitespace();
        let setup = plies.next().ok_or_else(|| PuzzleError::EmptySolution { id: id.to_string() })?;
        let solution: Vec<String> = plies.map(str::to_string).collect();
        if solution.is_empty() {
            return Err(PuzzleError::EmptySolution { id: id.to_string() });
        }

        let invalid_setup = || PuzzleError::InvalidSetupMove {
            id: id.to_string(),
            mv: setup.to_string(),
        };
        let mut position = PositionHandle::load(fen)?;
        let request: MoveRequest = setup.parse().map_err(|_| invalid_setup())?;
        position.apply_move(&request).ok_or_else(invalid_setup)?;

        Ok(Self::new(id, position.to_fen(), solution))
    }

    pub fn with_rating(mut self, rating: u32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.rating.map(Difficulty::from_rating)
    }

    /// The side that solves the puzzle.
    pub fn side_to_move(&self) -> Result<Color, PuzzleError> {
        Ok(PositionHandle::load(&self.initial_fen)?.turn())
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Puzzle {}", self.id))
    }

    /// Replay the whole solution and report the first problem found.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        self.replay().map(|_| ())
    }

    /// The solution as a numbered SAN line, e.g. `"1. Rc8+ Kh7 2. Rh8#"`.
    pub fn solution_line(&self) -> Result<String, PuzzleError> {
        let white_first = self.side_to_move()? == Color::White;
        let sans = self.replay()?;
        Ok(notation::format_line(&sans, white_first))
    }

    fn replay(&self) -> Result<Vec<String>, PuzzleError> {
        if self.solution.is_empty() {
            return Err(PuzzleError::EmptySolution { id: self.id.clone() });
        }

        let mut position = PositionHandle::load(&self.initial_fen)?;
        let mut sans = Vec::with_capacity(self.solution.len());

        for (index, ply) in self.solution.iter().enumerate() {
            let record = position
                .find_solution_move(ply)
                .and_then(|request| position.apply_move(&request))
                .ok_or_else(|| PuzzleError::UnresolvablePly {
                    id: self.id.clone(),
                    index,
                    ply: ply.clone(),
                })?;
            sans.push(record.san);
        }

        Ok(sans)
    }
}
