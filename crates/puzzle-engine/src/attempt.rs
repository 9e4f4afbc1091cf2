//! State of one puzzle attempt.

use std::time::Duration;

use chess_core::{MoveRecord, PositionHandle, Puzzle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shakmaty::{Color, Square};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    InProgress,
    Solved,
    /// The puzzle data turned out to be unplayable.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlySide {
    Player,
    Opponent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyRecord {
    pub side: PlySide,
    pub record: MoveRecord,
}

/// Squares to highlight for the next expected move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hint {
    pub from: Square,
    pub to: Square,
}

/// Summary handed to the progress store once a puzzle is solved.
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub puzzle_id: String,
    pub player_moves: usize,
    pub mistakes: u32,
    pub hints_used: u32,
    pub elapsed_ms: u64,
    pub solved_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AttemptState {
    pub(crate) puzzle: Puzzle,
    pub(crate) position: PositionHandle,
    pub(crate) player_color: Color,
    pub(crate) plies_played: Vec<PlyRecord>,
    pub(crate) expected_index: usize,
    pub(crate) status: AttemptStatus,
    pub(crate) hint: Option<Hint>,
    pub(crate) mistakes: u32,
    pub(crate) hints_used: u32,
    pub(crate) started_at: Instant,
    pub(crate) finished: Option<(Instant, DateTime<Utc>)>,
}

impl AttemptState {
    pub(crate) fn new(puzzle: Puzzle, position: PositionHandle) -> Self {
        let player_color = position.turn();
        Self {
            puzzle,
            position,
            player_color,
            plies_played: Vec::new(),
            expected_index: 0,
            status: AttemptStatus::InProgress,
            hint: None,
            mistakes: 0,
            hints_used: 0,
            started_at: Instant::now(),
            finished: None,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn player_color(&self) -> Color {
        self.player_color
    }

    pub fn plies_played(&self) -> &[PlyRecord] {
        &self.plies_played
    }

    pub fn expected_index(&self) -> usize {
        self.expected_index
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint
    }

    pub fn hint_active(&self) -> bool {
        self.hint.is_some()
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn fen(&self) -> String {
        self.position.to_fen()
    }

    pub fn is_players_turn(&self) -> bool {
        self.position.turn() == self.player_color
    }

    pub fn remaining_plies(&self) -> usize {
        self.puzzle.solution.len() - self.expected_index
    }

    pub(crate) fn expected_ply(&self) -> Option<&str> {
        self.puzzle.solution.get(self.expected_index).map(String::as_str)
    }

    pub(crate) fn mark_solved(&mut self) {
        self.status = AttemptStatus::Solved;
        self.hint = None;
        self.finished = Some((Instant::now(), Utc::now()));
    }

    pub fn report(&self) -> Option<SolveReport> {
        let (finished_at, solved_at) = self.finished?;
        let elapsed: Duration = finished_at.duration_since(self.started_at);
        Some(SolveReport {
            puzzle_id: self.puzzle.id.clone(),
            player_moves: self
                .plies_played
                .iter()
                .filter(|p| p.side == PlySide::Player)
                .count(),
            mistakes: self.mistakes,
            hints_used: self.hints_used,
            elapsed_ms: elapsed.as_millis() as u64,
            solved_at,
        })
    }
}
