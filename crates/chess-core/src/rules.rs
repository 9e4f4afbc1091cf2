//! Position handle over shakmaty.
//!
//! Every rules question the puzzle engine asks goes through `PositionHandle`:
//! loading a FEN, listing legal moves, applying and undoing moves, and
//! serializing back to FEN. shakmaty positions are values, so undo is a stack
//! of previous positions owned by the handle.

use std::fmt;
use std::str::FromStr;

use shakmaty::{
    fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, Move, Position,
    Role, Square,
};

use crate::error::RulesError;
use crate::notation;

/// Coordinate form of a move, as produced by board interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to, promotion: None }
    }

    pub fn with_promotion(mut self, role: Role) -> Self {
        self.promotion = Some(role);
        self
    }

    fn to_uci(self) -> UciMove {
        UciMove::Normal {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }

    /// Coordinates of a legal move. Castling is reported as the king's
    /// two-square step (`e1g1`), the way boards and puzzle files write it.
    fn from_move(m: &Move) -> Option<Self> {
        match m.to_uci(CastlingMode::Standard) {
            UciMove::Normal { from, to, promotion } => Some(Self { from, to, promotion }),
            _ => None,
        }
    }
}

impl FromStr for MoveRequest {
    type Err = RulesError;

    /// Parse coordinate text such as `e2e4` or `e7e8q`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uci: UciMove = s
            .trim()
            .parse()
            .map_err(|_| RulesError::InvalidMove(s.to_string()))?;
        match uci {
            UciMove::Normal { from, to, promotion } => Ok(Self { from, to, promotion }),
            _ => Err(RulesError::InvalidMove(s.to_string())),
        }
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// A move that was applied to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
    /// SAN including the `+`/`#` suffix.
    pub san: String,
    pub uci: String,
    pub captured: Option<Role>,
    pub is_check: bool,
    pub is_checkmate: bool,
}

/// Exclusively owned position plus the positions it came from.
#[derive(Debug, Clone)]
pub struct PositionHandle {
    current: Chess,
    history: Vec<Chess>,
}

impl PositionHandle {
    pub fn load(fen: &str) -> Result<Self, RulesError> {
        let parsed: Fen = fen.trim().parse().map_err(|e| RulesError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e}"),
        })?;
        let current: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidPosition {
                fen: fen.to_string(),
                reason: format!("{e}"),
            })?;
        Ok(Self {
            current,
            history: Vec::new(),
        })
    }

    pub fn turn(&self) -> Color {
        self.current.turn()
    }

    pub fn to_fen(&self) -> String {
        Fen::from_position(&self.current, EnPassantMode::Legal).to_string()
    }

    /// Number of moves that can be undone.
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Legal moves in coordinate form, optionally only those leaving `square`.
    pub fn legal_moves(&self, square: Option<Square>) -> Vec<MoveRequest> {
        self.current
            .legal_moves()
            .iter()
            .filter_map(MoveRequest::from_move)
            .filter(|m| square.map_or(true, |sq| m.from == sq))
            .collect()
    }

    pub fn is_legal(&self, request: &MoveRequest) -> bool {
        self.resolve(request).is_some()
    }

    /// Apply `request` if it is legal here. Returns `None` for illegal moves
    /// and leaves the position untouched.
    ///
    /// A promotion piece on a move that does not promote is ignored, since
    /// boards send one with every drag.
    pub fn apply_move(&mut self, request: &MoveRequest) -> Option<MoveRecord> {
        let m = self.resolve(request)?;
        Some(self.play(&m))
    }

    pub fn undo(&mut self) -> Result<(), RulesError> {
        let previous = self.history.pop().ok_or(RulesError::NothingToUndo)?;
        self.current = previous;
        Ok(())
    }

    /// Find the legal move written as `ply` in a puzzle solution.
    ///
    /// SAN plies are compared against the SAN of every legal move with check
    /// and mate suffixes stripped on both sides. Coordinate plies must name a
    /// legal move exactly.
    pub fn find_solution_move(&self, ply: &str) -> Option<MoveRequest> {
        if notation::is_uci(ply) {
            let request: MoveRequest = ply.parse().ok()?;
            return self.is_legal(&request).then_some(request);
        }

        let wanted = notation::normalize_san(ply);
        self.current
            .legal_moves()
            .iter()
            .find(|m| San::from_move(&self.current, **m).to_string() == wanted)
            .and_then(MoveRequest::from_move)
    }

    fn resolve(&self, request: &MoveRequest) -> Option<Move> {
        if let Ok(m) = request.to_uci().to_move(&self.current) {
            return Some(m);
        }
        if request.promotion.is_none() {
            return None;
        }
        let plain = MoveRequest {
            promotion: None,
            ..*request
        };
        plain
            .to_uci()
            .to_move(&self.current)
            .ok()
            .filter(|m| !m.is_promotion())
    }

    fn play(&mut self, m: &Move) -> MoveRecord {
        let san = San::from_move(&self.current, *m).to_string();
        let uci = m.to_uci(CastlingMode::Standard).to_string();
        let coords = MoveRequest::from_move(m);
        let captured = m.capture();

        let mut next = self.current.clone();
        next.play_unchecked(*m);
        let is_checkmate = next.is_checkmate();
        let is_check = next.is_check();

        let previous = std::mem::replace(&mut self.current, next);
        self.history.push(previous);

        let suffix = if is_checkmate {
            "#"
        } else if is_check {
            "+"
        } else {
            ""
        };

        MoveRecord {
            from: coords.map(|c| c.from).unwrap_or(m.to()),
            to: coords.map(|c| c.to).unwrap_or(m.to()),
            promotion: m.promotion(),
            san: format!("{san}{suffix}"),
            uci,
            captured,
            is_check,
            is_checkmate,
        }
    }
}
