//! Puzzle solution engine: checks player moves against the stored solution,
//! plays the opponent's scripted replies, and handles hints and undo.

use chess_core::{MoveRecord, MoveRequest, PositionHandle, Puzzle, PuzzleError};
use shakmaty::{Role, Square};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::attempt::{AttemptState, AttemptStatus, Hint, PlyRecord, PlySide, SolveReport};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::reply::{ReplyOutcome, ReplyTicket};

/// Why a submission was refused before it reached the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AttemptFinished,
    OpponentReplyPending,
    NotPlayersTurn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not a legal chess move here.
    Illegal,
    /// Legal, but not the solution. The move has been taken back.
    IncorrectMove,
    /// On the solution; the opponent's reply is scheduled under this ticket.
    CorrectAwaitingOpponent(ReplyTicket),
    Solved,
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub accepted: bool,
    pub result: MoveOutcome,
    /// The move as the rules engine played it, for legal submissions.
    pub played: Option<MoveRecord>,
}

impl SubmitOutcome {
    fn refused(result: MoveOutcome) -> Self {
        Self {
            accepted: false,
            result,
            played: None,
        }
    }

    /// True when the player mated, but not with the intended solution move.
    /// The move still counts as incorrect and has been taken back.
    pub fn found_other_mate(&self) -> bool {
        self.result == MoveOutcome::IncorrectMove
            && self.played.as_ref().is_some_and(|m| m.is_checkmate)
    }

    fn accepted(result: MoveOutcome, played: MoveRecord) -> Self {
        Self {
            accepted: true,
            result,
            played: Some(played),
        }
    }
}

pub struct PuzzleSolutionEngine {
    config: EngineConfig,
    attempt: Option<AttemptState>,
    generation: u64,
    pending: Option<ReplyTicket>,
}

impl PuzzleSolutionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            attempt: None,
            generation: 0,
            pending: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn attempt(&self) -> Option<&AttemptState> {
        self.attempt.as_ref()
    }

    pub fn pending_reply(&self) -> Option<ReplyTicket> {
        self.pending
    }

    pub fn fen(&self) -> Result<String, EngineError> {
        Ok(self.current()?.fen())
    }

    /// Start a fresh attempt at `puzzle`, discarding any previous attempt and
    /// invalidating its outstanding reply ticket.
    pub fn reset(&mut self, puzzle: Puzzle) -> Result<&AttemptState, EngineError> {
        self.cancel_pending();
        self.attempt = None;

        if puzzle.solution.is_empty() {
            return Err(PuzzleError::EmptySolution { id: puzzle.id }.into());
        }
        let position = PositionHandle::load(&puzzle.initial_fen).map_err(PuzzleError::from)?;

        info!(
            puzzle_id = %puzzle.id,
            plies = puzzle.solution.len(),
            "Puzzle attempt started"
        );
        Ok(self.attempt.insert(AttemptState::new(puzzle, position)))
    }

    /// Submit a player move in coordinate form.
    pub fn submit_move(&mut self, request: MoveRequest) -> Result<SubmitOutcome, EngineError> {
        let attempt = self.attempt.as_mut().ok_or(EngineError::NoAttempt)?;

        let rejection = if attempt.status != AttemptStatus::InProgress {
            Some(Rejection::AttemptFinished)
        } else if self.pending.is_some() {
            Some(Rejection::OpponentReplyPending)
        } else if !attempt.is_players_turn() {
            Some(Rejection::NotPlayersTurn)
        } else {
            None
        };
        if let Some(reason) = rejection {
            warn!(puzzle_id = %attempt.puzzle.id, mv = %request, ?reason, "Move rejected");
            return Ok(SubmitOutcome::refused(MoveOutcome::Rejected(reason)));
        }

        let Some(record) = apply_player_move(&mut attempt.position, &request, self.config.auto_queen)
        else {
            debug!(puzzle_id = %attempt.puzzle.id, mv = %request, "Illegal move");
            return Ok(SubmitOutcome::refused(MoveOutcome::Illegal));
        };

        let index = attempt.expected_index;
        let expected = attempt.puzzle.solution[index].as_str();
        attempt.hint = None;

        if !chess_core::notation::matches_ply(&record, expected) {
            attempt.position.undo()?;
            attempt.mistakes += 1;
            info!(
                puzzle_id = %attempt.puzzle.id,
                index,
                played = %record.san,
                mistakes = attempt.mistakes,
                "Incorrect move taken back"
            );
            return Ok(SubmitOutcome::accepted(MoveOutcome::IncorrectMove, record));
        }

        attempt.plies_played.push(PlyRecord {
            side: PlySide::Player,
            record: record.clone(),
        });
        attempt.expected_index += 1;
        debug!(puzzle_id = %attempt.puzzle.id, index, played = %record.san, "Correct move");

        if attempt.expected_index == attempt.puzzle.solution.len() {
            attempt.mark_solved();
            info!(puzzle_id = %attempt.puzzle.id, mistakes = attempt.mistakes, "Puzzle solved");
            return Ok(SubmitOutcome::accepted(MoveOutcome::Solved, record));
        }

        // Turns alternate, so the next solution ply is the opponent's.
        self.generation += 1;
        let ticket = ReplyTicket {
            generation: self.generation,
            due: Instant::now() + self.config.reply_delay,
        };
        self.pending = Some(ticket);
        Ok(SubmitOutcome::accepted(
            MoveOutcome::CorrectAwaitingOpponent(ticket),
            record,
        ))
    }

    /// Play the opponent's next solution ply now, superseding any pending
    /// ticket.
    pub fn play_opponent_reply(&mut self) -> Result<ReplyOutcome, EngineError> {
        let attempt = self.attempt.as_mut().ok_or(EngineError::NoAttempt)?;
        if attempt.status != AttemptStatus::InProgress || attempt.is_players_turn() {
            return Err(EngineError::NoOpponentReply);
        }
        let index = attempt.expected_index;
        let ply = attempt
            .expected_ply()
            .ok_or(EngineError::NoOpponentReply)?
            .to_string();

        self.pending = None;

        let record = attempt
            .position
            .find_solution_move(&ply)
            .and_then(|request| attempt.position.apply_move(&request));
        let Some(record) = record else {
            attempt.status = AttemptStatus::Failed;
            error!(
                puzzle_id = %attempt.puzzle.id,
                index,
                ply = %ply,
                fen = %attempt.position.to_fen(),
                "Opponent solution ply matches no legal move"
            );
            return Err(EngineError::CorruptSolution {
                puzzle_id: attempt.puzzle.id.clone(),
                index,
                ply,
            });
        };

        attempt.plies_played.push(PlyRecord {
            side: PlySide::Opponent,
            record: record.clone(),
        });
        attempt.expected_index += 1;
        attempt.hint = None;
        debug!(puzzle_id = %attempt.puzzle.id, index, played = %record.san, "Opponent replied");

        let solved = attempt.expected_index == attempt.puzzle.solution.len();
        if solved {
            attempt.mark_solved();
            info!(puzzle_id = %attempt.puzzle.id, "Puzzle solved");
        }
        Ok(ReplyOutcome::Applied { record, solved })
    }

    /// Redeem a ticket from `submit_move`. Tickets from an earlier reset, or
    /// made obsolete by undo, come back as `Stale` and change nothing.
    pub fn resolve_reply(&mut self, ticket: ReplyTicket) -> Result<ReplyOutcome, EngineError> {
        if self.pending != Some(ticket) {
            debug!(generation = ticket.generation, "Discarding stale reply ticket");
            return Ok(ReplyOutcome::Stale);
        }
        self.play_opponent_reply()
    }

    /// Play the pending reply if it is due at `now`.
    pub fn poll_reply(&mut self, now: Instant) -> Result<Option<ReplyOutcome>, EngineError> {
        match self.pending {
            Some(ticket) if ticket.is_due(now) => self.resolve_reply(ticket).map(Some),
            _ => Ok(None),
        }
    }

    /// Take back the last player move together with the opponent reply to
    /// it, if one was played. Returns false when there is nothing to undo or
    /// the attempt is over.
    pub fn undo_last_player_move(&mut self) -> bool {
        let Some(attempt) = self.attempt.as_mut() else {
            return false;
        };
        if attempt.status != AttemptStatus::InProgress {
            return false;
        }
        let Some(last_player) = attempt
            .plies_played
            .iter()
            .rposition(|p| p.side == PlySide::Player)
        else {
            return false;
        };

        while attempt.plies_played.len() > last_player {
            if let Err(e) = attempt.position.undo() {
                warn!(puzzle_id = %attempt.puzzle.id, "Undo out of step with history: {e}");
                break;
            }
            attempt.plies_played.pop();
            attempt.expected_index = attempt.expected_index.saturating_sub(1);
        }
        attempt.hint = None;
        debug!(
            puzzle_id = %attempt.puzzle.id,
            expected_index = attempt.expected_index,
            "Undid player move"
        );

        self.cancel_pending();
        true
    }

    /// Squares of the player's next solution move. `None` once the attempt
    /// is over or while the opponent is to move. Does not change state.
    pub fn get_hint(&self) -> Result<Option<Hint>, EngineError> {
        let attempt = self.current()?;
        if attempt.status != AttemptStatus::InProgress || !attempt.is_players_turn() {
            return Ok(None);
        }
        let Some(ply) = attempt.expected_ply() else {
            return Ok(None);
        };

        match attempt.position.find_solution_move(ply) {
            Some(request) => Ok(Some(Hint {
                from: request.from,
                to: request.to,
            })),
            None => {
                error!(
                    puzzle_id = %attempt.puzzle.id,
                    index = attempt.expected_index,
                    ply = %ply,
                    "Hint ply matches no legal move"
                );
                Err(EngineError::CorruptSolution {
                    puzzle_id: attempt.puzzle.id.clone(),
                    index: attempt.expected_index,
                    ply: ply.to_string(),
                })
            }
        }
    }

    /// Like `get_hint`, but also highlights the hint on the attempt and
    /// counts it.
    pub fn show_hint(&mut self) -> Result<Option<Hint>, EngineError> {
        let hint = self.get_hint()?;
        if let (Some(h), Some(attempt)) = (hint, self.attempt.as_mut()) {
            attempt.hint = Some(h);
            attempt.hints_used += 1;
        }
        Ok(hint)
    }

    /// Destination squares for the piece on `from`, for move highlighting.
    pub fn legal_destinations(&self, from: Square) -> Result<Vec<Square>, EngineError> {
        let attempt = self.current()?;
        let mut targets: Vec<Square> = attempt
            .position
            .legal_moves(Some(from))
            .into_iter()
            .map(|m| m.to)
            .collect();
        targets.sort();
        targets.dedup();
        Ok(targets)
    }

    pub fn report(&self) -> Option<SolveReport> {
        self.attempt.as_ref().and_then(AttemptState::report)
    }

    fn current(&self) -> Result<&AttemptState, EngineError> {
        self.attempt.as_ref().ok_or(EngineError::NoAttempt)
    }

    fn cancel_pending(&mut self) {
        self.generation += 1;
        self.pending = None;
    }
}

fn apply_player_move(
    position: &mut PositionHandle,
    request: &MoveRequest,
    auto_queen: bool,
) -> Option<MoveRecord> {
    if let Some(record) = position.apply_move(request) {
        return Some(record);
    }
    if auto_queen && request.promotion.is_none() {
        return position.apply_move(&request.with_promotion(Role::Queen));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const LADDER: &str = "6k1/5p2/6p1/6K1/8/8/1B6/2R5 w - - 0 1";

    fn engine() -> PuzzleSolutionEngine {
        PuzzleSolutionEngine::new(EngineConfig {
            reply_delay: Duration::from_millis(500),
            ..EngineConfig::default()
        })
    }

    fn mv(text: &str) -> MoveRequest {
        text.parse().unwrap()
    }

    #[test]
    fn test_operations_need_a_puzzle() {
        let mut engine = engine();
        assert_eq!(engine.submit_move(mv("c1c8")), Err(EngineError::NoAttempt));
        assert_eq!(engine.play_opponent_reply(), Err(EngineError::NoAttempt));
        assert_eq!(engine.get_hint(), Err(EngineError::NoAttempt));
        assert!(!engine.undo_last_player_move());
        assert!(engine.report().is_none());
    }

    #[test]
    fn test_reset_rejects_bad_fen() {
        let mut engine = engine();
        let result = engine.reset(Puzzle::parse("bad", "nonsense", "Ra8#"));
        assert!(matches!(result, Err(EngineError::InvalidPuzzle(_))));
        assert!(engine.attempt().is_none());
    }

    #[test]
    fn test_ticket_due_after_delay() {
        let mut engine = engine();
        engine.reset(Puzzle::parse("ladder", LADDER, "Rc8+ Kh7 Rh8#")).unwrap();
        let before = Instant::now();
        let outcome = engine.submit_move(mv("c1c8")).unwrap();
        let MoveOutcome::CorrectAwaitingOpponent(ticket) = outcome.result else {
            panic!("expected a scheduled reply, got {:?}", outcome.result);
        };

        assert!(ticket.due >= before + Duration::from_millis(500));
        assert_eq!(engine.poll_reply(before).unwrap(), None);
        assert_eq!(engine.pending_reply(), Some(ticket));

        let applied = engine.poll_reply(ticket.due).unwrap();
        assert!(matches!(applied, Some(ReplyOutcome::Applied { solved: false, .. })));
        assert_eq!(engine.pending_reply(), None);
        assert_eq!(engine.attempt().unwrap().expected_index(), 2);
    }

    #[test]
    fn test_direct_reply_supersedes_ticket() {
        let mut engine = engine();
        engine.reset(Puzzle::parse("ladder", LADDER, "Rc8+ Kh7 Rh8#")).unwrap();
        let outcome = engine.submit_move(mv("c1c8")).unwrap();
        let MoveOutcome::CorrectAwaitingOpponent(ticket) = outcome.result else {
            panic!("expected a scheduled reply");
        };

        engine.play_opponent_reply().unwrap();
        assert_eq!(engine.resolve_reply(ticket).unwrap(), ReplyOutcome::Stale);
        assert_eq!(engine.attempt().unwrap().plies_played().len(), 2);
    }

    #[test]
    fn test_no_reply_on_players_turn() {
        let mut engine = engine();
        engine.reset(Puzzle::parse("ladder", LADDER, "Rc8+ Kh7 Rh8#")).unwrap();
        assert_eq!(engine.play_opponent_reply(), Err(EngineError::NoOpponentReply));
    }

    #[test]
    fn test_show_hint_counts_and_clears() {
        let mut engine = engine();
        engine.reset(Puzzle::parse("ladder", LADDER, "Rc8+ Kh7 Rh8#")).unwrap();

        let hint = engine.show_hint().unwrap().unwrap();
        assert_eq!((hint.from, hint.to), (Square::C1, Square::C8));
        let attempt = engine.attempt().unwrap();
        assert!(attempt.hint_active());
        assert_eq!(attempt.hints_used(), 1);

        engine.submit_move(mv("c1c7")).unwrap();
        assert!(!engine.attempt().unwrap().hint_active());
    }

    #[test]
    fn test_legal_destinations() {
        let mut engine = engine();
        engine.reset(Puzzle::parse("ladder", LADDER, "Rc8+ Kh7 Rh8#")).unwrap();
        let targets = engine.legal_destinations(Square::C1).unwrap();
        assert!(targets.contains(&Square::C8));
        assert!(targets.contains(&Square::A1));
        assert!(!targets.contains(&Square::D2));
        assert!(engine.legal_destinations(Square::E4).unwrap().is_empty());
    }

    #[test]
    fn test_auto_queen_can_be_disabled() {
        let fen = "8/P7/8/8/8/8/k7/7K w - - 0 1";
        let mut engine = PuzzleSolutionEngine::new(EngineConfig {
            auto_queen: false,
            ..EngineConfig::default()
        });
        engine.reset(Puzzle::parse("promo", fen, "a8=Q+")).unwrap();
        let outcome = engine.submit_move(mv("a7a8")).unwrap();
        assert_eq!(outcome.result, MoveOutcome::Illegal);
        let outcome = engine.submit_move(mv("a7a8q")).unwrap();
        assert_eq!(outcome.result, MoveOutcome::Solved);
    }
}
