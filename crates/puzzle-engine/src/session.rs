//! Tokio driver for a puzzle attempt.
//!
//! Wraps `PuzzleSolutionEngine` and turns reply tickets into timers: each
//! scheduled reply is a spawned sleep that sends its ticket back over a
//! channel once the delay has passed. Loading a new puzzle or undoing aborts
//! the timer, and a ticket that still slips through resolves as stale.

use std::time::Duration;

use chess_core::{MoveRequest, Puzzle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::attempt::{AttemptState, Hint};
use crate::config::EngineConfig;
use crate::engine::{MoveOutcome, PuzzleSolutionEngine, SubmitOutcome};
use crate::error::EngineError;
use crate::reply::{ReplyOutcome, ReplyTicket};

pub struct PuzzleSession {
    engine: PuzzleSolutionEngine,
    delay: Duration,
    tx: mpsc::UnboundedSender<ReplyTicket>,
    rx: mpsc::UnboundedReceiver<ReplyTicket>,
    timer: Option<JoinHandle<()>>,
}

impl PuzzleSession {
    pub fn new(config: EngineConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            delay: config.reply_delay,
            engine: PuzzleSolutionEngine::new(config),
            tx,
            rx,
            timer: None,
        }
    }

    pub fn engine(&self) -> &PuzzleSolutionEngine {
        &self.engine
    }

    pub fn attempt(&self) -> Option<&AttemptState> {
        self.engine.attempt()
    }

    pub fn reply_pending(&self) -> bool {
        self.engine.pending_reply().is_some()
    }

    pub fn load(&mut self, puzzle: Puzzle) -> Result<&AttemptState, EngineError> {
        self.cancel_timer();
        self.engine.reset(puzzle)
    }

    pub fn submit_move(&mut self, request: MoveRequest) -> Result<SubmitOutcome, EngineError> {
        let outcome = self.engine.submit_move(request)?;
        if let MoveOutcome::CorrectAwaitingOpponent(ticket) = outcome.result {
            self.schedule(ticket);
        }
        Ok(outcome)
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_timer();
        self.engine.undo_last_player_move()
    }

    pub fn show_hint(&mut self) -> Result<Option<Hint>, EngineError> {
        self.engine.show_hint()
    }

    /// Wait for the scheduled opponent reply and play it. Stale tickets are
    /// dropped and waiting continues. Fails with `NoOpponentReply` when no
    /// reply is scheduled.
    pub async fn next_reply(&mut self) -> Result<ReplyOutcome, EngineError> {
        loop {
            if !self.reply_pending() {
                return Err(EngineError::NoOpponentReply);
            }
            let ticket = self.rx.recv().await.ok_or(EngineError::NoOpponentReply)?;
            match self.engine.resolve_reply(ticket)? {
                ReplyOutcome::Stale => {
                    debug!(generation = ticket.generation, "Dropped stale reply timer");
                }
                applied => {
                    self.timer = None;
                    return Ok(applied);
                }
            }
        }
    }

    fn schedule(&mut self, ticket: ReplyTicket) {
        self.cancel_timer();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The session may be gone by now.
            let _ = tx.send(ticket);
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for PuzzleSession {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
