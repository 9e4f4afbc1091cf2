//! Deferred opponent replies.
//!
//! A correct player move does not play the opponent's answer right away. The
//! engine hands out a `ReplyTicket`; whoever owns the clock redeems it once
//! `due` has passed. Tickets carry the engine generation they were issued
//! under, so a ticket redeemed after a reset or undo is a no-op. `due` is on
//! tokio's clock, the same one `PuzzleSession` sleeps on.

use chess_core::MoveRecord;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTicket {
    pub generation: u64,
    pub due: Instant,
}

impl ReplyTicket {
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The opponent's solution ply was played.
    Applied { record: MoveRecord, solved: bool },
    /// The ticket belongs to an attempt state that no longer exists.
    Stale,
}
