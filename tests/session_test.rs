//! Tests for the tokio-driven puzzle session: reply timing and cancellation.

mod common;

use std::time::Duration;

use chess_core::MoveRequest;
use puzzle_engine::{
    AttemptStatus, EngineConfig, EngineError, MoveOutcome, PuzzleSession, ReplyOutcome,
};
use common::{back_rank_mate, rook_ladder, BACK_RANK_FEN, LADDER_FEN};

fn mv(text: &str) -> MoveRequest {
    text.parse().unwrap()
}

fn session() -> PuzzleSession {
    PuzzleSession::new(EngineConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_reply_arrives_after_delay() {
    let mut session = session();
    session.load(rook_ladder()).unwrap();

    let start = tokio::time::Instant::now();
    let outcome = session.submit_move(mv("c1c8")).unwrap();
    assert!(matches!(outcome.result, MoveOutcome::CorrectAwaitingOpponent(_)));
    assert!(session.reply_pending());

    let reply = session.next_reply().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(500));
    match reply {
        ReplyOutcome::Applied { record, solved } => {
            assert_eq!(record.san, "Kh7");
            assert!(!solved);
        }
        ReplyOutcome::Stale => panic!("reply should have been played"),
    }
    assert!(!session.reply_pending());

    let outcome = session.submit_move(mv("c8h8")).unwrap();
    assert_eq!(outcome.result, MoveOutcome::Solved);
    assert_eq!(session.attempt().unwrap().status(), AttemptStatus::Solved);
}

#[tokio::test(start_paused = true)]
async fn test_load_cancels_pending_reply() {
    let mut session = session();
    session.load(rook_ladder()).unwrap();
    session.submit_move(mv("c1c8")).unwrap();

    session.load(back_rank_mate()).unwrap();
    assert!(!session.reply_pending());

    assert_eq!(session.next_reply().await, Err(EngineError::NoOpponentReply));

    // The aborted timer never touches the new puzzle.
    tokio::time::sleep(Duration::from_secs(2)).await;
    let state = session.attempt().unwrap();
    assert_eq!(state.fen(), BACK_RANK_FEN);
    assert!(state.plies_played().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_undo_cancels_pending_reply() {
    let mut session = session();
    session.load(rook_ladder()).unwrap();
    session.submit_move(mv("c1c8")).unwrap();

    assert!(session.undo());
    assert!(!session.reply_pending());

    assert_eq!(session.next_reply().await, Err(EngineError::NoOpponentReply));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(session.engine().fen().unwrap(), LADDER_FEN);
}

#[tokio::test(start_paused = true)]
async fn test_next_reply_without_scheduled_reply() {
    let mut session = session();
    session.load(rook_ladder()).unwrap();

    let waited = tokio::time::timeout(Duration::from_secs(3600), session.next_reply()).await;
    assert_eq!(waited, Ok(Err(EngineError::NoOpponentReply)));
}

#[tokio::test(start_paused = true)]
async fn test_drained_stale_ticket_reports_no_reply() {
    let mut session = session();
    session.load(rook_ladder()).unwrap();
    session.submit_move(mv("c1c8")).unwrap();

    // The ticket lands in the channel before the undo invalidates it.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(session.undo());

    let waited = tokio::time::timeout(Duration::from_secs(3600), session.next_reply()).await;
    assert_eq!(waited, Ok(Err(EngineError::NoOpponentReply)));
}

#[tokio::test(start_paused = true)]
async fn test_delivered_stale_ticket_is_skipped() {
    let mut session = session();
    session.load(rook_ladder()).unwrap();
    session.submit_move(mv("c1c8")).unwrap();

    // Let the timer deliver its ticket without redeeming it.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(session.undo());

    session.submit_move(mv("c1c8")).unwrap();
    let reply = session.next_reply().await.unwrap();
    assert!(matches!(reply, ReplyOutcome::Applied { solved: false, .. }));

    let state = session.attempt().unwrap();
    assert_eq!(state.plies_played().len(), 2);
    assert_eq!(state.expected_index(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_reply_delay() {
    let mut session = PuzzleSession::new(EngineConfig {
        reply_delay: Duration::from_millis(50),
        ..EngineConfig::default()
    });
    session.load(rook_ladder()).unwrap();

    let start = tokio::time::Instant::now();
    session.submit_move(mv("c1c8")).unwrap();
    session.next_reply().await.unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_ticket_due_follows_runtime_clock() {
    let mut session = session();
    session.load(rook_ladder()).unwrap();

    let start = tokio::time::Instant::now();
    let outcome = session.submit_move(mv("c1c8")).unwrap();
    let MoveOutcome::CorrectAwaitingOpponent(ticket) = outcome.result else {
        panic!("expected a scheduled reply");
    };
    assert_eq!(ticket.due, start + Duration::from_millis(500));
    assert!(!ticket.is_due(tokio::time::Instant::now()));

    session.next_reply().await.unwrap();
    assert!(ticket.is_due(tokio::time::Instant::now()));
}
