//! Terminal puzzle solver
//!
//! Loads puzzles from a JSON file and plays one of them over stdin:
//!
//!   solve-puzzle puzzles.json [puzzle-id]
//!
//! Commands: a move in coordinate form (`e2e4`, `e7e8q`), `hint`, `undo`,
//! `reset`, `fen`, `solution`, `quit`.

use anyhow::{bail, Context};
use chess_core::{MoveRequest, Puzzle};
use puzzle_engine::{
    EngineConfig, EngineError, MoveOutcome, PuzzleSession, Rejection, ReplyOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

enum Flow {
    Continue,
    Quit,
}

fn load_puzzle(path: &str, wanted: Option<&str>) -> anyhow::Result<Puzzle> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let puzzles: Vec<Puzzle> =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {path}"))?;

    match wanted {
        Some(id) => puzzles
            .into_iter()
            .find(|p| p.id == id)
            .with_context(|| format!("No puzzle with id {id} in {path}")),
        None => puzzles
            .into_iter()
            .next()
            .with_context(|| format!("{path} contains no puzzles")),
    }
}

fn print_intro(puzzle: &Puzzle) -> anyhow::Result<()> {
    let side = if puzzle.side_to_move()?.is_white() { "White" } else { "Black" };
    println!("{}", puzzle.display_name());
    if let Some(difficulty) = puzzle.difficulty() {
        println!("Difficulty: {}", difficulty.label());
    }
    println!("{side} to move, {} plies", puzzle.solution.len());
    println!("{}", puzzle.initial_fen);
    Ok(())
}

fn handle_command(
    session: &mut PuzzleSession,
    puzzle: &Puzzle,
    config: &EngineConfig,
    line: &str,
) -> anyhow::Result<Flow> {
    match line {
        "" => {}
        "quit" | "exit" => return Ok(Flow::Quit),
        "fen" => println!("{}", session.engine().fen()?),
        "solution" => println!("{}", puzzle.solution_line()?),
        "reset" => {
            session.load(puzzle.clone())?;
            println!("Board reset. {}", session.engine().fen()?);
        }
        "undo" => {
            if session.undo() {
                println!("Move taken back. {}", session.engine().fen()?);
            } else {
                println!("Nothing to undo.");
            }
        }
        "hint" => match session.show_hint()? {
            Some(hint) => println!("Hint: move the piece on {} to {}", hint.from, hint.to),
            None => println!("No hint available."),
        },
        text => {
            let request: MoveRequest = match text.parse() {
                Ok(request) => request,
                Err(e) => {
                    println!("{e}");
                    return Ok(Flow::Continue);
                }
            };
            let outcome = session.submit_move(request)?;
            let played = outcome.played.as_ref().map(|r| r.san.as_str()).unwrap_or(text);
            match outcome.result {
                MoveOutcome::Illegal => println!("{text} is not a legal move."),
                MoveOutcome::IncorrectMove if outcome.found_other_mate() => {
                    println!("{played} is checkmate, but not the intended solution. Try again.");
                }
                MoveOutcome::IncorrectMove => {
                    println!("{played} is not the solution. Try again.");
                    let mistakes = session.attempt().map(|a| a.mistakes()).unwrap_or(0);
                    if config.hint_after_mistakes > 0 && mistakes >= config.hint_after_mistakes {
                        println!("Stuck? Type `hint`.");
                    }
                }
                MoveOutcome::CorrectAwaitingOpponent(_) => println!("{played} is correct!"),
                MoveOutcome::Solved => {
                    println!("{played} solves the puzzle!");
                    if let Some(report) = session.engine().report() {
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    }
                    return Ok(Flow::Quit);
                }
                MoveOutcome::Rejected(Rejection::OpponentReplyPending)
                | MoveOutcome::Rejected(Rejection::NotPlayersTurn) => {
                    println!("Wait for the opponent to move.")
                }
                MoveOutcome::Rejected(Rejection::AttemptFinished) => {
                    println!("This attempt is over. Type `reset` to play again.")
                }
            }
        }
    }
    Ok(Flow::Continue)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(path) = args.get(1) else {
        bail!("usage: solve-puzzle <puzzles.json> [puzzle-id]");
    };
    let puzzle = load_puzzle(path, args.get(2).map(String::as_str))?;

    let config = EngineConfig::from_env();
    info!(
        reply_delay_ms = config.reply_delay.as_millis() as u64,
        auto_queen = config.auto_queen,
        "Engine configured"
    );

    let mut session = PuzzleSession::new(config.clone());
    session.load(puzzle.clone())?;
    print_intro(&puzzle)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let waiting = session.reply_pending();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Flow::Quit = handle_command(&mut session, &puzzle, &config, line.trim())? {
                    break;
                }
            }
            reply = session.next_reply(), if waiting => {
                match reply {
                    Ok(ReplyOutcome::Applied { record, solved }) => {
                        println!("Opponent plays {}.", record.san);
                        if solved {
                            println!("Puzzle complete.");
                            break;
                        }
                    }
                    Ok(ReplyOutcome::Stale) => {}
                    Err(e @ EngineError::CorruptSolution { .. }) => {
                        error!("{e}");
                        println!("This puzzle's solution is broken and cannot be finished.");
                        break;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Ok(())
}
