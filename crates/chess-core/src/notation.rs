//! Move notation helpers for puzzle solutions.
//!
//! `normalize_san` is the one place where check and mate decorations are
//! dropped before solution plies are compared.

use std::sync::OnceLock;

use regex::Regex;

use crate::rules::MoveRecord;

fn uci_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-h][1-8][a-h][1-8][qrbn]?$").expect("valid UCI regex"))
}

fn move_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.+").expect("valid move number regex"))
}

/// Strip surrounding whitespace and trailing `+`/`#` from a SAN string.
pub fn normalize_san(san: &str) -> &str {
    san.trim().trim_end_matches(|c| c == '+' || c == '#')
}

/// True when a solution ply is written in coordinate form (`e2e4`, `e7e8q`).
pub fn is_uci(ply: &str) -> bool {
    uci_re().is_match(ply.trim())
}

/// Does an applied move satisfy the expected solution ply?
pub fn matches_ply(record: &MoveRecord, ply: &str) -> bool {
    if is_uci(ply) {
        record.uci == ply.trim()
    } else {
        normalize_san(&record.san) == normalize_san(ply)
    }
}

/// Split a written solution into plies.
///
/// Accepts plain space-separated moves (`"e2e4 e7e5"`) as well as numbered
/// lines (`"1. Rc8+ Kh7 2. Rh8#"`, `"1... Qh4#"`). Game results are dropped.
pub fn split_solution(text: &str) -> Vec<String> {
    let stripped = move_number_re().replace_all(text, " ");
    stripped
        .split_whitespace()
        .filter(|t| !matches!(*t, "1-0" | "0-1" | "1/2-1/2" | "*"))
        .map(str::to_string)
        .collect()
}

/// Format SAN plies as a numbered line. `white_first` tells whether the first
/// ply is White's.
pub fn format_line(sans: &[String], white_first: bool) -> String {
    let mut line = String::new();
    let mut number = 1;

    for (i, san) in sans.iter().enumerate() {
        let white_moves = white_first == (i % 2 == 0);
        if white_moves {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&format!("{number}. {san}"));
        } else if i == 0 {
            line.push_str(&format!("{number}... {san}"));
        } else {
            line.push_str(&format!(" {san}"));
        }
        if !white_moves {
            number += 1;
        }
    }

    line
}
