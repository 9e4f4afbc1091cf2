#![allow(dead_code)]

use chess_core::Puzzle;

/// Black king boxed in by its own pawns; `Ra8#` mates.
pub const BACK_RANK_FEN: &str = "6k1/5ppp/8/8/8/8/8/R6K w - - 0 1";

/// `Rc8+ Kh7 Rh8#`: the king's only reply is Kh7, then the rook mates on h8
/// under cover of the b2 bishop.
pub const LADDER_FEN: &str = "6k1/5p2/6p1/6K1/8/8/1B6/2R5 w - - 0 1";

/// Black to move; `Ra1#` mates against the pawn shield.
pub const BLACK_BACK_RANK_FEN: &str = "r5k1/8/8/8/8/8/5PPP/6K1 b - - 0 1";

/// White pawn on a7 ready to promote, with check on the a-file.
pub const PROMOTION_FEN: &str = "8/P7/8/8/8/8/k7/7K w - - 0 1";

pub fn puzzle(id: &str, fen: &str, line: &str) -> Puzzle {
    Puzzle::parse(id, fen, line)
}

pub fn back_rank_mate() -> Puzzle {
    puzzle("back-rank", BACK_RANK_FEN, "Ra8#")
}

pub fn rook_ladder() -> Puzzle {
    puzzle("ladder", LADDER_FEN, "1. Rc8+ Kh7 2. Rh8#")
}

pub fn black_back_rank_mate() -> Puzzle {
    puzzle("black-back-rank", BLACK_BACK_RANK_FEN, "1... Ra1#")
}
