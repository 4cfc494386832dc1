//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.
//! Castling and en passant are not generated, so reference counts only match
//! while neither could have occurred (depth 4 or less from the start).

use super::legal_moves;
use crate::{Board, Game};
use chess_core::{Color, Move};

fn side_moves(board: &Board, side: Color) -> Vec<Move> {
    board
        .pieces_of(side)
        .flat_map(|(from, _)| legal_moves(board, from).as_slice().to_vec())
        .collect()
}

fn perft_board(board: &Board, side: Color, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = side_moves(board, side);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in moves {
        let mut next = board.clone();
        next.apply_move(m);
        nodes += perft_board(&next, side.opposite(), depth - 1);
    }
    nodes
}

/// Counts the number of leaf nodes at the given depth.
pub fn perft(game: &Game, depth: u32) -> u64 {
    perft_board(game.board(), game.team_turn(), depth)
}

/// Perft with divide - shows node count for each move at depth-1.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(game: &Game, depth: u32) -> Vec<(String, u64)> {
    let board = game.board();
    let side = game.team_turn();
    let moves = side_moves(board, side);
    let mut results = Vec::with_capacity(moves.len());

    for m in moves {
        let mut next = board.clone();
        next.apply_move(m);
        let nodes = if depth > 1 {
            perft_board(&next, side.opposite(), depth - 1)
        } else {
            1
        };
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    // Starting position perft values (well-known and verified)
    #[test]
    fn perft_startpos_depth_1() {
        assert_eq!(perft(&Game::new(), 1), 20);
    }

    #[test]
    fn perft_startpos_depth_2() {
        assert_eq!(perft(&Game::new(), 2), 400);
    }

    #[test]
    fn perft_startpos_depth_3() {
        assert_eq!(perft(&Game::new(), 3), 8902);
    }

    // Slow without optimizations
    #[test]
    #[ignore]
    fn perft_startpos_depth_4() {
        assert_eq!(perft(&Game::new(), 4), 197281);
    }

    // Position 3: check evasion and promotion, no castling rights
    // 8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w
    #[test]
    fn perft_position3_depth_1() {
        let game = Game::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w").unwrap();
        assert_eq!(perft(&game, 1), 14);
    }

    #[test]
    fn perft_position3_depth_2() {
        let game = Game::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w").unwrap();
        assert_eq!(perft(&game, 2), 191);
    }

    // Position 4: white in check, evasions only
    #[test]
    fn perft_position4_depth_1() {
        let game =
            Game::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")
                .unwrap();
        assert_eq!(perft(&game, 1), 6);
    }

    #[test]
    fn perft_divide_works() {
        let results = perft_divide(&Game::new(), 1);
        assert_eq!(results.len(), 20);
        // Total should equal perft(1)
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn perft_does_not_touch_the_game() {
        let game = Game::new();
        let before = game.clone();
        perft(&game, 2);
        assert_eq!(game, before);
    }
}
