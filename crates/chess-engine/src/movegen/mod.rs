//! Move generation.
//!
//! Moves are generated per piece. [`pseudo_legal_moves`] follows each kind's
//! movement pattern, blocking and capture rules; [`legal_moves`] additionally
//! drops every candidate that would leave the mover's own king attacked.

pub mod perft;

use crate::Board;
use chess_core::{Color, Move, Piece, PieceKind, Position};

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 1),
    (1, -1),
    (1, 0),
    (-1, 1),
    (-1, -1),
    (-1, 0),
    (0, 1),
    (0, -1),
];

/// A list of moves for a single piece with a fixed maximum capacity.
///
/// A queen in the middle of an open board has 27 moves, the most any one
/// piece can have, so a fixed-size array avoids heap allocations.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves a single piece can have.
    pub const MAX_MOVES: usize = 32;

    const FILLER: Move = Move::normal(Position::new(0, 0), Position::new(0, 0));

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Self::FILLER; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Returns true if the list holds the given move.
    #[inline]
    pub fn contains(&self, m: &Move) -> bool {
        self.as_slice().contains(m)
    }

    /// Iterates over the moves.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for MoveList {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for MoveList {}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates the pseudo-legal moves of the piece standing on `from`.
///
/// Pseudo-legal moves respect movement patterns, blocking, and capture rules
/// but may leave the mover's king in check. An empty square yields no moves.
pub fn pseudo_legal_moves(board: &Board, from: Position) -> MoveList {
    let mut moves = MoveList::new();
    let Some(piece) = board.piece_at(from) else {
        return moves;
    };

    match piece.kind {
        PieceKind::Rook => generate_slider_moves(board, from, piece, &ORTHOGONAL, &mut moves),
        PieceKind::Bishop => generate_slider_moves(board, from, piece, &DIAGONAL, &mut moves),
        PieceKind::Queen => {
            generate_slider_moves(board, from, piece, &ORTHOGONAL, &mut moves);
            generate_slider_moves(board, from, piece, &DIAGONAL, &mut moves);
        }
        PieceKind::Knight => generate_step_moves(board, from, piece, &KNIGHT_OFFSETS, &mut moves),
        PieceKind::King => generate_step_moves(board, from, piece, &KING_OFFSETS, &mut moves),
        PieceKind::Pawn => generate_pawn_moves(board, from, piece.color, &mut moves),
    }

    moves
}

/// Generates the legal moves of the piece standing on `from`: its
/// pseudo-legal moves minus those that leave its own king in check.
pub fn legal_moves(board: &Board, from: Position) -> MoveList {
    let mut moves = pseudo_legal_moves(board, from);
    moves.retain(|m| !leaves_king_in_check(board, *m));
    moves
}

/// Returns true if playing `m` would leave the mover's king attacked.
///
/// The move is tried on a clone; `board` itself is never modified.
pub fn leaves_king_in_check(board: &Board, m: Move) -> bool {
    let Some(mover) = board.piece_at(m.from) else {
        return false;
    };
    let mut trial = board.clone();
    trial.apply_move(m);
    is_king_attacked(&trial, mover.color)
}

/// Returns true if any piece of the opposite color has a pseudo-legal move
/// onto `color`'s king. A missing king is never attacked.
pub fn is_king_attacked(board: &Board, color: Color) -> bool {
    let Some(king) = board.king_position(color) else {
        return false;
    };
    board.pieces_of(color.opposite()).any(|(from, _)| {
        pseudo_legal_moves(board, from)
            .iter()
            .any(|m| m.to == king)
    })
}

/// Walks each ray until it leaves the board or hits a piece; an enemy piece
/// is captured, a friendly one blocks.
fn generate_slider_moves(
    board: &Board,
    from: Position,
    piece: Piece,
    directions: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for &(d_row, d_column) in directions {
        let mut current = from;
        while let Some(to) = current.offset(d_row, d_column) {
            match board.piece_at(to) {
                None => moves.push(Move::normal(from, to)),
                Some(other) => {
                    if other.color != piece.color {
                        moves.push(Move::normal(from, to));
                    }
                    break;
                }
            }
            current = to;
        }
    }
}

fn generate_step_moves(
    board: &Board,
    from: Position,
    piece: Piece,
    offsets: &[(i8, i8)],
    moves: &mut MoveList,
) {
    for &(d_row, d_column) in offsets {
        let Some(to) = from.offset(d_row, d_column) else {
            continue;
        };
        match board.piece_at(to) {
            Some(other) if other.color == piece.color => {}
            _ => moves.push(Move::normal(from, to)),
        }
    }
}

fn generate_pawn_moves(board: &Board, from: Position, color: Color, moves: &mut MoveList) {
    let dir = color.pawn_direction();

    // Pushes
    if let Some(one) = from.offset(dir, 0) {
        if board.is_empty_at(one) {
            push_pawn_move(from, one, color, moves);

            if from.row() == color.pawn_start_row() {
                if let Some(two) = one.offset(dir, 0) {
                    if board.is_empty_at(two) {
                        moves.push(Move::normal(from, two));
                    }
                }
            }
        }
    }

    // Captures
    for d_column in [-1, 1] {
        let Some(to) = from.offset(dir, d_column) else {
            continue;
        };
        if matches!(board.piece_at(to), Some(other) if other.color != color) {
            push_pawn_move(from, to, color, moves);
        }
    }
}

/// Pushes a pawn move, expanded into one move per promotion kind when it
/// lands on the far row.
fn push_pawn_move(from: Position, to: Position, color: Color, moves: &mut MoveList) {
    if to.row() == color.promotion_row() {
        for kind in PieceKind::PROMOTIONS {
            moves.push(Move::promoting(from, to, kind));
        }
    } else {
        moves.push(Move::normal(from, to));
    }
}
