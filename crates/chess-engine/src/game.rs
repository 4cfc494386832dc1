//! Game state: the board plus the side to move.
//!
//! [`Game`] is the only component that enforces full chess legality. It
//! delegates candidate generation to [`movegen`](crate::movegen), filters out
//! moves that expose the mover's king, and answers the check, checkmate, and
//! stalemate queries.

use crate::movegen::{is_king_attacked, legal_moves};
use crate::{Board, GameStatus, MoveList};
use chess_core::{Color, FenError, FenParser, Move, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Why [`Game::make_move`] rejected a move.
///
/// A rejected move never modifies the game; the caller should report the
/// reason and ask for another move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMoveError {
    /// There is no piece on the source square.
    #[error("illegal move: no piece at {0}")]
    NoPiece(Position),
    /// The piece on the source square belongs to the side not on move.
    #[error("illegal move: not your turn ({turn} to move)")]
    NotYourTurn { turn: Color },
    /// The destination lies off the board.
    #[error("illegal move: {0} is off the board")]
    OffBoard(Position),
    /// The piece cannot make this move, or it would leave its king in check.
    #[error("illegal move: {0}")]
    Illegal(Move),
}

/// A chess match in progress.
///
/// Serializes to `{"turn": ..., "board": ...}` and deserializes back without
/// loss, so callers can persist it as an opaque blob between moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    turn: Color,
    board: Board,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game: standard starting position, White to move.
    pub fn new() -> Self {
        Game {
            turn: Color::White,
            board: Board::startpos(),
        }
    }

    /// Creates a game from an arbitrary board and side to move.
    ///
    /// The caller guarantees at most one king per color. With two, check
    /// detection only looks at the first one found in row-major order.
    /// [`Game::from_fen`] rejects such placements.
    pub fn from_board(board: Board, turn: Color) -> Self {
        Game { turn, board }
    }

    /// Creates a game from a FEN string (placement and side to move).
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = FenParser::parse(fen)?;
        Ok(Game {
            turn: parsed.active_color,
            board: Board::from_parsed(&parsed),
        })
    }

    /// Returns the placement and side to move in two-field FEN form.
    pub fn to_fen(&self) -> String {
        let color = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!("{} {}", self.board.to_fen(), color)
    }

    /// Returns the side to move.
    pub fn team_turn(&self) -> Color {
        self.turn
    }

    /// Sets the side to move.
    pub fn set_team_turn(&mut self, color: Color) {
        self.turn = color;
    }

    /// Returns a read view of the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replaces the board.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    /// Returns the legal moves of the piece on `position`, whichever color it
    /// is. An empty square has no moves.
    pub fn valid_moves(&self, position: Position) -> MoveList {
        legal_moves(&self.board, position)
    }

    /// Returns every legal move available to `color`.
    pub fn all_valid_moves(&self, color: Color) -> Vec<Move> {
        self.board
            .pieces_of(color)
            .flat_map(|(from, _)| self.valid_moves(from).as_slice().to_vec())
            .collect()
    }

    fn has_any_valid_move(&self, color: Color) -> bool {
        self.board
            .pieces_of(color)
            .any(|(from, _)| !self.valid_moves(from).is_empty())
    }

    /// Plays a move for the side to move.
    ///
    /// On success the piece is moved (or replaced by its promotion), any
    /// captured piece disappears, and the turn passes to the other color. On
    /// failure nothing changes.
    pub fn make_move(&mut self, m: Move) -> Result<(), IllegalMoveError> {
        if let Err(e) = self.check_move(m) {
            debug!(%m, error = %e, "move rejected");
            return Err(e);
        }

        self.board.apply_move(m);
        self.turn = self.turn.opposite();
        debug!(%m, turn = %self.turn, "move applied");
        Ok(())
    }

    fn check_move(&self, m: Move) -> Result<(), IllegalMoveError> {
        let piece = self
            .board
            .piece_at(m.from)
            .ok_or(IllegalMoveError::NoPiece(m.from))?;
        if piece.color != self.turn {
            return Err(IllegalMoveError::NotYourTurn { turn: self.turn });
        }
        if !m.to.is_on_board() {
            return Err(IllegalMoveError::OffBoard(m.to));
        }
        if !self.valid_moves(m.from).contains(&m) {
            return Err(IllegalMoveError::Illegal(m));
        }
        Ok(())
    }

    /// Returns true if `color`'s king is attacked by an enemy piece. A side
    /// without a king is never in check.
    pub fn is_in_check(&self, color: Color) -> bool {
        is_king_attacked(&self.board, color)
    }

    /// Returns true if `color` is in check and has no legal move.
    pub fn is_in_checkmate(&self, color: Color) -> bool {
        if self.board.king_position(color).is_none() || !self.is_in_check(color) {
            return false;
        }
        !self.has_any_valid_move(color)
    }

    /// Returns true if `color` is not in check but has no legal move.
    pub fn is_in_stalemate(&self, color: Color) -> bool {
        if self.board.king_position(color).is_none() || self.is_in_check(color) {
            return false;
        }
        !self.has_any_valid_move(color)
    }

    /// Classifies the position for the side to move.
    ///
    /// Checkmate is tested before plain check, and stalemate last.
    pub fn status(&self) -> GameStatus {
        let side = self.turn;
        if self.is_in_checkmate(side) {
            GameStatus::Checkmate {
                winner: side.opposite(),
            }
        } else if self.is_in_check(side) {
            GameStatus::Check(side)
        } else if self.is_in_stalemate(side) {
            GameStatus::Stalemate
        } else {
            GameStatus::InProgress
        }
    }
}
