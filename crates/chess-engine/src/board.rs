//! Chess board representation.

use chess_core::{Color, FenError, FenParser, Move, Piece, PieceKind, Position};
use serde::{Deserialize, Serialize};

/// Back row order from column 1 to column 8.
const BACK_ROW: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// An 8x8 grid of optional pieces, addressed 1-based by [`Position`].
///
/// `Board` is a plain value: `clone()` is a deep copy, so a clone can be
/// mutated to try a move without touching the original.
///
/// Placement methods and `Deserialize` do not enforce the one-king-per-color
/// invariant; [`Board::from_fen`] does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// `squares[row - 1][column - 1]`
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// Creates a board with no pieces.
    pub const fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Creates a board holding the standard starting position.
    pub fn startpos() -> Self {
        let mut board = Board::empty();
        board.reset();
        board
    }

    /// Clears the board and sets up the standard starting position.
    pub fn reset(&mut self) {
        *self = Board::empty();
        for color in Color::ALL {
            let back = color.back_row();
            let pawns = color.pawn_start_row();
            for (i, kind) in BACK_ROW.iter().enumerate() {
                let column = i as u8 + 1;
                self.set_piece(Position::new(back, column), Some(Piece::new(color, *kind)));
                self.set_piece(
                    Position::new(pawns, column),
                    Some(Piece::new(color, PieceKind::Pawn)),
                );
            }
        }
    }

    /// Creates a board from the placement field of a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = FenParser::parse(fen)?;
        Ok(Self::from_parsed(&parsed))
    }

    pub(crate) fn from_parsed(parsed: &FenParser) -> Self {
        let mut board = Board::empty();
        for (row, column, piece) in parsed.pieces() {
            board.set_piece(Position::new(row, column), Some(piece));
        }
        board
    }

    /// Returns the FEN piece-placement field for this board.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for row in (1..=8u8).rev() {
            let mut empty_count = 0;
            for column in 1..=8u8 {
                if let Some(piece) = self.piece_at(Position::new(row, column)) {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if row > 1 {
                fen.push('/');
            }
        }

        fen
    }

    #[inline]
    fn index(pos: Position) -> Option<(usize, usize)> {
        if pos.is_on_board() {
            Some((pos.row() as usize - 1, pos.column() as usize - 1))
        } else {
            None
        }
    }

    /// Returns the piece at the given position, if any.
    ///
    /// Off-board positions hold nothing.
    #[inline]
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        let (r, c) = Self::index(pos)?;
        self.squares[r][c]
    }

    /// Puts a piece on (or with `None`, clears) a square, overwriting
    /// whatever was there. Off-board positions are ignored.
    #[inline]
    pub fn set_piece(&mut self, pos: Position, piece: Option<Piece>) {
        if let Some((r, c)) = Self::index(pos) {
            self.squares[r][c] = piece;
        }
    }

    /// Removes and returns the piece at the given position.
    #[inline]
    pub fn remove_piece(&mut self, pos: Position) -> Option<Piece> {
        let (r, c) = Self::index(pos)?;
        self.squares[r][c].take()
    }

    /// Returns true if no piece stands on the position.
    #[inline]
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.piece_at(pos).is_none()
    }

    /// Iterates over every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.piece_at(pos).map(|piece| (pos, piece)))
    }

    /// Iterates over the squares occupied by the given color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    /// Returns the position of the given color's king, if it has one.
    pub fn king_position(&self, color: Color) -> Option<Position> {
        let king = Piece::new(color, PieceKind::King);
        self.pieces()
            .find(|(_, piece)| *piece == king)
            .map(|(pos, _)| pos)
    }

    /// Moves a piece as described by `m`, without any legality checks.
    ///
    /// The source square is emptied. The destination receives either a new
    /// piece of the promotion kind in the mover's color, or the moved piece
    /// itself; anything standing there is captured. Does nothing if the
    /// source square is empty.
    pub fn apply_move(&mut self, m: Move) {
        let Some(piece) = self.remove_piece(m.from) else {
            return;
        };
        let placed = match m.promotion {
            Some(kind) => Piece::new(piece.color, kind),
            None => piece,
        };
        self.set_piece(m.to, Some(placed));
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}
