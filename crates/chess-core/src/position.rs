//! Board coordinate representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (row, column) coordinate on the 8x8 board, both 1-based.
///
/// Row 1 is White's back row and row 8 is Black's; column 1 is the a-file.
/// A `Position` may be constructed off the board (as a caller-supplied move
/// destination can be); use [`Position::is_on_board`] or [`Position::try_new`]
/// where that matters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    row: u8,
    column: u8,
}

impl Position {
    /// Creates a position without bounds checking.
    #[inline]
    pub const fn new(row: u8, column: u8) -> Self {
        Position { row, column }
    }

    /// Creates a position, returning `None` if it lies off the board.
    #[inline]
    pub const fn try_new(row: u8, column: u8) -> Option<Self> {
        let pos = Position { row, column };
        if pos.is_on_board() {
            Some(pos)
        } else {
            None
        }
    }

    /// Returns the row (1-8 when on the board).
    #[inline]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Returns the column (1-8 when on the board).
    #[inline]
    pub const fn column(self) -> u8 {
        self.column
    }

    /// Returns true if both coordinates lie in 1..=8.
    #[inline]
    pub const fn is_on_board(self) -> bool {
        self.row >= 1 && self.row <= 8 && self.column >= 1 && self.column <= 8
    }

    /// Returns the position shifted by the given deltas, or `None` if the
    /// result would leave the board.
    #[inline]
    pub const fn offset(self, d_row: i8, d_column: i8) -> Option<Self> {
        let row = self.row as i16 + d_row as i16;
        let column = self.column as i16 + d_column as i16;
        if row < 1 || row > 8 || column < 1 || column > 8 {
            return None;
        }
        Some(Position {
            row: row as u8,
            column: column as u8,
        })
    }

    /// Parses a position from algebraic notation (e.g., "e4" is row 4, column 5).
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if file < b'a' || file > b'h' || rank < b'1' || rank > b'8' {
            return None;
        }
        Some(Position {
            row: rank - b'0',
            column: file - b'a' + 1,
        })
    }

    /// Returns the algebraic notation for this position, or `None` off the board.
    pub fn to_algebraic(self) -> Option<String> {
        if !self.is_on_board() {
            return None;
        }
        let file = (b'a' + self.column - 1) as char;
        Some(format!("{}{}", file, self.row))
    }

    /// Iterates over every on-board position, row 1 first, column 1 first.
    pub fn all() -> impl Iterator<Item = Position> {
        (1..=8u8).flat_map(|row| (1..=8u8).map(move |column| Position { row, column }))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_algebraic() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "({},{})", self.row, self.column),
        }
    }
}
