//! FEN (Forsyth-Edwards Notation) parsing for piece placement and side to move.
//!
//! The engine has no castling, en passant, or move clocks, so only the first
//! two FEN fields carry meaning. A full six-field FEN is still accepted; the
//! trailing fields are ignored.

use crate::{Color, Piece, PieceKind};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 2 or 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),
}

/// Parsed FEN data.
///
/// Holds the validated placement string and the side to move; the engine
/// turns the placement into a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenParser {
    /// Piece placement string (e.g., "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
    pub piece_placement: String,
    /// Side to move.
    pub active_color: Color,
}

impl FenParser {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 2 && parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let piece_placement = parts[0];
        Self::validate_piece_placement(piece_placement)?;

        let active_color = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        Ok(FenParser {
            piece_placement: piece_placement.to_string(),
            active_color,
        })
    }

    fn validate_piece_placement(placement: &str) -> Result<(), FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut kings = [0usize; 2];
        for (i, rank) in ranks.iter().enumerate() {
            let mut squares = 0;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    squares += skip;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if piece.kind == PieceKind::King {
                        let count = match piece.color {
                            Color::White => &mut kings[0],
                            Color::Black => &mut kings[1],
                        };
                        *count += 1;
                        if *count > 1 {
                            return Err(FenError::InvalidPiecePlacement(format!(
                                "more than one {} king",
                                piece.color
                            )));
                        }
                    }
                    squares += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        8 - i
                    )));
                }
            }
            if squares != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    8 - i,
                    squares
                )));
            }
        }

        Ok(())
    }

    /// Iterates over the placement as `(row, column, piece)` triples.
    pub fn pieces(&self) -> impl Iterator<Item = (u8, u8, Piece)> + '_ {
        self.piece_placement
            .split('/')
            .enumerate()
            .flat_map(|(rank_idx, rank_str)| {
                // FEN starts from row 8
                let row = 8 - rank_idx as u8;
                let mut column = 1u8;
                rank_str.chars().filter_map(move |c| {
                    if let Some(skip) = c.to_digit(10) {
                        column += skip as u8;
                        None
                    } else {
                        let piece = Piece::from_fen_char(c)?;
                        let at = column;
                        column += 1;
                        Some((row, at, piece))
                    }
                })
            })
    }

    /// Converts the parsed FEN back to its two-field form.
    pub fn to_fen(&self) -> String {
        let color = match self.active_color {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!("{} {}", self.piece_placement, color)
    }
}

impl Default for FenParser {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}
