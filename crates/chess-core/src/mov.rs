//! Move representation.

use crate::{PieceKind, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chess move: source, destination, and the promotion kind if a pawn
/// reaches the far row.
///
/// Equality covers all three fields, so the four promotions of one pawn push
/// are four distinct moves.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a new move.
    #[inline]
    pub const fn new(from: Position, to: Position, promotion: Option<PieceKind>) -> Self {
        Move {
            from,
            to,
            promotion,
        }
    }

    /// Creates a move without promotion.
    #[inline]
    pub const fn normal(from: Position, to: Position) -> Self {
        Self::new(from, to, None)
    }

    /// Creates a promoting move.
    #[inline]
    pub const fn promoting(from: Position, to: Position, kind: PieceKind) -> Self {
        Self::new(from, to, Some(kind))
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        let promo = self.promotion.map(PieceKind::to_char);
        match promo {
            Some(c) => format!("{}{}{}", self.from, self.to, c),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parses a move from UCI notation.
    ///
    /// Only the syntax is checked here; whether the move is legal is decided
    /// by the engine against a board.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Position::from_algebraic(&s[0..2])?;
        let to = Position::from_algebraic(&s[2..4])?;
        let promotion = match s.chars().nth(4) {
            Some(c) => {
                let kind = PieceKind::from_char(c)?;
                if !kind.is_promotion_target() {
                    return None;
                }
                Some(kind)
            }
            None => None,
        };
        Some(Move::new(from, to, promotion))
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
