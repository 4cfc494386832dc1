//! Position classification reported after each move.

use chess_core::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The state of the game from the point of view of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// The side to move has legal moves and is not in check.
    InProgress,
    /// The given color is in check but can still move.
    Check(Color),
    /// The side to move is checkmated; `winner` delivered the mate.
    Checkmate { winner: Color },
    /// The side to move is not in check but has no legal move.
    Stalemate,
}

impl GameStatus {
    /// Returns true for checkmate and stalemate.
    pub const fn is_over(self) -> bool {
        matches!(self, GameStatus::Checkmate { .. } | GameStatus::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Check(color) => write!(f, "{} is in check", color),
            GameStatus::Checkmate { winner } => {
                write!(f, "{} is in checkmate, {} wins", winner.opposite(), winner)
            }
            GameStatus::Stalemate => write!(f, "stalemate"),
        }
    }
}
