use std::fmt;
use std::str::FromStr;

use chess_core::Color;
use chess_engine::{Game, GameStatus};
use serde::{Deserialize, Serialize};

/// Identifier of a persisted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MatchId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(MatchId)
    }
}

/// Everything persisted for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub name: String,
    pub game: Game,
    /// Set on checkmate, stalemate or resignation. No further moves are
    /// accepted once true.
    pub over: bool,
    /// Player seated as White, if any.
    #[serde(default)]
    pub white: Option<String>,
    /// Player seated as Black, if any.
    #[serde(default)]
    pub black: Option<String>,
    /// Side that resigned, if the match ended that way.
    #[serde(default)]
    pub resigned: Option<Color>,
}

impl MatchRecord {
    pub fn new(id: MatchId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            game: Game::new(),
            over: false,
            white: None,
            black: None,
            resigned: None,
        }
    }

    /// The player holding `color`'s seat.
    pub fn seat(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white.as_deref(),
            Color::Black => self.black.as_deref(),
        }
    }

    pub(crate) fn seat_mut(&mut self, color: Color) -> &mut Option<String> {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// The color `player` plays. A player holding both seats plays the side
    /// to move.
    pub fn color_of(&self, player: &str) -> Option<Color> {
        let turn = self.game.team_turn();
        [turn, turn.opposite()]
            .into_iter()
            .find(|&color| self.seat(color) == Some(player))
    }

    /// The winner of a finished match: the checkmating side or the opponent
    /// of the side that resigned. `None` while in progress or on stalemate.
    pub fn winner(&self) -> Option<Color> {
        if let Some(loser) = self.resigned {
            return Some(loser.opposite());
        }
        match self.game.status() {
            GameStatus::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }

    pub(crate) fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub(crate) fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }
}

/// Notification for the opponent after an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    /// Nothing to report; play continues.
    Continue,
    /// The given side is in check.
    Check(Color),
    /// The opponent has no legal move while in check. Ends the match.
    Checkmate { winner: Color },
    /// The opponent has no legal move and is not in check. Ends the match.
    Stalemate,
}

impl MoveOutcome {
    pub fn ends_match(&self) -> bool {
        matches!(self, MoveOutcome::Checkmate { .. } | MoveOutcome::Stalemate)
    }
}
