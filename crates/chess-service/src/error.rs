use chess_core::Color;
use chess_engine::IllegalMoveError;
use thiserror::Error;

use crate::MatchId;

/// Errors surfaced by [`MatchService`](crate::MatchService) and the stores.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    #[error("match {0} is already over")]
    GameOver(MatchId),
    #[error("it is {turn}'s turn")]
    NotYourTurn { turn: Color },
    #[error("{color} is already taken by {holder}")]
    SeatTaken { color: Color, holder: String },
    #[error("{player} is not seated in this match")]
    NotSeated { player: String },
    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMoveError),
    #[error("failed to encode or decode match: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}
