//! Chess rules engine.
//!
//! This crate provides:
//! - [`Board`] - 8x8 mailbox board addressed by 1-based [`Position`](chess_core::Position)
//! - [`movegen`] - per-piece pseudo-legal and legal move generation
//! - [`Game`] - board plus side to move, move application, check, checkmate,
//!   and stalemate detection
//! - [`GameStatus`] - classification of a position after a move
//!
//! Castling, en passant, and draw rules other than stalemate are not part of
//! this engine.
//!
//! # Example
//!
//! ```
//! use chess_core::{Color, Move, Position};
//! use chess_engine::Game;
//!
//! let mut game = Game::new();
//! let e2 = Position::from_algebraic("e2").unwrap();
//! assert_eq!(game.valid_moves(e2).len(), 2);
//!
//! game.make_move(Move::from_uci("e2e4").unwrap()).unwrap();
//! assert_eq!(game.team_turn(), Color::Black);
//!
//! // Black may not move White's pieces
//! assert!(game.make_move(Move::from_uci("d2d4").unwrap()).is_err());
//! ```
//!
//! # Concurrency
//!
//! Every operation is synchronous and bounded by board occupancy. A `Game`
//! must not be mutated from two places at once; callers serialize access per
//! match. Legality checks only ever mutate private clones of the board.

mod board;
mod game;
pub mod movegen;
mod status;

pub use board::Board;
pub use game::{Game, IllegalMoveError};
pub use movegen::{is_king_attacked, legal_moves, pseudo_legal_moves, MoveList};
pub use status::GameStatus;
