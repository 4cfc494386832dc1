//! Core types for chess.
//!
//! This crate provides the value types shared by the rules engine and the
//! services built on top of it:
//! - [`Piece`], [`PieceKind`] and [`Color`] for piece representation
//! - [`Position`] for 1-based (row, column) board coordinates
//! - [`Move`] for move representation, including pawn promotion
//! - FEN piece-placement parsing
//!
//! Every type here is an immutable value with equality by value and a serde
//! representation, so it can travel inside a persisted game blob.

mod color;
mod fen;
mod mov;
mod piece;
mod position;

pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::Move;
pub use piece::{Piece, PieceKind};
pub use position::Position;
