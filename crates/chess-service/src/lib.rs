//! Match lifecycle on top of [`chess_engine::Game`].
//!
//! A match is a [`Game`](chess_engine::Game) with an id, a name, a seat per
//! color and an "over" flag, persisted as a JSON blob through a
//! [`GameStore`]. The [`MatchService`] seats players, only lets the player
//! seated as the side to move play, applies moves through the engine, and
//! reports check, checkmate and stalemate as a [`MoveOutcome`].
//!
//! ```
//! use chess_core::{Color, Move};
//! use chess_service::{MatchService, MemoryStore, MoveOutcome, ServiceError};
//!
//! let service = MatchService::new(MemoryStore::new());
//! let id = service.create_match("casual").unwrap().id;
//! service.join(id, Color::White, "alice").unwrap();
//! service.join(id, Color::Black, "bob").unwrap();
//!
//! let outcome = service
//!     .make_move(id, "alice", Move::from_uci("e2e4").unwrap())
//!     .unwrap();
//! assert_eq!(outcome, MoveOutcome::Continue);
//!
//! // Only seated players may move
//! let err = service.make_move(id, "carol", Move::from_uci("e7e5").unwrap());
//! assert!(matches!(err, Err(ServiceError::NotSeated { .. })));
//! ```

mod error;
mod record;
mod service;
mod store;

pub use error::ServiceError;
pub use record::{MatchId, MatchRecord, MoveOutcome};
pub use service::MatchService;
pub use store::{FileStore, GameStore, MemoryStore};
