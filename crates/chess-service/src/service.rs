use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chess_core::{Color, Move, Position};
use chess_engine::MoveList;
use tracing::{debug, info};

use crate::{GameStore, MatchId, MatchRecord, MoveOutcome, ServiceError};

/// Runs matches stored in `S`.
///
/// Every operation that writes a match holds that match's lock from load to
/// save, so two moves on the same match never interleave. Different matches
/// proceed in parallel. A lock lives in the map only while some call holds
/// or waits on it.
pub struct MatchService<S> {
    store: S,
    locks: Mutex<HashMap<MatchId, Arc<Mutex<()>>>>,
}

impl<S: GameStore> MatchService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates and persists a new match in the standard starting position
    /// with both seats empty.
    pub fn create_match(&self, name: &str) -> Result<MatchRecord, ServiceError> {
        let id = self.store.next_id()?;
        let record = MatchRecord::new(id, name);
        self.store.save(id, &record.to_blob()?)?;
        info!(%id, name, "created match");
        Ok(record)
    }

    pub fn load(&self, id: MatchId) -> Result<MatchRecord, ServiceError> {
        let blob = self
            .store
            .load(id)?
            .ok_or(ServiceError::MatchNotFound(id))?;
        Ok(MatchRecord::from_blob(&blob)?)
    }

    /// All stored matches in id order.
    pub fn list(&self) -> Result<Vec<MatchRecord>, ServiceError> {
        self.store
            .list()?
            .into_iter()
            .map(|id| self.load(id))
            .collect()
    }

    /// Legal moves of the piece at `position`, empty if there is none.
    pub fn valid_moves(&self, id: MatchId, position: Position) -> Result<MoveList, ServiceError> {
        Ok(self.load(id)?.game.valid_moves(position))
    }

    /// Seats `player` as `color`. Fails if another player holds that seat.
    /// One player may hold both seats.
    pub fn join(&self, id: MatchId, color: Color, player: &str) -> Result<MatchRecord, ServiceError> {
        self.with_match_lock(id, || {
            let mut record = self.load(id)?;
            match record.seat(color).map(str::to_string) {
                Some(holder) if holder == player => return Ok(record),
                Some(holder) => {
                    debug!(%id, %color, player, %holder, "seat already taken");
                    return Err(ServiceError::SeatTaken { color, holder });
                }
                None => {}
            }
            *record.seat_mut(color) = Some(player.to_string());
            self.store.save(id, &record.to_blob()?)?;
            info!(%id, %color, player, "player joined");
            Ok(record)
        })
    }

    /// Vacates every seat `player` holds in the match.
    pub fn leave(&self, id: MatchId, player: &str) -> Result<MatchRecord, ServiceError> {
        self.with_match_lock(id, || {
            let mut record = self.load(id)?;
            let mut left = false;
            for color in Color::ALL {
                let seat = record.seat_mut(color);
                if seat.as_deref() == Some(player) {
                    *seat = None;
                    left = true;
                }
            }
            if !left {
                return Err(ServiceError::NotSeated {
                    player: player.to_string(),
                });
            }
            self.store.save(id, &record.to_blob()?)?;
            info!(%id, player, "player left");
            Ok(record)
        })
    }

    /// Plays `m` for the seated `player`.
    ///
    /// The match must exist, not be over, and have `player` seated as the
    /// side to move. On success the updated match is persisted and the
    /// notification for the opponent returned; on any error nothing is
    /// written.
    pub fn make_move(&self, id: MatchId, player: &str, m: Move) -> Result<MoveOutcome, ServiceError> {
        self.with_match_lock(id, || {
            let mut record = self.load(id)?;
            if record.over {
                return Err(ServiceError::GameOver(id));
            }
            let color = seated_color(&record, player)?;
            let turn = record.game.team_turn();
            if color != turn {
                debug!(%id, player, %turn, "move out of turn");
                return Err(ServiceError::NotYourTurn { turn });
            }

            record.game.make_move(m)?;

            let opponent = color.opposite();
            let outcome = if record.game.is_in_checkmate(opponent) {
                MoveOutcome::Checkmate { winner: color }
            } else if record.game.is_in_check(opponent) {
                MoveOutcome::Check(opponent)
            } else if record.game.is_in_stalemate(opponent) {
                MoveOutcome::Stalemate
            } else {
                MoveOutcome::Continue
            };
            record.over = outcome.ends_match();

            self.store.save(id, &record.to_blob()?)?;
            if record.over {
                info!(%id, ?outcome, "match finished");
            } else {
                debug!(%id, player, %m, ?outcome, "move played");
            }
            Ok(outcome)
        })
    }

    /// Ends the match with the seated `player` resigning.
    pub fn resign(&self, id: MatchId, player: &str) -> Result<MatchRecord, ServiceError> {
        self.with_match_lock(id, || {
            let mut record = self.load(id)?;
            if record.over {
                return Err(ServiceError::GameOver(id));
            }
            let color = seated_color(&record, player)?;
            record.over = true;
            record.resigned = Some(color);
            self.store.save(id, &record.to_blob()?)?;
            info!(%id, player, %color, "player resigned");
            Ok(record)
        })
    }

    /// Runs `f` holding the lock of match `id`, then drops the lock from the
    /// map unless another call still holds a handle to it.
    fn with_match_lock<T>(
        &self,
        id: MatchId,
        f: impl FnOnce() -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id).or_default())
        };
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        // Handles are only cloned under the map lock, so a count of two (map
        // and ours) means no other call can be waiting on this lock.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let ours = locks.get(&id).map_or(false, |held| Arc::ptr_eq(held, &lock));
        if ours && Arc::strong_count(&lock) == 2 {
            locks.remove(&id);
        }
        result
    }
}

fn seated_color(record: &MatchRecord, player: &str) -> Result<Color, ServiceError> {
    record.color_of(player).ok_or_else(|| {
        debug!(id = %record.id, player, "move from unseated player");
        ServiceError::NotSeated {
            player: player.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileStore, MemoryStore};
    use chess_core::{Piece, PieceKind};
    use chess_engine::{Board, Game, IllegalMoveError};
    use std::thread;

    const WHITE: &str = "alice";
    const BLACK: &str = "bob";

    fn uci(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    fn sq(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    fn service() -> MatchService<MemoryStore> {
        MatchService::new(MemoryStore::new())
    }

    /// Creates a match with alice as White and bob as Black.
    fn seated(service: &MatchService<MemoryStore>) -> MatchId {
        let id = service.create_match("seated").unwrap().id;
        service.join(id, Color::White, WHITE).unwrap();
        service.join(id, Color::Black, BLACK).unwrap();
        id
    }

    /// Stores `game` as a fresh seated match and returns its id.
    fn seed(service: &MatchService<MemoryStore>, game: Game) -> MatchId {
        let id = seated(service);
        let mut record = service.load(id).unwrap();
        record.game = game;
        service
            .store()
            .save(record.id, &record.to_blob().unwrap())
            .unwrap();
        id
    }

    fn lock_entries<S: GameStore>(service: &MatchService<S>) -> usize {
        service.locks.lock().unwrap().len()
    }

    #[test]
    fn test_create_and_load() {
        let service = service();
        let record = service.create_match("first").unwrap();
        let loaded = service.load(record.id).unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.game, Game::new());
        assert!(!loaded.over);
        assert_eq!(loaded.white, None);
        assert_eq!(loaded.black, None);
    }

    #[test]
    fn test_unknown_match() {
        let service = service();
        assert!(matches!(
            service.load(MatchId(99)),
            Err(ServiceError::MatchNotFound(MatchId(99)))
        ));
        assert!(matches!(
            service.make_move(MatchId(99), WHITE, uci("e2e4")),
            Err(ServiceError::MatchNotFound(_))
        ));
        assert!(matches!(
            service.join(MatchId(99), Color::White, WHITE),
            Err(ServiceError::MatchNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_matches_leave_no_locks_behind() {
        let service = service();
        for i in 0..500 {
            let id = MatchId(1000 + i);
            assert!(service.make_move(id, WHITE, uci("e2e4")).is_err());
            assert!(service.resign(id, WHITE).is_err());
        }
        assert_eq!(lock_entries(&service), 0);
    }

    #[test]
    fn test_locks_are_released_after_each_call() {
        let service = service();
        let id = seated(&service);
        service.make_move(id, WHITE, uci("e2e4")).unwrap();
        service.resign(id, BLACK).unwrap();
        assert_eq!(lock_entries(&service), 0);
    }

    #[test]
    fn test_join_seats_players() {
        let service = service();
        let id = seated(&service);
        let record = service.load(id).unwrap();
        assert_eq!(record.seat(Color::White), Some(WHITE));
        assert_eq!(record.seat(Color::Black), Some(BLACK));
    }

    #[test]
    fn test_join_taken_seat_fails() {
        let service = service();
        let id = seated(&service);
        let before = service.store().load(id).unwrap();

        match service.join(id, Color::White, "carol") {
            Err(ServiceError::SeatTaken { color, holder }) => {
                assert_eq!(color, Color::White);
                assert_eq!(holder, WHITE);
            }
            other => panic!("expected SeatTaken, got {:?}", other),
        }
        assert_eq!(service.store().load(id).unwrap(), before);

        // Rejoining your own seat is harmless
        assert!(service.join(id, Color::White, WHITE).is_ok());
    }

    #[test]
    fn test_leave_vacates_seat() {
        let service = service();
        let id = seated(&service);

        let record = service.leave(id, WHITE).unwrap();
        assert_eq!(record.white, None);
        assert_eq!(record.black.as_deref(), Some(BLACK));

        assert!(matches!(
            service.leave(id, WHITE),
            Err(ServiceError::NotSeated { .. })
        ));
        assert!(service.join(id, Color::White, "carol").is_ok());
    }

    #[test]
    fn test_make_move_persists() {
        let service = service();
        let id = seated(&service);

        let outcome = service.make_move(id, WHITE, uci("e2e4")).unwrap();
        assert_eq!(outcome, MoveOutcome::Continue);

        let game = service.load(id).unwrap().game;
        assert_eq!(game.team_turn(), Color::Black);
        assert_eq!(
            game.board().piece_at(sq("e4")),
            Some(Piece::new(Color::White, PieceKind::Pawn))
        );
    }

    #[test]
    fn test_unseated_player_cannot_move() {
        let service = service();
        let id = seated(&service);
        let before = service.store().load(id).unwrap();

        match service.make_move(id, "carol", uci("e2e4")) {
            Err(ServiceError::NotSeated { player }) => assert_eq!(player, "carol"),
            other => panic!("expected NotSeated, got {:?}", other),
        }
        assert_eq!(service.store().load(id).unwrap(), before);
    }

    #[test]
    fn test_moves_need_a_seat_even_on_an_empty_match() {
        let service = service();
        let id = service.create_match("empty").unwrap().id;
        assert!(matches!(
            service.make_move(id, WHITE, uci("e2e4")),
            Err(ServiceError::NotSeated { .. })
        ));
    }

    #[test]
    fn test_wrong_player_is_rejected_without_writing() {
        let service = service();
        let id = seated(&service);
        let before = service.store().load(id).unwrap();

        let err = service.make_move(id, BLACK, uci("e7e5")).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotYourTurn { turn: Color::White }
        ));
        assert_eq!(service.store().load(id).unwrap(), before);
    }

    #[test]
    fn test_seated_player_cannot_move_opponent_pieces() {
        let service = service();
        let id = seated(&service);
        // White to move, but a White seat does not allow moving Black pieces
        let err = service.make_move(id, WHITE, uci("e7e5")).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::IllegalMove(IllegalMoveError::NotYourTurn { .. })
        ));
    }

    #[test]
    fn test_one_player_in_both_seats_plays_both_sides() {
        let service = service();
        let id = service.create_match("solo").unwrap().id;
        service.join(id, Color::White, WHITE).unwrap();
        service.join(id, Color::Black, WHITE).unwrap();

        service.make_move(id, WHITE, uci("e2e4")).unwrap();
        service.make_move(id, WHITE, uci("e7e5")).unwrap();
        assert_eq!(service.load(id).unwrap().game.team_turn(), Color::White);
    }

    #[test]
    fn test_illegal_move_is_rejected_without_writing() {
        let service = service();
        let id = seated(&service);
        let before = service.store().load(id).unwrap();

        let err = service.make_move(id, WHITE, uci("e2e5")).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::IllegalMove(IllegalMoveError::Illegal(_))
        ));
        assert_eq!(service.store().load(id).unwrap(), before);
    }

    #[test]
    fn test_check_is_reported() {
        let mut board = Board::empty();
        board.set_piece(sq("e1"), Some(Piece::new(Color::White, PieceKind::King)));
        board.set_piece(sq("a1"), Some(Piece::new(Color::White, PieceKind::Rook)));
        board.set_piece(sq("h8"), Some(Piece::new(Color::Black, PieceKind::King)));
        let service = service();
        let id = seed(&service, Game::from_board(board, Color::White));

        let outcome = service.make_move(id, WHITE, uci("a1a8")).unwrap();
        assert_eq!(outcome, MoveOutcome::Check(Color::Black));
        assert!(!service.load(id).unwrap().over);
    }

    #[test]
    fn test_checkmate_ends_match() {
        // Back-rank mate: Ra1-a8 against a king boxed in by its own pawns
        let mut board = Board::empty();
        board.set_piece(sq("e1"), Some(Piece::new(Color::White, PieceKind::King)));
        board.set_piece(sq("a1"), Some(Piece::new(Color::White, PieceKind::Rook)));
        board.set_piece(sq("g8"), Some(Piece::new(Color::Black, PieceKind::King)));
        for s in ["f7", "g7", "h7"] {
            board.set_piece(sq(s), Some(Piece::new(Color::Black, PieceKind::Pawn)));
        }
        let service = service();
        let id = seed(&service, Game::from_board(board, Color::White));

        let outcome = service.make_move(id, WHITE, uci("a1a8")).unwrap();
        assert_eq!(outcome, MoveOutcome::Checkmate { winner: Color::White });
        let record = service.load(id).unwrap();
        assert!(record.over);
        assert_eq!(record.winner(), Some(Color::White));

        let err = service.make_move(id, BLACK, uci("g8h8")).unwrap_err();
        assert!(matches!(err, ServiceError::GameOver(_)));
    }

    #[test]
    fn test_stalemate_ends_match() {
        let mut board = Board::empty();
        board.set_piece(sq("h8"), Some(Piece::new(Color::Black, PieceKind::King)));
        board.set_piece(sq("f6"), Some(Piece::new(Color::White, PieceKind::Queen)));
        board.set_piece(sq("g6"), Some(Piece::new(Color::White, PieceKind::King)));
        let service = service();
        let id = seed(&service, Game::from_board(board, Color::White));

        let outcome = service.make_move(id, WHITE, uci("f6f7")).unwrap();
        assert_eq!(outcome, MoveOutcome::Stalemate);
        let record = service.load(id).unwrap();
        assert!(record.over);
        assert_eq!(record.winner(), None);
    }

    #[test]
    fn test_resign_records_the_loser() {
        let service = service();
        let id = seated(&service);

        let record = service.resign(id, BLACK).unwrap();
        assert!(record.over);
        assert_eq!(record.resigned, Some(Color::Black));

        let stored = service.load(id).unwrap();
        assert_eq!(stored.resigned, Some(Color::Black));
        assert_eq!(stored.winner(), Some(Color::White));

        assert!(matches!(
            service.resign(id, WHITE),
            Err(ServiceError::GameOver(_))
        ));
        assert!(matches!(
            service.make_move(id, WHITE, uci("e2e4")),
            Err(ServiceError::GameOver(_))
        ));
    }

    #[test]
    fn test_unseated_player_cannot_resign() {
        let service = service();
        let id = seated(&service);
        assert!(matches!(
            service.resign(id, "carol"),
            Err(ServiceError::NotSeated { .. })
        ));
        assert!(!service.load(id).unwrap().over);
    }

    #[test]
    fn test_valid_moves() {
        let service = service();
        let id = service.create_match("m").unwrap().id;
        assert_eq!(service.valid_moves(id, sq("g1")).unwrap().len(), 2);
        assert!(service.valid_moves(id, sq("e4")).unwrap().is_empty());
    }

    #[test]
    fn test_list_in_id_order() {
        let service = service();
        let a = service.create_match("a").unwrap();
        let b = service.create_match("b").unwrap();
        let names: Vec<String> = service.list().unwrap().into_iter().map(|r| r.name).collect();
        assert!(a.id < b.id);
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_same_move_raced_on_one_match() {
        let service = service();
        let id = seated(&service);

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| service.make_move(id, WHITE, uci("e2e4"))))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, 1);
        for r in results.iter().filter(|r| r.is_err()) {
            assert!(matches!(r, Err(ServiceError::NotYourTurn { .. })));
        }
        assert_eq!(service.load(id).unwrap().game.team_turn(), Color::Black);
        assert_eq!(lock_entries(&service), 0);
    }

    #[test]
    fn test_racing_joins_seat_exactly_one_player() {
        let service = service();
        let id = service.create_match("race").unwrap().id;
        let names: Vec<String> = (0..8).map(|i| format!("p{i}")).collect();

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = names
                .iter()
                .map(|name| {
                    let service = &service;
                    s.spawn(move || service.join(id, Color::White, name))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(service.load(id).unwrap().white.is_some());
    }

    #[test]
    fn test_matches_progress_in_parallel() {
        let service = service();
        let ids: Vec<MatchId> = (0..4).map(|_| seated(&service)).collect();

        thread::scope(|s| {
            for &id in &ids {
                let service = &service;
                s.spawn(move || {
                    for (player, m) in [
                        (WHITE, "e2e4"),
                        (BLACK, "e7e5"),
                        (WHITE, "g1f3"),
                        (BLACK, "b8c6"),
                    ] {
                        service.make_move(id, player, uci(m)).unwrap();
                    }
                });
            }
        });

        for id in ids {
            let game = service.load(id).unwrap().game;
            assert_eq!(game.team_turn(), Color::White);
            assert_eq!(
                game.to_fen(),
                "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w"
            );
        }
        assert_eq!(lock_entries(&service), 0);
    }

    #[test]
    fn test_file_backed_service_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let service = MatchService::new(FileStore::open(dir.path()).unwrap());
            let id = service.create_match("persistent").unwrap().id;
            service.join(id, Color::White, WHITE).unwrap();
            service.join(id, Color::Black, BLACK).unwrap();
            service.make_move(id, WHITE, uci("d2d4")).unwrap();
            id
        };

        let service = MatchService::new(FileStore::open(dir.path()).unwrap());
        let record = service.load(id).unwrap();
        assert_eq!(record.name, "persistent");
        assert_eq!(record.black.as_deref(), Some(BLACK));
        assert_eq!(record.game.team_turn(), Color::Black);
        assert_eq!(
            service.make_move(id, BLACK, uci("d7d5")).unwrap(),
            MoveOutcome::Continue
        );
    }
}
