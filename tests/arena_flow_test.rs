//! End-to-end tests for the arena over the in-memory store.

use std::sync::Arc;

use strictly_arena::{
    Arena, ArenaErrorKind, ArenaStore, DbError, GameId, GameInvariants, GameSession, GameStatus,
    InvariantSet, MemoryStore, MoveTransition, PlayerId, StatsFold, StatsUpdate,
};

fn arena() -> Arena {
    Arena::new(Arc::new(MemoryStore::new()))
}

/// Creates two players and an active game between them.
fn active_game(arena: &Arena, size: usize) -> (GameId, PlayerId, PlayerId) {
    let p1 = *arena.create_player("P1").expect("create p1").id();
    let p2 = *arena.create_player("P2").expect("create p2").id();
    let game = *arena.create_game(size).expect("create game").id();
    arena.join_game(game, p1).expect("join p1");
    arena.join_game(game, p2).expect("join p2");
    (game, p1, p2)
}

fn play(arena: &Arena, game: GameId, moves: &[(PlayerId, i64, i64)]) -> GameSession {
    let mut last = None;
    for (player, row, col) in moves {
        let outcome = arena
            .submit_move(game, *player, *row, *col)
            .unwrap_or_else(|e| panic!("move ({row}, {col}) rejected: {e}"));
        assert!(outcome.stats_failures().is_empty());
        last = Some(outcome.into_session());
    }
    last.expect("at least one move")
}

#[test]
fn test_first_player_wins_top_row() {
    let arena = arena();
    let (game, p1, p2) = active_game(&arena, 3);

    let snapshot = arena.get_game(game).expect("get");
    assert_eq!(*snapshot.status(), GameStatus::Active);
    assert_eq!(*snapshot.current_turn(), Some(p1));

    let session = play(
        &arena,
        game,
        &[(p1, 0, 0), (p2, 1, 0), (p1, 0, 1), (p2, 1, 1), (p1, 0, 2)],
    );
    assert_eq!(*session.status(), GameStatus::Completed);
    assert_eq!(*session.winner_id(), Some(p1));
    assert!(!*session.is_draw());

    let stats = arena.get_player_stats(p1).expect("stats");
    assert_eq!(*stats.games_played(), 1);
    assert_eq!(*stats.games_won(), 1);
    assert_eq!(*stats.win_rate(), 10_000);
    assert_eq!(*stats.efficiency(), Some(300));

    let loser = arena.get_player_stats(p2).expect("stats");
    assert_eq!(*loser.games_played(), 1);
    assert_eq!(*loser.games_won(), 0);
    assert_eq!(*loser.efficiency(), None);
}

#[test]
fn test_draw_counts_no_wins() {
    let arena = arena();
    let (game, p1, p2) = active_game(&arena, 3);

    let session = play(
        &arena,
        game,
        &[
            (p1, 0, 0),
            (p2, 0, 1),
            (p1, 0, 2),
            (p2, 1, 1),
            (p1, 1, 0),
            (p2, 2, 0),
            (p1, 2, 1),
            (p2, 2, 2),
            (p1, 1, 2),
        ],
    );
    assert_eq!(*session.status(), GameStatus::Completed);
    assert!(*session.is_draw());
    assert_eq!(*session.winner_id(), None);

    for player in [p1, p2] {
        let stats = arena.get_player_stats(player).expect("stats");
        assert_eq!(*stats.games_played(), 1);
        assert_eq!(*stats.games_won(), 0);
    }
    assert!(arena.top_players(3).expect("leaderboard").is_empty());
}

#[test]
fn test_second_seat_winner_efficiency_uses_own_moves() {
    let arena = arena();
    let (game, p1, p2) = active_game(&arena, 3);

    // p2 completes column 2 on move 6 after making three moves.
    let session = play(
        &arena,
        game,
        &[(p1, 0, 0), (p2, 0, 2), (p1, 1, 0), (p2, 1, 2), (p1, 2, 1), (p2, 2, 2)],
    );
    assert_eq!(*session.winner_id(), Some(p2));

    let stats = arena.get_player_stats(p2).expect("stats");
    assert_eq!(*stats.efficiency(), Some(300));
    assert_eq!(*stats.total_moves(), 3);
}

#[test]
fn test_move_numbers_are_contiguous() {
    let arena = arena();
    let (game, p1, p2) = active_game(&arena, 4);
    play(&arena, game, &[(p1, 0, 0), (p2, 3, 3), (p1, 2, 1), (p2, 1, 2)]);

    let numbers: Vec<u32> = arena
        .list_moves(game)
        .expect("moves")
        .iter()
        .map(|m| *m.move_number())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);

    let record = arena.game_record(game).expect("record");
    assert!(GameInvariants::check_all(&record).is_ok());
}

#[test]
fn test_turn_strictly_alternates() {
    let arena = arena();
    let (game, p1, p2) = active_game(&arena, 5);
    let script = [(p1, 0, 0), (p2, 0, 1), (p1, 0, 2), (p2, 0, 3), (p1, 1, 0)];

    for (index, (player, row, col)) in script.iter().enumerate() {
        let outcome = arena.submit_move(game, *player, *row, *col).expect("move");
        let expected = if index % 2 == 0 { p2 } else { p1 };
        assert_eq!(
            *outcome.transition(),
            MoveTransition::InProgress { next: expected }
        );
        assert_eq!(*outcome.session().current_turn(), Some(expected));
    }

    let err = arena.submit_move(game, p1, 4, 4).expect_err("p1 twice");
    assert_eq!(err.kind(), ArenaErrorKind::NotYourTurn);
}

#[test]
fn test_out_of_range_never_mutates() {
    let arena = arena();
    let (game, p1, _) = active_game(&arena, 3);

    let before = arena.game_record(game).expect("record");
    for (row, col) in [(-1, 0), (0, 3), (3, 3), (i64::MAX, 0), (0, i64::MIN)] {
        let err = arena.submit_move(game, p1, row, col).expect_err("out of range");
        assert_eq!(err.kind(), ArenaErrorKind::InvalidMove);
    }
    assert_eq!(arena.game_record(game).expect("record"), before);

    // Also in the waiting state and for a stranger.
    let waiting = *arena.create_game(3).expect("create").id();
    let err = arena
        .submit_move(waiting, PlayerId::new(999), 7, 7)
        .expect_err("out of range");
    assert_eq!(err.kind(), ArenaErrorKind::InvalidMove);
    assert_eq!(
        *arena.get_game(waiting).expect("get").status(),
        GameStatus::Waiting
    );
}

#[test]
fn test_rule_violations_leave_state_unchanged() {
    let arena = arena();
    let (game, p1, p2) = active_game(&arena, 3);
    play(&arena, game, &[(p1, 1, 1)]);
    let before = arena.game_record(game).expect("record");

    let err = arena.submit_move(game, p2, 1, 1).expect_err("occupied");
    assert_eq!(err.kind(), ArenaErrorKind::CellOccupied);
    assert!(err.kind().is_rule_violation());

    let err = arena.submit_move(game, p1, 0, 0).expect_err("not p1's turn");
    assert_eq!(err.kind(), ArenaErrorKind::NotYourTurn);

    assert_eq!(arena.game_record(game).expect("record"), before);
}

#[test]
fn test_no_moves_after_completion() {
    let arena = arena();
    let (game, p1, p2) = active_game(&arena, 3);
    play(
        &arena,
        game,
        &[(p1, 0, 0), (p2, 1, 0), (p1, 0, 1), (p2, 1, 1), (p1, 0, 2)],
    );

    for player in [p1, p2, PlayerId::new(77)] {
        let err = arena.submit_move(game, player, 2, 2).expect_err("completed");
        assert_eq!(err.kind(), ArenaErrorKind::GameNotActive);
    }
}

#[test]
fn test_join_failures() {
    let arena = arena();
    let p1 = *arena.create_player("P1").expect("create").id();
    let p2 = *arena.create_player("P2").expect("create").id();
    let p3 = *arena.create_player("P3").expect("create").id();
    let game = *arena.create_game(3).expect("create").id();

    let err = arena.join_game(game, PlayerId::new(404)).expect_err("unknown player");
    assert_eq!(err.kind(), ArenaErrorKind::PlayerNotFound);
    let err = arena.join_game(GameId::new(404), p1).expect_err("unknown game");
    assert_eq!(err.kind(), ArenaErrorKind::GameNotFound);
    assert!(err.kind().is_not_found());

    let waiting = arena.join_game(game, p1).expect("join");
    assert_eq!(*waiting.status(), GameStatus::Waiting);
    assert_eq!(*waiting.current_turn(), None);

    let err = arena.join_game(game, p1).expect_err("again");
    assert_eq!(err.kind(), ArenaErrorKind::AlreadyJoined);

    arena.join_game(game, p2).expect("join");
    let err = arena.join_game(game, p3).expect_err("third");
    assert_eq!(err.kind(), ArenaErrorKind::GameNotAcceptingPlayers);

    let seats: Vec<u8> = arena
        .list_participants(game)
        .expect("participants")
        .iter()
        .map(|p| *p.order())
        .collect();
    assert_eq!(seats, vec![1, 2]);
}

#[test]
fn test_create_game_bounds_and_default() {
    let arena = arena();
    for size in [0, 2, 11] {
        let err = arena.create_game(size).expect_err("bad size");
        assert_eq!(err.kind(), ArenaErrorKind::InvalidConfiguration);
    }
    let game = arena.create_default_game().expect("default");
    assert_eq!(*game.board_size(), 3);
    assert_eq!(game.grid().rows(), vec![vec![None; 3]; 3]);

    let big = arena.create_game(10).expect("max size");
    assert_eq!(big.grid().squares().len(), 100);
}

#[test]
fn test_unknown_lookups() {
    let arena = arena();
    let err = arena.get_game(GameId::new(1)).expect_err("missing");
    assert_eq!(err.kind(), ArenaErrorKind::GameNotFound);
    let err = arena.get_player_stats(PlayerId::new(1)).expect_err("missing");
    assert_eq!(err.kind(), ArenaErrorKind::PlayerNotFound);
    let err = arena
        .submit_move(GameId::new(1), PlayerId::new(1), 0, 0)
        .expect_err("missing");
    assert_eq!(err.kind(), ArenaErrorKind::GameNotFound);
}

#[test]
fn test_new_player_has_zeroed_stats() {
    let arena = arena();
    let player = *arena.create_player("Fresh").expect("create").id();
    let stats = arena.get_player_stats(player).expect("stats");
    assert_eq!(*stats.games_played(), 0);
    assert_eq!(*stats.win_rate(), 0);
}

/// Plays a game won by `winner` on the top row in three of their own moves.
fn quick_win(arena: &Arena, winner: PlayerId, loser: PlayerId) {
    let game = *arena.create_game(3).expect("create").id();
    arena.join_game(game, winner).expect("join");
    arena.join_game(game, loser).expect("join");
    play(
        arena,
        game,
        &[(winner, 0, 0), (loser, 1, 0), (winner, 0, 1), (loser, 1, 1), (winner, 0, 2)],
    );
}

/// Plays a game won by `winner` down the first column in four of their own moves.
fn slow_win(arena: &Arena, winner: PlayerId, loser: PlayerId) {
    let game = *arena.create_game(3).expect("create").id();
    arena.join_game(game, winner).expect("join");
    arena.join_game(game, loser).expect("join");
    play(
        arena,
        game,
        &[
            (winner, 0, 0),
            (loser, 1, 1),
            (winner, 2, 2),
            (loser, 0, 2),
            (winner, 2, 0),
            (loser, 2, 1),
            (winner, 1, 0),
        ],
    );
}

#[test]
fn test_leaderboard_ordering() {
    let arena = arena();
    let ids: Vec<PlayerId> = ["Ann", "Ben", "Cat", "Dan"]
        .iter()
        .map(|n| *arena.create_player(n).expect("create").id())
        .collect();
    let (ann, ben, cat, dan) = (ids[0], ids[1], ids[2], ids[3]);

    // Ann: 2 wins. Ben: 1 slow win. Cat: 1 quick win. Dan: no wins.
    quick_win(&arena, ann, dan);
    quick_win(&arena, ann, dan);
    slow_win(&arena, ben, dan);
    quick_win(&arena, cat, dan);

    let board = arena.top_players(10).expect("leaderboard");
    let order: Vec<PlayerId> = board.iter().map(|e| *e.player_id()).collect();
    assert_eq!(order, vec![ann, cat, ben]);
    assert_eq!(*board[0].rank(), 1);
    assert_eq!(*board[0].win_rate(), 100.0);
    assert_eq!(*board[1].efficiency(), 3.0);
    assert_eq!(*board[2].efficiency(), 4.0);

    for pair in board.windows(2) {
        assert!(pair[0].games_won() >= pair[1].games_won());
        if pair[0].games_won() == pair[1].games_won() {
            assert!(pair[0].efficiency() <= pair[1].efficiency());
        }
    }
    assert!(board.iter().all(|e| *e.games_won() > 0));

    assert_eq!(arena.get_leaderboard().expect("default").len(), 3);
    assert_eq!(arena.top_players(1).expect("top one").len(), 1);
    assert!(arena.top_players(0).expect("zero").is_empty());
}

/// Memory store whose stats writes fail until switched on.
#[derive(Debug, Default)]
struct FlakyStatsStore {
    inner: MemoryStore,
    healthy: std::sync::atomic::AtomicBool,
}

impl ArenaStore for FlakyStatsStore {
    fn insert_player(
        &self,
        name: &str,
        created_at: chrono::NaiveDateTime,
    ) -> Result<strictly_arena::Player, DbError> {
        self.inner.insert_player(name, created_at)
    }

    fn player(&self, id: PlayerId) -> Result<Option<strictly_arena::Player>, DbError> {
        self.inner.player(id)
    }

    fn insert_game(
        &self,
        board_size: usize,
        created_at: chrono::NaiveDateTime,
    ) -> Result<GameSession, DbError> {
        self.inner.insert_game(board_size, created_at)
    }

    fn game(&self, id: GameId) -> Result<Option<strictly_arena::GameRecord>, DbError> {
        self.inner.game(id)
    }

    fn commit_join(
        &self,
        session: &GameSession,
        participant: &strictly_arena::Participant,
    ) -> Result<(), DbError> {
        self.inner.commit_join(session, participant)
    }

    fn commit_move(&self, session: &GameSession, mv: &strictly_arena::Move) -> Result<(), DbError> {
        self.inner.commit_move(session, mv)
    }

    fn player_stats(&self, id: PlayerId) -> Result<Option<strictly_arena::PlayerStats>, DbError> {
        self.inner.player_stats(id)
    }

    fn update_stats(
        &self,
        game: GameId,
        player: PlayerId,
        fold: StatsFold<'_>,
    ) -> Result<StatsUpdate, DbError> {
        if self.healthy.load(std::sync::atomic::Ordering::SeqCst) {
            self.inner.update_stats(game, player, fold)
        } else {
            Err(DbError::new("stats table locked"))
        }
    }

    fn leaderboard(
        &self,
        limit: usize,
    ) -> Result<Vec<(strictly_arena::Player, strictly_arena::PlayerStats)>, DbError> {
        self.inner.leaderboard(limit)
    }
}

#[test]
fn test_stats_failure_is_non_fatal_and_reconcilable() {
    let store = Arc::new(FlakyStatsStore::default());
    let arena = Arena::new(store.clone());
    let (game, p1, p2) = active_game(&arena, 3);

    for (player, row, col) in [(p1, 0, 0), (p2, 1, 0), (p1, 0, 1), (p2, 1, 1)] {
        arena.submit_move(game, player, row, col).expect("move");
    }
    let outcome = arena.submit_move(game, p1, 0, 2).expect("winning move");
    assert_eq!(*outcome.session().status(), GameStatus::Completed);
    assert_eq!(outcome.stats_failures().len(), 2);
    assert!(
        outcome
            .stats_failures()
            .iter()
            .all(|e| e.kind() == ArenaErrorKind::StatsUpdateFailed && e.kind().is_non_fatal())
    );

    // The outcome is committed even though stats are missing.
    assert_eq!(*arena.get_game(game).expect("get").winner_id(), Some(p1));
    assert_eq!(*arena.get_player_stats(p1).expect("stats").games_played(), 0);

    store
        .healthy
        .store(true, std::sync::atomic::Ordering::SeqCst);
    assert!(arena.reconcile_stats(game).expect("reconcile").is_empty());
    assert!(arena.reconcile_stats(game).expect("reconcile again").is_empty());

    let stats = arena.get_player_stats(p1).expect("stats");
    assert_eq!(*stats.games_played(), 1);
    assert_eq!(*stats.games_won(), 1);
}

#[test]
fn test_reconcile_requires_completed_game() {
    let arena = arena();
    let (game, _, _) = active_game(&arena, 3);
    let err = arena.reconcile_stats(game).expect_err("active");
    assert_eq!(err.kind(), ArenaErrorKind::GameNotActive);
}

#[test]
fn test_arenas_sharing_a_store_agree() {
    let store: Arc<dyn ArenaStore> = Arc::new(MemoryStore::new());
    let a = Arena::new(Arc::clone(&store));
    let b = Arena::new(store);

    let p1 = *a.create_player("P1").expect("create").id();
    let p2 = *a.create_player("P2").expect("create").id();
    let game = *a.create_game(3).expect("create").id();
    a.join_game(game, p1).expect("join");
    assert_eq!(*b.get_game(game).expect("get").status(), GameStatus::Waiting);

    a.join_game(game, p2).expect("join");
    assert_eq!(*b.get_game(game).expect("get").status(), GameStatus::Active);

    let err = b.join_game(game, p2).expect_err("already seated");
    assert_eq!(err.kind(), ArenaErrorKind::GameNotAcceptingPlayers);

    // Moves alternate between the two arenas.
    b.submit_move(game, p1, 0, 0).expect("move via b");
    a.submit_move(game, p2, 1, 0).expect("move via a");
    let err = a.submit_move(game, p2, 1, 1).expect_err("p2 twice");
    assert_eq!(err.kind(), ArenaErrorKind::NotYourTurn);
    b.submit_move(game, p1, 0, 1).expect("move via b");
    b.submit_move(game, p2, 1, 1).expect("move via b");
    let outcome = a.submit_move(game, p1, 0, 2).expect("winning move via a");
    assert_eq!(*outcome.transition(), MoveTransition::Won(p1));

    assert_eq!(b.get_game(game).expect("get"), a.get_game(game).expect("get"));
    assert_eq!(*b.get_player_stats(p1).expect("stats").games_won(), 1);
    let err = b.submit_move(game, p2, 2, 2).expect_err("finished");
    assert_eq!(err.kind(), ArenaErrorKind::GameNotActive);
}
