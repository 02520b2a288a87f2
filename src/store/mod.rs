//! Persistence seam for the arena.
//!
//! Every component receives an explicitly constructed store handle
//! (`Arc<dyn ArenaStore>`); there is no process-wide connection.
//! Two implementations ship with the crate: [`MemoryStore`] for tests and
//! ephemeral runs, and the SQLite-backed [`ArenaRepository`](crate::ArenaRepository).

mod memory;

pub use memory::MemoryStore;

use chrono::NaiveDateTime;

use crate::db::DbError;
use crate::game::{GameRecord, GameSession};
use crate::stats::PlayerStats;
use crate::types::{GameId, Move, Participant, Player, PlayerId};

/// Result of a per-player statistics update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsUpdate {
    /// The game was folded into the player's totals.
    Applied(PlayerStats),
    /// This game was already counted for this player; nothing changed.
    AlreadyRecorded,
}

/// Fold applied to a player's previous stats row, if any.
pub type StatsFold<'a> = &'a dyn Fn(Option<&PlayerStats>) -> PlayerStats;

/// Storage operations the arena core depends on.
///
/// Implementations must make each method atomic. `commit_join` and
/// `commit_move` write the session row together with the participant or
/// move row. `update_stats` reads, folds and writes one player's row and
/// marks `(game, player)` as counted, all in one unit, so concurrent
/// completions for the same player never lose an update and retries never
/// double count.
pub trait ArenaStore: Send + Sync + std::fmt::Debug {
    /// Inserts a player and assigns its id.
    fn insert_player(&self, name: &str, created_at: NaiveDateTime) -> Result<Player, DbError>;

    /// Fetches a player by id.
    fn player(&self, id: PlayerId) -> Result<Option<Player>, DbError>;

    /// Inserts a waiting game with an empty grid and assigns its id.
    fn insert_game(
        &self,
        board_size: usize,
        created_at: NaiveDateTime,
    ) -> Result<GameSession, DbError>;

    /// Loads a game with its participants (by seat) and moves (by number).
    fn game(&self, id: GameId) -> Result<Option<GameRecord>, DbError>;

    /// Persists a join: the new participant and the updated session.
    fn commit_join(&self, session: &GameSession, participant: &Participant)
    -> Result<(), DbError>;

    /// Persists a move: the appended log entry and the updated session.
    fn commit_move(&self, session: &GameSession, mv: &Move) -> Result<(), DbError>;

    /// Fetches a player's statistics row.
    fn player_stats(&self, id: PlayerId) -> Result<Option<PlayerStats>, DbError>;

    /// Applies `fold` to the player's row unless this game was already counted.
    fn update_stats(
        &self,
        game: GameId,
        player: PlayerId,
        fold: StatsFold<'_>,
    ) -> Result<StatsUpdate, DbError>;

    /// Players with at least one win, ranked by wins desc, efficiency asc,
    /// then player id asc. At most `limit` rows.
    fn leaderboard(&self, limit: usize) -> Result<Vec<(Player, PlayerStats)>, DbError>;
}
