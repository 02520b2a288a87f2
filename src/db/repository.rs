//! SQLite-backed [`ArenaStore`].

use chrono::{NaiveDateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::models::{
    GameChanges, GameRow, LedgerRow, MoveRow, NewGameRow, NewPlayerRow, ParticipantRow, PlayerRow,
    StatsRow, StatsWrite,
};
use crate::db::{DbError, schema};
use crate::game::{GameRecord, GameSession};
use crate::stats::PlayerStats;
use crate::store::{ArenaStore, StatsFold, StatsUpdate};
use crate::types::{GameId, Move, Participant, Player, PlayerId};

/// Schema migrations bundled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for players, games and statistics.
#[derive(Debug, Clone)]
pub struct ArenaRepository {
    db_path: String,
}

impl ArenaRepository {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// Each operation opens its own connection, so the path must name a
    /// file; `":memory:"` would give every call a fresh empty database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Opening ArenaRepository");
        let repository = Self { db_path };
        let mut conn = repository.connection()?;
        conn.batch_execute("PRAGMA journal_mode = WAL;")?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(repository)
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}; PRAGMA foreign_keys = ON;"
        ))?;
        Ok(conn)
    }

    fn update_game(conn: &mut SqliteConnection, session: &GameSession) -> Result<(), DbError> {
        let changes = GameChanges::try_from(session)?;
        let updated = diesel::update(schema::games::table.find(session.id.get()))
            .set(&changes)
            .execute(conn)?;
        if updated != 1 {
            return Err(DbError::new(format!("game {} missing", session.id)));
        }
        Ok(())
    }
}

impl ArenaStore for ArenaRepository {
    #[instrument(skip(self))]
    fn insert_player(&self, name: &str, created_at: NaiveDateTime) -> Result<Player, DbError> {
        let mut conn = self.connection()?;
        let row = diesel::insert_into(schema::players::table)
            .values(&NewPlayerRow::new(name, created_at))
            .returning(PlayerRow::as_returning())
            .get_result(&mut conn)?;
        info!(player_id = row.id, "Player created");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    fn player(&self, id: PlayerId) -> Result<Option<Player>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::players::table
            .find(id.get())
            .select(PlayerRow::as_select())
            .first::<PlayerRow>(&mut conn)
            .optional()?;
        Ok(row.map(Player::from))
    }

    #[instrument(skip(self))]
    fn insert_game(
        &self,
        board_size: usize,
        created_at: NaiveDateTime,
    ) -> Result<GameSession, DbError> {
        let mut conn = self.connection()?;
        let row = diesel::insert_into(schema::games::table)
            .values(&NewGameRow::waiting(board_size, created_at)?)
            .returning(GameRow::as_returning())
            .get_result(&mut conn)?;
        info!(game_id = row.id, board_size, "Game created");
        row.into_session()
    }

    #[instrument(skip(self))]
    fn game(&self, id: GameId) -> Result<Option<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        conn.transaction(|conn| {
            let Some(row) = schema::games::table
                .find(id.get())
                .select(GameRow::as_select())
                .first::<GameRow>(conn)
                .optional()?
            else {
                debug!("Game not found");
                return Ok(None);
            };

            let participants = schema::participants::table
                .filter(schema::participants::game_id.eq(id.get()))
                .order(schema::participants::seat.asc())
                .select(ParticipantRow::as_select())
                .load::<ParticipantRow>(conn)?
                .into_iter()
                .map(Participant::try_from)
                .collect::<Result<Vec<_>, _>>()?;

            let moves = schema::moves::table
                .filter(schema::moves::game_id.eq(id.get()))
                .order(schema::moves::move_number.asc())
                .select(MoveRow::as_select())
                .load::<MoveRow>(conn)?
                .into_iter()
                .map(Move::try_from)
                .collect::<Result<Vec<_>, _>>()?;

            debug!(
                participants = participants.len(),
                moves = moves.len(),
                "Game loaded"
            );
            Ok(Some(GameRecord::new(row.into_session()?, participants, moves)))
        })
    }

    #[instrument(skip(self, session, participant), fields(game_id = %session.id))]
    fn commit_join(
        &self,
        session: &GameSession,
        participant: &Participant,
    ) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction(|conn| {
            diesel::insert_into(schema::participants::table)
                .values(&ParticipantRow::from(participant))
                .execute(conn)?;
            Self::update_game(conn, session)
        })
    }

    #[instrument(skip(self, session, mv), fields(game_id = %session.id, move_number = mv.move_number()))]
    fn commit_move(&self, session: &GameSession, mv: &Move) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let row = MoveRow::try_from(mv)?;
        conn.immediate_transaction(|conn| {
            diesel::insert_into(schema::moves::table)
                .values(&row)
                .execute(conn)?;
            Self::update_game(conn, session)
        })
    }

    #[instrument(skip(self))]
    fn player_stats(&self, id: PlayerId) -> Result<Option<PlayerStats>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::player_stats::table
            .find(id.get())
            .select(StatsRow::as_select())
            .first::<StatsRow>(&mut conn)
            .optional()?;
        Ok(row.map(PlayerStats::from))
    }

    #[instrument(skip(self, fold))]
    fn update_stats(
        &self,
        game: GameId,
        player: PlayerId,
        fold: StatsFold<'_>,
    ) -> Result<StatsUpdate, DbError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction(|conn| {
            let counted = diesel::select(diesel::dsl::exists(
                schema::stats_ledger::table
                    .filter(schema::stats_ledger::game_id.eq(game.get()))
                    .filter(schema::stats_ledger::player_id.eq(player.get())),
            ))
            .get_result::<bool>(conn)?;
            if counted {
                warn!("Game already counted for player");
                return Ok(StatsUpdate::AlreadyRecorded);
            }

            let previous = schema::player_stats::table
                .find(player.get())
                .select(StatsRow::as_select())
                .first::<StatsRow>(conn)
                .optional()?
                .map(PlayerStats::from);

            let next = fold(previous.as_ref());
            let now = Utc::now().naive_utc();
            let write = StatsWrite::new(&next, now);

            if previous.is_some() {
                diesel::update(schema::player_stats::table.find(player.get()))
                    .set(&write)
                    .execute(conn)?;
            } else {
                diesel::insert_into(schema::player_stats::table)
                    .values(&write)
                    .execute(conn)?;
            }

            diesel::insert_into(schema::stats_ledger::table)
                .values(&LedgerRow::new(game.get(), player.get(), now))
                .execute(conn)?;

            debug!(games_played = next.games_played, "Stats row written");
            Ok(StatsUpdate::Applied(next))
        })
    }

    #[instrument(skip(self))]
    fn leaderboard(&self, limit: usize) -> Result<Vec<(Player, PlayerStats)>, DbError> {
        let mut conn = self.connection()?;
        let rows = schema::player_stats::table
            .inner_join(schema::players::table)
            .filter(schema::player_stats::games_won.gt(0))
            .order((
                schema::player_stats::games_won.desc(),
                schema::player_stats::efficiency.asc(),
                schema::player_stats::player_id.asc(),
            ))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select((PlayerRow::as_select(), StatsRow::as_select()))
            .load::<(PlayerRow, StatsRow)>(&mut conn)?;

        info!(count = rows.len(), "Leaderboard loaded");
        Ok(rows
            .into_iter()
            .map(|(player, stats)| (player.into(), stats.into()))
            .collect())
    }
}
