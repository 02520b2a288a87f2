//! Database row models and their conversions to domain types.

use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_new::new;
use diesel::prelude::*;

use crate::board::Grid;
use crate::db::{DbError, schema};
use crate::game::GameSession;
use crate::stats::PlayerStats;
use crate::types::{GameId, GameStatus, Move, Participant, Player, PlayerId};

fn to_i32(value: usize, what: &str) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| DbError::new(format!("{what} {value} does not fit a column")))
}

fn to_usize(value: i32, what: &str) -> Result<usize, DbError> {
    usize::try_from(value).map_err(|_| DbError::new(format!("Invalid {what}: {value}")))
}

/// Player database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::players)]
pub struct PlayerRow {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player::new(PlayerId::new(row.id), row.name)
    }
}

/// Insertable player model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayerRow<'a> {
    name: &'a str,
    created_at: NaiveDateTime,
}

/// Game session database model. The grid is stored as JSON rows.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::games)]
pub struct GameRow {
    pub id: i32,
    pub status: String,
    pub board_size: i32,
    pub grid: String,
    pub current_turn: Option<i32>,
    pub winner_id: Option<i32>,
    pub is_draw: bool,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

impl GameRow {
    /// Decodes the row into a session snapshot.
    pub fn into_session(self) -> Result<GameSession, DbError> {
        let status = GameStatus::from_str(&self.status)
            .map_err(|_| DbError::new(format!("Invalid status: '{}'", self.status)))?;
        let grid: Grid = serde_json::from_str(&self.grid)?;
        let board_size = to_usize(self.board_size, "board size")?;
        if grid.size() != board_size {
            return Err(DbError::new(format!(
                "Grid of size {} stored for a {}x{} game",
                grid.size(),
                board_size,
                board_size
            )));
        }

        Ok(GameSession {
            id: GameId::new(self.id),
            status,
            board_size,
            grid,
            current_turn: self.current_turn.map(PlayerId::new),
            winner_id: self.winner_id.map(PlayerId::new),
            is_draw: self.is_draw,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

/// Insertable game model.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::games)]
pub struct NewGameRow {
    status: String,
    board_size: i32,
    grid: String,
    is_draw: bool,
    created_at: NaiveDateTime,
}

impl NewGameRow {
    /// A waiting game with an empty grid.
    pub fn waiting(board_size: usize, created_at: NaiveDateTime) -> Result<Self, DbError> {
        Ok(Self {
            status: GameStatus::Waiting.as_ref().to_string(),
            board_size: to_i32(board_size, "board size")?,
            grid: serde_json::to_string(&Grid::new(board_size))?,
            is_draw: false,
            created_at,
        })
    }
}

/// Mutable columns of a game row.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::games)]
#[diesel(treat_none_as_null = true)]
pub struct GameChanges {
    status: String,
    grid: String,
    current_turn: Option<i32>,
    winner_id: Option<i32>,
    is_draw: bool,
    completed_at: Option<NaiveDateTime>,
}

impl TryFrom<&GameSession> for GameChanges {
    type Error = DbError;

    fn try_from(session: &GameSession) -> Result<Self, Self::Error> {
        Ok(Self {
            status: session.status.as_ref().to_string(),
            grid: serde_json::to_string(&session.grid)?,
            current_turn: session.current_turn.map(PlayerId::get),
            winner_id: session.winner_id.map(PlayerId::get),
            is_draw: session.is_draw,
            completed_at: session.completed_at,
        })
    }
}

/// Participant database model.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::participants)]
pub struct ParticipantRow {
    pub game_id: i32,
    pub player_id: i32,
    pub seat: i32,
    pub joined_at: NaiveDateTime,
}

impl From<&Participant> for ParticipantRow {
    fn from(p: &Participant) -> Self {
        Self {
            game_id: p.game_id().get(),
            player_id: p.player_id().get(),
            seat: i32::from(*p.order()),
            joined_at: *p.joined_at(),
        }
    }
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = DbError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        let order = u8::try_from(row.seat)
            .map_err(|_| DbError::new(format!("Invalid seat: {}", row.seat)))?;
        Ok(Participant::new(
            GameId::new(row.game_id),
            PlayerId::new(row.player_id),
            order,
            row.joined_at,
        ))
    }
}

/// Move log database model.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::moves)]
pub struct MoveRow {
    pub game_id: i32,
    pub move_number: i32,
    pub player_id: i32,
    pub row_index: i32,
    pub col_index: i32,
    pub created_at: NaiveDateTime,
}

impl TryFrom<&Move> for MoveRow {
    type Error = DbError;

    fn try_from(mv: &Move) -> Result<Self, Self::Error> {
        Ok(Self {
            game_id: mv.game_id().get(),
            move_number: i32::try_from(*mv.move_number())
                .map_err(|_| DbError::new("move number does not fit a column"))?,
            player_id: mv.player_id().get(),
            row_index: to_i32(*mv.row(), "row")?,
            col_index: to_i32(*mv.col(), "column")?,
            created_at: *mv.created_at(),
        })
    }
}

impl TryFrom<MoveRow> for Move {
    type Error = DbError;

    fn try_from(row: MoveRow) -> Result<Self, Self::Error> {
        let move_number = u32::try_from(row.move_number)
            .map_err(|_| DbError::new(format!("Invalid move number: {}", row.move_number)))?;
        Ok(Move::new(
            GameId::new(row.game_id),
            PlayerId::new(row.player_id),
            to_usize(row.row_index, "row")?,
            to_usize(row.col_index, "column")?,
            move_number,
            row.created_at,
        ))
    }
}

/// Player statistics database model.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::player_stats)]
pub struct StatsRow {
    pub player_id: i32,
    pub games_played: i32,
    pub games_won: i32,
    pub total_moves: i32,
    pub win_rate: i32,
    pub efficiency: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl From<StatsRow> for PlayerStats {
    fn from(row: StatsRow) -> Self {
        PlayerStats {
            player_id: PlayerId::new(row.player_id),
            games_played: row.games_played,
            games_won: row.games_won,
            total_moves: row.total_moves,
            win_rate: row.win_rate,
            efficiency: row.efficiency,
        }
    }
}

/// Insertable and updatable statistics model.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = schema::player_stats)]
#[diesel(primary_key(player_id))]
#[diesel(treat_none_as_null = true)]
pub struct StatsWrite {
    player_id: i32,
    games_played: i32,
    games_won: i32,
    total_moves: i32,
    win_rate: i32,
    efficiency: Option<i32>,
    updated_at: NaiveDateTime,
}

impl StatsWrite {
    /// Row contents for the given stats at `updated_at`.
    pub fn new(stats: &PlayerStats, updated_at: NaiveDateTime) -> Self {
        Self {
            player_id: stats.player_id.get(),
            games_played: stats.games_played,
            games_won: stats.games_won,
            total_moves: stats.total_moves,
            win_rate: stats.win_rate,
            efficiency: stats.efficiency,
            updated_at,
        }
    }
}

/// Marks a game as counted for a player.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::stats_ledger)]
pub struct LedgerRow {
    game_id: i32,
    player_id: i32,
    recorded_at: NaiveDateTime,
}
