//! Typed failures returned by the arena core.

use derive_more::{Display, Error};

use crate::db::DbError;
use crate::types::{GameId, GameStatus, PlayerId};

/// Category of an [`ArenaError`].
///
/// Callers match on the kind to pick a response. Kinds fall into four groups:
/// not-found, rule violations, non-fatal post-conditions, and storage faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ArenaErrorKind {
    /// No game with the requested id.
    #[display("game not found")]
    GameNotFound,
    /// No player with the requested id.
    #[display("player not found")]
    PlayerNotFound,
    /// The mover does not hold the current turn.
    #[display("not your turn")]
    NotYourTurn,
    /// The target cell is already taken.
    #[display("cell occupied")]
    CellOccupied,
    /// Coordinates fall outside the board.
    #[display("invalid move")]
    InvalidMove,
    /// The game is not accepting moves.
    #[display("game not active")]
    GameNotActive,
    /// Both seats are already taken.
    #[display("game full")]
    GameFull,
    /// The player already holds a seat in this game.
    #[display("already joined")]
    AlreadyJoined,
    /// The game has left the waiting phase.
    #[display("game not accepting players")]
    GameNotAcceptingPlayers,
    /// Requested game parameters are out of range.
    #[display("invalid configuration")]
    InvalidConfiguration,
    /// Player name is empty or too long.
    #[display("invalid name")]
    InvalidName,
    /// A statistics row could not be updated after a game completed.
    #[display("stats update failed")]
    StatsUpdateFailed,
    /// The backing store could not be reached or returned a fault.
    #[display("storage unavailable")]
    StorageUnavailable,
}

impl ArenaErrorKind {
    /// True for `GameNotFound` and `PlayerNotFound`.
    pub fn is_not_found(self) -> bool {
        matches!(self, Self::GameNotFound | Self::PlayerNotFound)
    }

    /// True for kinds raised by a rejected, non-mutating operation.
    pub fn is_rule_violation(self) -> bool {
        matches!(
            self,
            Self::NotYourTurn
                | Self::CellOccupied
                | Self::InvalidMove
                | Self::GameNotActive
                | Self::GameFull
                | Self::AlreadyJoined
                | Self::GameNotAcceptingPlayers
                | Self::InvalidConfiguration
                | Self::InvalidName
        )
    }

    /// True for conditions reported after the primary outcome already committed.
    pub fn is_non_fatal(self) -> bool {
        matches!(self, Self::StatsUpdateFailed)
    }
}

/// Arena error with kind, message and location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{}: {} at {}:{}", kind, message, file, line)]
pub struct ArenaError {
    /// Failure category.
    pub kind: ArenaErrorKind,
    /// Human-readable detail.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ArenaError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ArenaErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns the failure category.
    pub fn kind(&self) -> ArenaErrorKind {
        self.kind
    }

    #[track_caller]
    pub(crate) fn game_not_found(id: GameId) -> Self {
        Self::new(ArenaErrorKind::GameNotFound, format!("game {id} does not exist"))
    }

    #[track_caller]
    pub(crate) fn player_not_found(id: PlayerId) -> Self {
        Self::new(
            ArenaErrorKind::PlayerNotFound,
            format!("player {id} does not exist"),
        )
    }

    #[track_caller]
    pub(crate) fn game_not_active(id: GameId, status: GameStatus) -> Self {
        Self::new(
            ArenaErrorKind::GameNotActive,
            format!("game {id} is {status}"),
        )
    }
}

impl From<DbError> for ArenaError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        Self::new(ArenaErrorKind::StorageUnavailable, err.message)
    }
}
