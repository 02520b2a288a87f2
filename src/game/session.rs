//! Game session snapshots.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use crate::board::Grid;
use crate::types::{GameId, GameStatus, Move, Participant, PlayerId};

/// Point-in-time view of one game.
///
/// Snapshots are values: mutating a clone never reaches the live game.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameSession {
    pub(crate) id: GameId,
    pub(crate) status: GameStatus,
    pub(crate) board_size: usize,
    pub(crate) grid: Grid,
    pub(crate) current_turn: Option<PlayerId>,
    pub(crate) winner_id: Option<PlayerId>,
    pub(crate) is_draw: bool,
    pub(crate) created_at: NaiveDateTime,
    pub(crate) completed_at: Option<NaiveDateTime>,
}

impl GameSession {
    /// A fresh game with an empty grid.
    pub(crate) fn waiting(id: GameId, board_size: usize, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            status: GameStatus::Waiting,
            board_size,
            grid: Grid::new(board_size),
            current_turn: None,
            winner_id: None,
            is_draw: false,
            created_at,
            completed_at: None,
        }
    }

    /// Returns true once the game has been won or drawn.
    pub fn is_completed(&self) -> bool {
        self.status == GameStatus::Completed
    }
}

/// Everything known about one game: its snapshot, seats and move log.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameRecord {
    pub(crate) session: GameSession,
    pub(crate) participants: Vec<Participant>,
    pub(crate) moves: Vec<Move>,
}

impl GameRecord {
    /// Assembles a record. Participants sort by seat, moves by move number.
    pub fn new(
        session: GameSession,
        mut participants: Vec<Participant>,
        mut moves: Vec<Move>,
    ) -> Self {
        participants.sort_by_key(|p| *p.order());
        moves.sort_by_key(|m| *m.move_number());
        Self {
            session,
            participants,
            moves,
        }
    }

    /// Number of moves the given player made in this game.
    pub fn moves_by(&self, player: PlayerId) -> u32 {
        let count = self
            .moves
            .iter()
            .filter(|m| *m.player_id() == player)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Returns true if the player holds a seat in this game.
    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.participants.iter().any(|p| *p.player_id() == player)
    }
}
