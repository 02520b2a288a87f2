//! Identifiers and records shared by every arena component.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_more::{Display, From};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Unique identifier for a player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(i32);

impl PlayerId {
    /// Wraps a raw storage identifier.
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw storage identifier.
    pub fn get(self) -> i32 {
        self.0
    }
}

/// Unique identifier for a game session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameId(i32);

impl GameId {
    /// Wraps a raw storage identifier.
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw storage identifier.
    pub fn get(self) -> i32 {
        self.0
    }
}

/// A registered player. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct Player {
    id: PlayerId,
    name: String,
}

/// Lifecycle phase of a game session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Waiting for a second player.
    Waiting,
    /// Both seats taken, moves accepted.
    Active,
    /// Won or drawn. Terminal.
    Completed,
}

/// A player's seat in a game. Seat 1 moves first.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct Participant {
    game_id: GameId,
    player_id: PlayerId,
    order: u8,
    joined_at: NaiveDateTime,
}

/// An entry in a game's append-only move log.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct Move {
    game_id: GameId,
    player_id: PlayerId,
    row: usize,
    col: usize,
    move_number: u32,
    created_at: NaiveDateTime,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} player {} -> ({}, {})",
            self.move_number, self.player_id, self.row, self.col
        )
    }
}
