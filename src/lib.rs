//! Strictly Arena - concurrent two-player grid games
//!
//! Tracks many simultaneous N×N tic-tac-toe style games, enforcing turn
//! order, move legality and win/draw detection, and derives per-player
//! statistics and a ranked leaderboard.
//!
//! # Architecture
//!
//! - **Board**: pure rules over a grid snapshot (win, full, bounds)
//! - **Registry**: player identities
//! - **Game**: per-game state machine, serialized per game id
//! - **Stats**: running totals folded in when a game completes
//! - **Leaderboard**: read-only top-N ranking
//! - **Store**: injected persistence (in-memory or SQLite)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strictly_arena::{Arena, GameStatus, MemoryStore};
//!
//! # fn example() -> Result<(), strictly_arena::ArenaError> {
//! let arena = Arena::new(Arc::new(MemoryStore::new()));
//! let alice = arena.create_player("Alice")?;
//! let bob = arena.create_player("Bob")?;
//!
//! let game = arena.create_game(3)?;
//! arena.join_game(*game.id(), *alice.id())?;
//! let game = arena.join_game(*game.id(), *bob.id())?;
//! assert_eq!(*game.status(), GameStatus::Active);
//!
//! let outcome = arena.submit_move(*game.id(), *alice.id(), 1, 1)?;
//! assert_eq!(*outcome.session().current_turn(), Some(*bob.id()));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod arena;
mod board;
mod config;
mod db;
mod error;
mod game;
mod leaderboard;
mod registry;
mod stats;
mod store;
mod types;

// Crate-level exports - Facade and configuration
pub use arena::Arena;
pub use config::{ArenaConfig, ConfigError};

// Crate-level exports - Errors
pub use error::{ArenaError, ArenaErrorKind};

// Crate-level exports - Board engine
pub use board::{Grid, GridShapeError, Square, check_winner, is_full, validate_coordinates};

// Crate-level exports - Game sessions
pub use game::invariants::{
    ContiguousMoves, GameInvariants, GridOwnership, Invariant, InvariantSet, InvariantViolation,
    StatusConsistency,
};
pub use game::{
    GameManager, GameRecord, GameSession, MAX_BOARD_SIZE, MIN_BOARD_SIZE, MoveOutcome,
    MoveTransition,
};

// Crate-level exports - Players, stats and leaderboard
pub use leaderboard::{DEFAULT_LEADERBOARD_LIMIT, Leaderboard, LeaderboardEntry};
pub use registry::{DEFAULT_MAX_NAME_LENGTH, PlayerRegistry};
pub use stats::{ParticipantResult, PlayerStats, StatsAggregator};
pub use types::{GameId, GameStatus, Move, Participant, Player, PlayerId};

// Crate-level exports - Persistence
pub use db::{ArenaRepository, DbError, MIGRATIONS};
pub use store::{ArenaStore, MemoryStore, StatsFold, StatsUpdate};
