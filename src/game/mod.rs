//! Game sessions: snapshots, the per-game state machine, and the manager
//! that serializes transitions per game id.

pub mod invariants;
mod machine;
mod manager;
mod session;

pub use machine::MoveTransition;
pub use manager::{GameManager, MoveOutcome};
pub use session::{GameRecord, GameSession};

/// Smallest supported board side.
pub const MIN_BOARD_SIZE: usize = 3;

/// Largest supported board side.
pub const MAX_BOARD_SIZE: usize = 10;
