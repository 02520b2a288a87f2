//! SQLite persistence for players, games, moves and statistics.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use repository::{ArenaRepository, MIGRATIONS};
