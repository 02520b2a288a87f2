//! Command-line interface for strictly_arena.

use clap::{Parser, Subcommand};

/// Strictly Arena - two-player grid games with stats and a leaderboard
#[derive(Parser, Debug)]
#[command(name = "strictly_arena")]
#[command(about = "Manage grid game sessions backed by SQLite", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Database file, overriding the config and STRICTLY_ARENA_DB
    #[arg(long, global = true)]
    pub database_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and apply pending migrations
    Migrate,

    /// Register a new player
    CreatePlayer {
        /// Display name
        name: String,
    },

    /// Create a game waiting for players
    CreateGame {
        /// Board side length (3-10); defaults to the configured size
        #[arg(short, long)]
        size: Option<usize>,
    },

    /// Seat a player in a waiting game
    Join {
        /// Game id
        game: i32,
        /// Player id
        player: i32,
    },

    /// Play a move
    Move {
        /// Game id
        game: i32,
        /// Player id
        player: i32,
        /// Zero-based row
        #[arg(allow_negative_numbers = true)]
        row: i64,
        /// Zero-based column
        #[arg(allow_negative_numbers = true)]
        col: i64,
    },

    /// Show a game's board, seats and move log
    Show {
        /// Game id
        game: i32,
    },

    /// Show a player's statistics
    Stats {
        /// Player id
        player: i32,
    },

    /// Show the top players
    Leaderboard {
        /// Number of entries; defaults to the configured limit
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Retry statistics for a completed game
    Reconcile {
        /// Game id
        game: i32,
    },
}
