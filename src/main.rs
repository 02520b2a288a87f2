//! Strictly Arena - command-line driver over a SQLite store.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use serde::Serialize;
use strictly_arena::{Arena, ArenaConfig, ArenaRepository, GameId, PlayerId};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured database path.
const DB_ENV: &str = "STRICTLY_ARENA_DB";

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(database_path = %config.database_path(), "Starting strictly_arena");
    let repository = ArenaRepository::open(config.database_path().clone())
        .context("Failed to open database")?;
    let arena = Arena::with_config(Arc::new(repository), config);

    run(&arena, cli.command)
}

/// Resolves configuration: file, then environment, then flags.
fn load_config(cli: &Cli) -> Result<ArenaConfig> {
    let mut config = match &cli.config {
        Some(path) => ArenaConfig::from_file(path)?,
        None => ArenaConfig::default(),
    };
    if let Ok(path) = std::env::var(DB_ENV) {
        config = config.with_database_path(path);
    }
    if let Some(path) = &cli.database_path {
        config = config.with_database_path(path.clone());
    }
    Ok(config)
}

#[instrument(skip(arena))]
fn run(arena: &Arena, command: Command) -> Result<()> {
    match command {
        Command::Migrate => {
            info!("Database ready");
            Ok(())
        }
        Command::CreatePlayer { name } => print_json(&arena.create_player(&name)?),
        Command::CreateGame { size } => {
            let game = match size {
                Some(size) => arena.create_game(size)?,
                None => arena.create_default_game()?,
            };
            print_json(&game)
        }
        Command::Join { game, player } => {
            print_json(&arena.join_game(GameId::new(game), PlayerId::new(player))?)
        }
        Command::Move {
            game,
            player,
            row,
            col,
        } => {
            let outcome = arena.submit_move(GameId::new(game), PlayerId::new(player), row, col)?;
            for failure in outcome.stats_failures() {
                warn!(error = %failure, "Stats not updated; run `reconcile` to retry");
            }
            println!("{}", outcome.session().grid().display());
            print_json(outcome.session())
        }
        Command::Show { game } => {
            let record = arena.game_record(GameId::new(game))?;
            println!("{}", record.session().grid().display());
            print_json(&record)
        }
        Command::Stats { player } => print_json(&arena.get_player_stats(PlayerId::new(player))?),
        Command::Leaderboard { limit } => {
            let entries = match limit {
                Some(limit) => arena.top_players(limit)?,
                None => arena.get_leaderboard()?,
            };
            print_json(&entries)
        }
        Command::Reconcile { game } => {
            let failures = arena.reconcile_stats(GameId::new(game))?;
            for failure in &failures {
                warn!(error = %failure, "Stats still not updated");
            }
            anyhow::ensure!(failures.is_empty(), "{} stats updates failed", failures.len());
            info!("Stats reconciled");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
