//! The arena facade: one entry point per external operation.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::game::{GameManager, GameRecord, GameSession, MoveOutcome};
use crate::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::registry::PlayerRegistry;
use crate::stats::{PlayerStats, StatsAggregator};
use crate::store::ArenaStore;
use crate::types::{GameId, Move, Participant, Player, PlayerId};

/// Wires the registry, game manager, aggregator and leaderboard over one
/// injected store.
///
/// Cloning is cheap and every clone shares the same games.
#[derive(Debug, Clone)]
pub struct Arena {
    config: ArenaConfig,
    players: PlayerRegistry,
    games: GameManager,
    stats: StatsAggregator,
    leaderboard: Leaderboard,
}

impl Arena {
    /// Creates an arena with default configuration.
    pub fn new(store: Arc<dyn ArenaStore>) -> Self {
        Self::with_config(store, ArenaConfig::default())
    }

    /// Creates an arena with the given configuration.
    #[instrument(skip(store))]
    pub fn with_config(store: Arc<dyn ArenaStore>, config: ArenaConfig) -> Self {
        info!("Creating arena");
        let players = PlayerRegistry::new(Arc::clone(&store), *config.max_name_length());
        let stats = StatsAggregator::new(Arc::clone(&store));
        let games = GameManager::new(Arc::clone(&store), players.clone(), stats.clone());
        let leaderboard = Leaderboard::new(store);
        Self {
            config,
            players,
            games,
            stats,
            leaderboard,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Registers a player. Fails with `InvalidName`.
    pub fn create_player(&self, name: &str) -> Result<Player, ArenaError> {
        self.players.create(name)
    }

    /// Fetches a player. Fails with `PlayerNotFound`.
    pub fn get_player(&self, player_id: PlayerId) -> Result<Player, ArenaError> {
        self.players.get(player_id)
    }

    /// Creates a game with the given board size. Fails with `InvalidConfiguration`.
    pub fn create_game(&self, board_size: usize) -> Result<GameSession, ArenaError> {
        self.games.create(board_size)
    }

    /// Creates a game with the configured default board size.
    pub fn create_default_game(&self) -> Result<GameSession, ArenaError> {
        self.games.create(*self.config.default_board_size())
    }

    /// Seats a player in a game.
    pub fn join_game(&self, game_id: GameId, player_id: PlayerId) -> Result<GameSession, ArenaError> {
        self.games.join(game_id, player_id)
    }

    /// Plays a move.
    pub fn submit_move(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        row: i64,
        col: i64,
    ) -> Result<MoveOutcome, ArenaError> {
        self.games.submit_move(game_id, player_id, row, col)
    }

    /// Current snapshot of a game. Fails with `GameNotFound`.
    pub fn get_game(&self, game_id: GameId) -> Result<GameSession, ArenaError> {
        self.games.get(game_id)
    }

    /// Snapshot, seats and move log of a game.
    pub fn game_record(&self, game_id: GameId) -> Result<GameRecord, ArenaError> {
        self.games.record(game_id)
    }

    /// Move log ordered by move number.
    pub fn list_moves(&self, game_id: GameId) -> Result<Vec<Move>, ArenaError> {
        Ok(self.games.record(game_id)?.moves)
    }

    /// Participants ordered by seat.
    pub fn list_participants(&self, game_id: GameId) -> Result<Vec<Participant>, ArenaError> {
        Ok(self.games.record(game_id)?.participants)
    }

    /// Statistics for a player. Zeroed until their first finished game.
    ///
    /// Fails with `PlayerNotFound` for unknown ids.
    #[instrument(skip(self))]
    pub fn get_player_stats(&self, player_id: PlayerId) -> Result<PlayerStats, ArenaError> {
        self.players.get(player_id)?;
        self.stats.player_stats(player_id)
    }

    /// Top players, at most `limit`.
    pub fn top_players(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, ArenaError> {
        self.leaderboard.top_players(limit)
    }

    /// Top players with the configured default length.
    pub fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ArenaError> {
        self.leaderboard.top_players(*self.config.leaderboard_limit())
    }

    /// Retries statistics for a completed game without double counting.
    pub fn reconcile_stats(&self, game_id: GameId) -> Result<Vec<ArenaError>, ArenaError> {
        self.games.reconcile_stats(game_id)
    }
}
