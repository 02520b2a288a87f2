//! Ranked view over player statistics. Read-only.

use std::sync::Arc;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ArenaError;
use crate::store::ArenaStore;
use crate::types::PlayerId;

/// Number of entries returned when no limit is given.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 3;

/// One ranked player, with rates in human units.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position in the ranking.
    rank: usize,
    player_id: PlayerId,
    name: String,
    games_played: i32,
    games_won: i32,
    /// Percentage of games won, e.g. `66.67`.
    win_rate: f64,
    /// Average moves per won game, e.g. `3.5`.
    efficiency: f64,
}

/// Derives the top-N ranking from aggregated statistics.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    store: Arc<dyn ArenaStore>,
}

impl Leaderboard {
    /// Creates a leaderboard backed by the given store.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn ArenaStore>) -> Self {
        Self { store }
    }

    /// Top players by wins, then fewest average moves to win.
    ///
    /// Players without a win never appear; the result is empty until
    /// somebody wins.
    #[instrument(skip(self))]
    pub fn top_players(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, ArenaError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let entries: Vec<LeaderboardEntry> = self
            .store
            .leaderboard(limit)?
            .into_iter()
            .filter(|(_, stats)| *stats.games_won() > 0)
            .take(limit)
            .enumerate()
            .map(|(index, (player, stats))| LeaderboardEntry {
                rank: index + 1,
                player_id: *player.id(),
                name: player.name().clone(),
                games_played: *stats.games_played(),
                games_won: *stats.games_won(),
                win_rate: stats.win_rate_percent(),
                efficiency: stats.average_moves_to_win().unwrap_or_default(),
            })
            .collect();

        info!(count = entries.len(), "Leaderboard computed");
        Ok(entries)
    }
}
