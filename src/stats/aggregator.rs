//! Folds completed games into per-player statistics.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::error::{ArenaError, ArenaErrorKind};
use crate::game::GameRecord;
use crate::stats::{ParticipantResult, PlayerStats};
use crate::store::{ArenaStore, StatsUpdate};
use crate::types::PlayerId;

/// Updates player totals when a game completes.
///
/// Each participant's row is updated in its own atomic store call, keyed
/// by `(game, player)`, so a game is counted at most once per player even
/// when the aggregation is retried.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    store: Arc<dyn ArenaStore>,
}

impl StatsAggregator {
    /// Creates an aggregator backed by the given store.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn ArenaStore>) -> Self {
        info!("Creating StatsAggregator");
        Self { store }
    }

    /// Counts a completed game for both participants.
    ///
    /// Failures are non-fatal: the game outcome is already committed, so each
    /// failed player update is logged and returned as a `StatsUpdateFailed`
    /// error instead of aborting the remaining updates.
    ///
    /// The winner's move count comes from the move log, so efficiency is
    /// exact whichever seat won.
    #[instrument(skip(self, record), fields(game_id = %record.session().id()))]
    pub fn record_completion(&self, record: &GameRecord) -> Vec<ArenaError> {
        let session = record.session();
        if !session.is_completed() {
            warn!(status = %session.status(), "Skipping stats for unfinished game");
            return Vec::new();
        }

        let mut failures = Vec::new();
        for participant in record.participants() {
            let player = *participant.player_id();
            let result = ParticipantResult::new(
                player,
                *session.winner_id() == Some(player),
                record.moves_by(player),
            );

            match self.store.update_stats(*session.id(), player, &|previous| {
                PlayerStats::record(previous, &result)
            }) {
                Ok(StatsUpdate::Applied(stats)) => info!(
                    player_id = %player,
                    games_played = stats.games_played(),
                    games_won = stats.games_won(),
                    win_rate = stats.win_rate(),
                    "Stats updated"
                ),
                Ok(StatsUpdate::AlreadyRecorded) => {
                    debug!(player_id = %player, "Game already counted")
                }
                Err(e) => {
                    error!(player_id = %player, error = %e, "Stats update failed");
                    failures.push(ArenaError::new(
                        ArenaErrorKind::StatsUpdateFailed,
                        format!(
                            "stats for player {player} in game {} not updated: {}",
                            session.id(),
                            e.message
                        ),
                    ));
                }
            }
        }
        failures
    }

    /// Returns a player's statistics, zeroed if they have not finished a game.
    ///
    /// Does not check that the player exists; callers do.
    #[instrument(skip(self))]
    pub fn player_stats(&self, player: PlayerId) -> Result<PlayerStats, ArenaError> {
        debug!("Loading player stats");
        Ok(self
            .store
            .player_stats(player)?
            .unwrap_or_else(|| PlayerStats::empty(player)))
    }
}
