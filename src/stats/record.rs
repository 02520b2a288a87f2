//! Running totals for one player.
//!
//! Rates are stored as integers scaled by 100: a `win_rate` of `6667`
//! means 66.67%, an `efficiency` of `350` means 3.5 moves per win.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::types::PlayerId;

/// One participant's share of a completed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct ParticipantResult {
    player_id: PlayerId,
    won: bool,
    moves_made: u32,
}

/// Aggregated statistics for a player.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PlayerStats {
    pub(crate) player_id: PlayerId,
    pub(crate) games_played: i32,
    pub(crate) games_won: i32,
    pub(crate) total_moves: i32,
    pub(crate) win_rate: i32,
    pub(crate) efficiency: Option<i32>,
}

impl PlayerStats {
    /// Zeroed statistics for a player who has not finished a game.
    pub fn empty(player_id: PlayerId) -> Self {
        Self {
            player_id,
            games_played: 0,
            games_won: 0,
            total_moves: 0,
            win_rate: 0,
            efficiency: None,
        }
    }

    /// Folds one completed game into the previous totals.
    ///
    /// A missing previous row is treated as [`PlayerStats::empty`].
    #[instrument(skip(previous))]
    pub fn record(previous: Option<&PlayerStats>, result: &ParticipantResult) -> PlayerStats {
        let base = previous
            .cloned()
            .unwrap_or_else(|| PlayerStats::empty(result.player_id));

        let games_played = base.games_played.saturating_add(1);
        let games_won = base.games_won.saturating_add(i32::from(result.won));
        let moves = i32::try_from(result.moves_made).unwrap_or(i32::MAX);

        let efficiency = if result.won {
            let prior_total = i64::from(base.efficiency.unwrap_or(0)) * i64::from(base.games_won);
            let added = i64::from(result.moves_made) * 100;
            Some(saturate(div_round(prior_total + added, i64::from(games_won))))
        } else {
            base.efficiency
        };

        PlayerStats {
            player_id: result.player_id,
            games_played,
            games_won,
            total_moves: base.total_moves.saturating_add(moves),
            win_rate: saturate(div_round(
                i64::from(games_won) * 10_000,
                i64::from(games_played),
            )),
            efficiency,
        }
    }

    /// Win rate in percent (e.g. `66.67`).
    pub fn win_rate_percent(&self) -> f64 {
        f64::from(self.win_rate) / 100.0
    }

    /// Average moves per won game, if the player has won.
    pub fn average_moves_to_win(&self) -> Option<f64> {
        self.efficiency.map(|e| f64::from(e) / 100.0)
    }
}

/// Integer division rounding halves up, for non-negative operands.
fn div_round(numerator: i64, denominator: i64) -> i64 {
    if denominator <= 0 {
        return 0;
    }
    (2 * numerator + denominator) / (2 * denominator)
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
