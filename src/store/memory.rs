//! In-process store guarded by a single mutex.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use tracing::{debug, info, instrument};

use crate::db::DbError;
use crate::game::{GameRecord, GameSession};
use crate::stats::PlayerStats;
use crate::store::{ArenaStore, StatsFold, StatsUpdate};
use crate::types::{GameId, Move, Participant, Player, PlayerId};

#[derive(Debug, Default)]
struct MemoryState {
    next_player_id: i32,
    next_game_id: i32,
    players: BTreeMap<PlayerId, Player>,
    games: BTreeMap<GameId, GameRecord>,
    stats: BTreeMap<PlayerId, PlayerStats>,
    ledger: HashSet<(GameId, PlayerId)>,
}

/// Volatile [`ArenaStore`] for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating MemoryStore");
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, DbError> {
        self.state
            .lock()
            .map_err(|_| DbError::new("memory store lock poisoned"))
    }
}

/// Orders leaderboard rows: wins desc, efficiency asc, id asc.
pub(crate) fn rank_order(a: &PlayerStats, b: &PlayerStats) -> Ordering {
    b.games_won
        .cmp(&a.games_won)
        .then_with(|| match (a.efficiency, b.efficiency) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.player_id.cmp(&b.player_id))
}

impl ArenaStore for MemoryStore {
    #[instrument(skip(self))]
    fn insert_player(&self, name: &str, _created_at: NaiveDateTime) -> Result<Player, DbError> {
        let mut state = self.state()?;
        state.next_player_id += 1;
        let player = Player::new(PlayerId::new(state.next_player_id), name.to_string());
        state.players.insert(*player.id(), player.clone());
        debug!(player_id = %player.id(), "Player stored");
        Ok(player)
    }

    #[instrument(skip(self))]
    fn player(&self, id: PlayerId) -> Result<Option<Player>, DbError> {
        Ok(self.state()?.players.get(&id).cloned())
    }

    #[instrument(skip(self))]
    fn insert_game(
        &self,
        board_size: usize,
        created_at: NaiveDateTime,
    ) -> Result<GameSession, DbError> {
        let mut state = self.state()?;
        state.next_game_id += 1;
        let session = GameSession::waiting(GameId::new(state.next_game_id), board_size, created_at);
        state.games.insert(
            session.id,
            GameRecord::new(session.clone(), Vec::new(), Vec::new()),
        );
        debug!(game_id = %session.id, "Game stored");
        Ok(session)
    }

    #[instrument(skip(self))]
    fn game(&self, id: GameId) -> Result<Option<GameRecord>, DbError> {
        Ok(self.state()?.games.get(&id).cloned())
    }

    #[instrument(skip(self, session, participant), fields(game_id = %session.id))]
    fn commit_join(
        &self,
        session: &GameSession,
        participant: &Participant,
    ) -> Result<(), DbError> {
        let mut state = self.state()?;
        let record = state
            .games
            .get_mut(&session.id)
            .ok_or_else(|| DbError::new(format!("game {} missing", session.id)))?;
        if record
            .participants
            .iter()
            .any(|p| p.player_id() == participant.player_id() || p.order() == participant.order())
        {
            return Err(DbError::new("participant seat already taken"));
        }
        record.participants.push(participant.clone());
        record.session = session.clone();
        Ok(())
    }

    #[instrument(skip(self, session, mv), fields(game_id = %session.id, move_number = mv.move_number()))]
    fn commit_move(&self, session: &GameSession, mv: &Move) -> Result<(), DbError> {
        let mut state = self.state()?;
        let record = state
            .games
            .get_mut(&session.id)
            .ok_or_else(|| DbError::new(format!("game {} missing", session.id)))?;
        let expected = record.moves.len() + 1;
        if usize::try_from(*mv.move_number()).ok() != Some(expected) {
            return Err(DbError::new(format!(
                "move number {} out of sequence, expected {}",
                mv.move_number(),
                expected
            )));
        }
        record.moves.push(mv.clone());
        record.session = session.clone();
        Ok(())
    }

    #[instrument(skip(self))]
    fn player_stats(&self, id: PlayerId) -> Result<Option<PlayerStats>, DbError> {
        Ok(self.state()?.stats.get(&id).cloned())
    }

    #[instrument(skip(self, fold))]
    fn update_stats(
        &self,
        game: GameId,
        player: PlayerId,
        fold: StatsFold<'_>,
    ) -> Result<StatsUpdate, DbError> {
        let mut state = self.state()?;
        if state.ledger.contains(&(game, player)) {
            return Ok(StatsUpdate::AlreadyRecorded);
        }
        let next = fold(state.stats.get(&player));
        state.stats.insert(player, next.clone());
        state.ledger.insert((game, player));
        Ok(StatsUpdate::Applied(next))
    }

    #[instrument(skip(self))]
    fn leaderboard(&self, limit: usize) -> Result<Vec<(Player, PlayerStats)>, DbError> {
        let state = self.state()?;
        let mut ranked: Vec<&PlayerStats> =
            state.stats.values().filter(|s| s.games_won > 0).collect();
        ranked.sort_by(|a, b| rank_order(a, b));

        ranked
            .into_iter()
            .take(limit)
            .map(|stats| -> Result<(Player, PlayerStats), DbError> {
                let player = state.players.get(&stats.player_id).cloned().ok_or_else(|| {
                    DbError::new(format!("stats row for unknown player {}", stats.player_id))
                })?;
                Ok((player, stats.clone()))
            })
            .collect()
    }
}
