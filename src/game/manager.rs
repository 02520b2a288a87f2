//! Game session management with per-game serialization.
//!
//! The store is the only source of truth for a game. Every join and move
//! takes that game's lock, loads the current record, plans the transition
//! and commits it, so transitions on one game are totally ordered within a
//! process while different games proceed in parallel.
//!
//! Other processes or managers may share the store. Their writes are
//! caught by the store's uniqueness on `(game, seat)` and
//! `(game, move_number)`: a commit that loses such a race is re-planned
//! against the fresh record and reports the resulting rule violation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

use crate::error::ArenaError;
use crate::game::machine::{GameMachine, MoveTransition, validate_board_size};
use crate::game::{GameRecord, GameSession};
use crate::registry::PlayerRegistry;
use crate::stats::StatsAggregator;
use crate::store::ArenaStore;
use crate::types::{GameId, GameStatus, PlayerId};

/// Times a transition is re-planned after losing a commit race.
const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Serializes transitions on one game. Holds no game state.
type GameLock = Arc<Mutex<()>>;

/// Lock guards protect no data of their own, so poisoning is harmless.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Result of an accepted move.
#[derive(Debug, Clone, Getters)]
pub struct MoveOutcome {
    /// Snapshot after the move.
    session: GameSession,
    /// What the move did to the game.
    transition: MoveTransition,
    /// Non-fatal `StatsUpdateFailed` conditions raised after completion.
    stats_failures: Vec<ArenaError>,
}

impl MoveOutcome {
    /// Consumes the outcome, keeping only the snapshot.
    pub fn into_session(self) -> GameSession {
        self.session
    }
}

/// Drives every game's state machine and serializes transitions per game.
#[derive(Debug, Clone)]
pub struct GameManager {
    store: Arc<dyn ArenaStore>,
    players: PlayerRegistry,
    stats: StatsAggregator,
    locks: Arc<Mutex<HashMap<GameId, GameLock>>>,
}

impl GameManager {
    /// Creates a game manager over the given store and collaborators.
    #[instrument(skip_all)]
    pub fn new(
        store: Arc<dyn ArenaStore>,
        players: PlayerRegistry,
        stats: StatsAggregator,
    ) -> Self {
        info!("Creating game manager");
        Self {
            store,
            players,
            stats,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the lock for a game, creating it on first use.
    ///
    /// The registry lock is held only for the map lookup, never for I/O.
    fn game_lock(&self, id: GameId) -> GameLock {
        Arc::clone(lock(&self.locks).entry(id).or_default())
    }

    /// Drops the lock for a game that is finished or does not exist.
    ///
    /// Both states are final for this manager, so later callers may safely
    /// start from a fresh lock.
    fn release(&self, id: GameId, game_lock: &GameLock) {
        let mut locks = lock(&self.locks);
        if locks.get(&id).is_some_and(|held| Arc::ptr_eq(held, game_lock)) {
            locks.remove(&id);
            debug!(game_id = %id, "Game lock released");
        }
    }

    /// Number of games with a live lock.
    pub fn tracked_games(&self) -> usize {
        lock(&self.locks).len()
    }

    /// Loads the current record of a game from the store.
    fn load(&self, id: GameId) -> Result<GameRecord, ArenaError> {
        self.store.game(id)?.ok_or_else(|| {
            debug!(game_id = %id, "Game not found");
            ArenaError::game_not_found(id)
        })
    }

    /// Loads a machine for a locked game, dropping the lock if the game is
    /// unknown or already finished.
    fn load_locked(&self, id: GameId, game_lock: &GameLock) -> Result<GameMachine, ArenaError> {
        match self.load(id) {
            Ok(record) => {
                if record.session.status == GameStatus::Completed {
                    self.release(id, game_lock);
                }
                Ok(GameMachine::new(record))
            }
            Err(e) => {
                if e.kind().is_not_found() {
                    self.release(id, game_lock);
                }
                Err(e)
            }
        }
    }

    /// Decides whether a failed commit lost a race with another writer.
    ///
    /// Returns true when the stored record moved on since `planned_from`,
    /// in which case the caller re-plans against the new state.
    fn lost_race(&self, id: GameId, planned_from: &GameRecord, attempt: usize) -> bool {
        if attempt >= MAX_COMMIT_ATTEMPTS {
            return false;
        }
        match self.store.game(id) {
            Ok(Some(current)) => &current != planned_from,
            _ => false,
        }
    }

    /// Creates a new game in the waiting state.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `board_size` is outside `[3, 10]`.
    #[instrument(skip(self))]
    pub fn create(&self, board_size: usize) -> Result<GameSession, ArenaError> {
        validate_board_size(board_size).inspect_err(|e| warn!(error = %e, "Rejected game"))?;

        let session = self.store.insert_game(board_size, Utc::now().naive_utc())?;
        info!(game_id = %session.id, board_size, "Game created");
        Ok(session)
    }

    /// Seats a player in a waiting game. The second join activates it.
    ///
    /// # Errors
    ///
    /// `PlayerNotFound`, `GameNotFound`, `GameNotAcceptingPlayers`,
    /// `AlreadyJoined`, `GameFull`, or `StorageUnavailable`.
    #[instrument(skip(self))]
    pub fn join(&self, game_id: GameId, player_id: PlayerId) -> Result<GameSession, ArenaError> {
        self.players.get(player_id)?;
        let game_lock = self.game_lock(game_id);
        let _guard = lock(&game_lock);

        let mut attempt = 1;
        loop {
            let mut machine = self.load_locked(game_id, &game_lock)?;
            let planned = machine
                .plan_join(player_id, Utc::now().naive_utc())
                .inspect_err(|e| warn!(error = %e, "Join rejected"))?;

            if let Err(e) = self.store.commit_join(&planned.session, &planned.participant) {
                if self.lost_race(game_id, machine.record(), attempt) {
                    warn!(attempt, "Game changed during join, re-planning");
                    attempt += 1;
                    continue;
                }
                return Err(e.into());
            }
            machine.commit_join(planned);

            let session = machine.session().clone();
            info!(status = %session.status, current_turn = ?session.current_turn, "Player joined");
            return Ok(session);
        }
    }

    /// Plays a move for `player_id` at `(row, col)`.
    ///
    /// When the move ends the game, statistics are updated before the game
    /// lock is released. Stats failures do not undo the move; they are
    /// reported in [`MoveOutcome::stats_failures`].
    ///
    /// # Errors
    ///
    /// `GameNotFound`, `InvalidMove`, `GameNotActive`, `NotYourTurn`,
    /// `CellOccupied`, or `StorageUnavailable`. Every error leaves the game
    /// unchanged.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        row: i64,
        col: i64,
    ) -> Result<MoveOutcome, ArenaError> {
        let game_lock = self.game_lock(game_id);
        let guard = lock(&game_lock);

        let mut attempt = 1;
        let (machine, transition) = loop {
            let mut machine = self.load_locked(game_id, &game_lock)?;
            let planned = machine
                .plan_move(player_id, row, col, Utc::now().naive_utc())
                .inspect_err(|e| warn!(error = %e, "Move rejected"))?;

            if let Err(e) = self.store.commit_move(&planned.session, &planned.mv) {
                if self.lost_race(game_id, machine.record(), attempt) {
                    warn!(attempt, "Game changed during move, re-planning");
                    attempt += 1;
                    continue;
                }
                return Err(e.into());
            }
            let move_number = *planned.mv.move_number();
            let transition = machine.commit_move(planned);
            info!(move_number, ?transition, "Move committed");
            break (machine, transition);
        };

        let stats_failures = if transition.is_terminal() {
            info!(winner = ?machine.session().winner_id, draw = machine.session().is_draw, "Game completed");
            let failures = self.stats.record_completion(machine.record());
            drop(guard);
            self.release(game_id, &game_lock);
            failures
        } else {
            Vec::new()
        };

        Ok(MoveOutcome {
            session: machine.session().clone(),
            transition,
            stats_failures,
        })
    }

    /// Returns the current snapshot of a game.
    ///
    /// # Errors
    ///
    /// `GameNotFound` if the id is unknown.
    #[instrument(skip(self))]
    pub fn get(&self, game_id: GameId) -> Result<GameSession, ArenaError> {
        Ok(self.load(game_id)?.session)
    }

    /// Returns the snapshot, seats and move log of a game.
    ///
    /// # Errors
    ///
    /// `GameNotFound` if the id is unknown.
    #[instrument(skip(self))]
    pub fn record(&self, game_id: GameId) -> Result<GameRecord, ArenaError> {
        self.load(game_id)
    }

    /// Re-runs statistics aggregation for a completed game.
    ///
    /// Players already counted for this game are skipped, so this is safe to
    /// call after a `StatsUpdateFailed` and safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// `GameNotFound`, or `GameNotActive` if the game has not completed.
    #[instrument(skip(self))]
    pub fn reconcile_stats(&self, game_id: GameId) -> Result<Vec<ArenaError>, ArenaError> {
        let record = self.load(game_id)?;
        let status = record.session.status;
        if status != GameStatus::Completed {
            return Err(ArenaError::game_not_active(game_id, status));
        }
        Ok(self.stats.record_completion(&record))
    }
}
