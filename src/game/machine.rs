//! Per-game state machine: Waiting → Active → Completed.
//!
//! Transitions are split into a *plan* step that validates against the
//! current record without touching it, and a *commit* step that installs
//! the planned state once the store has accepted it. A rejected or
//! unpersisted plan therefore leaves the game exactly as it was.

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use crate::board::{check_winner, is_full, validate_coordinates};
use crate::error::{ArenaError, ArenaErrorKind};
use crate::game::invariants::{GameInvariants, InvariantSet};
use crate::game::{GameRecord, GameSession, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::types::{GameStatus, Move, Participant, PlayerId};

/// Outcome of a legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTransition {
    /// Game continues; `next` holds the turn.
    InProgress {
        /// Player who moves next.
        next: PlayerId,
    },
    /// This move completed a line.
    Won(PlayerId),
    /// This move filled the board without a winner.
    Draw,
}

impl MoveTransition {
    /// Returns true if the move ended the game.
    pub fn is_terminal(self) -> bool {
        !matches!(self, MoveTransition::InProgress { .. })
    }
}

/// A validated join waiting to be persisted.
#[derive(Debug, Clone)]
pub(crate) struct PlannedJoin {
    pub(crate) session: GameSession,
    pub(crate) participant: Participant,
}

/// A validated move waiting to be persisted.
#[derive(Debug, Clone)]
pub(crate) struct PlannedMove {
    pub(crate) session: GameSession,
    pub(crate) mv: Move,
    pub(crate) transition: MoveTransition,
}

/// Checks a requested board size against the supported range.
pub(crate) fn validate_board_size(board_size: usize) -> Result<(), ArenaError> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&board_size) {
        Ok(())
    } else {
        Err(ArenaError::new(
            ArenaErrorKind::InvalidConfiguration,
            format!(
                "board size {board_size} outside [{MIN_BOARD_SIZE}, {MAX_BOARD_SIZE}]"
            ),
        ))
    }
}

/// One game's record, loaded for a single transition under its game lock.
#[derive(Debug)]
pub(crate) struct GameMachine {
    record: GameRecord,
}

impl GameMachine {
    pub(crate) fn new(record: GameRecord) -> Self {
        Self { record }
    }

    pub(crate) fn record(&self) -> &GameRecord {
        &self.record
    }

    pub(crate) fn session(&self) -> &GameSession {
        &self.record.session
    }

    /// Validates a join and computes the resulting state.
    #[instrument(skip(self), fields(game_id = %self.record.session.id))]
    pub(crate) fn plan_join(
        &self,
        player: PlayerId,
        now: NaiveDateTime,
    ) -> Result<PlannedJoin, ArenaError> {
        let session = &self.record.session;

        if session.status != GameStatus::Waiting {
            return Err(ArenaError::new(
                ArenaErrorKind::GameNotAcceptingPlayers,
                format!("game {} is {}", session.id, session.status),
            ));
        }
        if self.record.is_participant(player) {
            return Err(ArenaError::new(
                ArenaErrorKind::AlreadyJoined,
                format!("player {player} already joined game {}", session.id),
            ));
        }
        if self.record.participants.len() >= 2 {
            return Err(ArenaError::new(
                ArenaErrorKind::GameFull,
                format!("game {} already has two players", session.id),
            ));
        }

        let order = if self.record.participants.is_empty() { 1 } else { 2 };
        let participant = Participant::new(session.id, player, order, now);

        let mut next = session.clone();
        if order == 2 {
            let first = self
                .record
                .participants
                .iter()
                .find(|p| *p.order() == 1)
                .map(|p| *p.player_id())
                .unwrap_or(player);
            next.status = GameStatus::Active;
            next.current_turn = Some(first);
        }

        debug!(order, activates = order == 2, "Join planned");
        Ok(PlannedJoin {
            session: next,
            participant,
        })
    }

    /// Installs a persisted join.
    pub(crate) fn commit_join(&mut self, planned: PlannedJoin) {
        self.record.session = planned.session;
        self.record.participants.push(planned.participant);
        self.debug_check();
    }

    /// Validates a move and computes the resulting state.
    ///
    /// Checks run in order: coordinates, status, turn, occupancy.
    #[instrument(skip(self), fields(game_id = %self.record.session.id))]
    pub(crate) fn plan_move(
        &self,
        player: PlayerId,
        row: i64,
        col: i64,
        now: NaiveDateTime,
    ) -> Result<PlannedMove, ArenaError> {
        let session = &self.record.session;

        if !validate_coordinates(&session.grid, row, col) {
            return Err(ArenaError::new(
                ArenaErrorKind::InvalidMove,
                format!(
                    "({row}, {col}) is outside the {n}x{n} board",
                    n = session.board_size
                ),
            ));
        }
        // Both lie in [0, N) once validated.
        let (r, c) = (row as usize, col as usize);

        if session.status != GameStatus::Active {
            return Err(ArenaError::game_not_active(session.id, session.status));
        }
        if session.current_turn != Some(player) {
            return Err(ArenaError::new(
                ArenaErrorKind::NotYourTurn,
                match session.current_turn {
                    Some(turn) => format!("waiting for player {turn}, not {player}"),
                    None => format!("no turn is open for player {player}"),
                },
            ));
        }
        if !session.grid.is_empty_at(r, c) {
            return Err(ArenaError::new(
                ArenaErrorKind::CellOccupied,
                format!("cell ({r}, {c}) is already taken"),
            ));
        }

        let move_number = self.next_move_number()?;
        let mv = Move::new(session.id, player, r, c, move_number, now);

        let mut next = session.clone();
        next.grid.place(r, c, player);

        let transition = if let Some(winner) = check_winner(&next.grid) {
            next.status = GameStatus::Completed;
            next.winner_id = Some(winner);
            next.is_draw = false;
            next.current_turn = None;
            next.completed_at = Some(now);
            MoveTransition::Won(winner)
        } else if is_full(&next.grid) {
            next.status = GameStatus::Completed;
            next.winner_id = None;
            next.is_draw = true;
            next.current_turn = None;
            next.completed_at = Some(now);
            MoveTransition::Draw
        } else {
            let opponent = self.opponent_of(player)?;
            next.current_turn = Some(opponent);
            MoveTransition::InProgress { next: opponent }
        };

        debug!(move_number, ?transition, "Move planned");
        Ok(PlannedMove {
            session: next,
            mv,
            transition,
        })
    }

    /// Installs a persisted move.
    pub(crate) fn commit_move(&mut self, planned: PlannedMove) -> MoveTransition {
        self.record.session = planned.session;
        self.record.moves.push(planned.mv);
        self.debug_check();
        planned.transition
    }

    /// Move numbers come from the log owned by this machine, never a count query.
    fn next_move_number(&self) -> Result<u32, ArenaError> {
        u32::try_from(self.record.moves.len() + 1).map_err(|_| {
            ArenaError::new(
                ArenaErrorKind::InvalidMove,
                "move log exceeds the supported length",
            )
        })
    }

    fn opponent_of(&self, player: PlayerId) -> Result<PlayerId, ArenaError> {
        self.record
            .participants
            .iter()
            .map(|p| *p.player_id())
            .find(|id| *id != player)
            .ok_or_else(|| {
                ArenaError::game_not_active(self.record.session.id, self.record.session.status)
            })
    }

    fn debug_check(&self) {
        debug_assert!(
            GameInvariants::check_all(&self.record).is_ok(),
            "game invariants violated: {:?}",
            GameInvariants::check_all(&self.record)
        );
    }
}
