//! First-class invariants for game records.
//!
//! Invariants are logical properties that must hold at every observable
//! point of a game's life. The state machine checks them in debug builds
//! after each transition; tests check them directly.

use crate::board::Square;
use crate::game::GameRecord;
use crate::types::GameStatus;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: every occupied cell belongs to a participant of the game.
pub struct GridOwnership;

impl Invariant<GameRecord> for GridOwnership {
    fn holds(record: &GameRecord) -> bool {
        record.session.grid.squares().iter().all(|sq| match sq {
            Square::Empty => true,
            Square::Occupied(player) => record.is_participant(*player),
        })
    }

    fn description() -> &'static str {
        "Grid cells are empty or held by a participant"
    }
}

/// Invariant: status, seats, turn and outcome agree with each other.
pub struct StatusConsistency;

impl Invariant<GameRecord> for StatusConsistency {
    fn holds(record: &GameRecord) -> bool {
        let session = &record.session;
        let seats = record.participants.len();
        match session.status {
            GameStatus::Waiting => {
                seats <= 1
                    && session.current_turn.is_none()
                    && session.winner_id.is_none()
                    && !session.is_draw
            }
            GameStatus::Active => {
                seats == 2
                    && session
                        .current_turn
                        .is_some_and(|turn| record.is_participant(turn))
                    && session.winner_id.is_none()
                    && !session.is_draw
            }
            GameStatus::Completed => {
                session.current_turn.is_none()
                    && session.completed_at.is_some()
                    && (session.winner_id.is_some() != session.is_draw)
            }
        }
    }

    fn description() -> &'static str {
        "Status matches seats, turn and outcome"
    }
}

/// Invariant: move numbers form 1..k and match the grid.
pub struct ContiguousMoves;

impl Invariant<GameRecord> for ContiguousMoves {
    fn holds(record: &GameRecord) -> bool {
        let numbered = record
            .moves
            .iter()
            .enumerate()
            .all(|(index, mv)| usize::try_from(*mv.move_number()).ok() == Some(index + 1));
        let occupied = record
            .session
            .grid
            .squares()
            .iter()
            .filter(|sq| **sq != Square::Empty)
            .count();
        numbered && occupied == record.moves.len()
    }

    fn description() -> &'static str {
        "Move numbers are 1..k with one move per occupied cell"
    }
}

/// Every invariant a game record must satisfy.
pub type GameInvariants = (GridOwnership, StatusConsistency, ContiguousMoves);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameSession;
    use crate::types::{GameId, Participant, PlayerId};
    use chrono::Utc;

    fn empty_record() -> GameRecord {
        let session = GameSession::waiting(GameId::new(1), 3, Utc::now().naive_utc());
        GameRecord::new(session, Vec::new(), Vec::new())
    }

    #[test]
    fn test_fresh_game_holds() {
        assert!(GameInvariants::check_all(&empty_record()).is_ok());
    }

    #[test]
    fn test_stranger_on_grid_violates_ownership() {
        let mut record = empty_record();
        record.session.grid.place(0, 0, PlayerId::new(42));
        assert!(!GridOwnership::holds(&record));
        let violations = GameInvariants::check_all(&record).expect_err("violations");
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_active_without_turn_violates_status() {
        let mut record = empty_record();
        let now = Utc::now().naive_utc();
        for (order, id) in [(1, 1), (2, 2)] {
            record.participants.push(Participant::new(
                GameId::new(1),
                PlayerId::new(id),
                order,
                now,
            ));
        }
        record.session.status = GameStatus::Active;
        assert!(!StatusConsistency::holds(&record));
        record.session.current_turn = Some(PlayerId::new(1));
        assert!(StatusConsistency::holds(&record));
    }

    #[test]
    fn test_completed_with_winner_and_draw_violates_status() {
        let mut record = empty_record();
        record.session.status = GameStatus::Completed;
        record.session.completed_at = Some(Utc::now().naive_utc());
        record.session.is_draw = true;
        record.session.winner_id = Some(PlayerId::new(1));
        assert!(!StatusConsistency::holds(&record));
    }
}
