//! Failures raised by an [`ArenaStore`](crate::ArenaStore).
//!
//! Both stores report through this one type; the arena maps every
//! `DbError` to `StorageUnavailable` and never to a rule violation.

use derive_more::{Display, Error};

/// A store could not read or write arena state.
#[derive(Debug, Clone, Display, Error)]
#[display("Arena store failure: {} at {}:{}", message, file, line)]
pub struct DbError {
    /// What the store was doing and why it failed.
    pub message: String,
    /// Line of the call that raised the failure.
    pub line: u32,
    /// Source file of the call that raised the failure.
    pub file: &'static str,
}

impl DbError {
    /// Records a store failure at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(format!("SQLite statement rejected: {err}"))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("SQLite database unreachable: {err}"))
    }
}

impl From<serde_json::Error> for DbError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("stored grid is not a valid square of player ids: {err}"))
    }
}
