//! Player registry: creates and fetches player identities.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::error::{ArenaError, ArenaErrorKind};
use crate::store::ArenaStore;
use crate::types::{Player, PlayerId};

/// Longest accepted player name, in characters, unless configured otherwise.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 64;

/// Service layer for player identities.
#[derive(Debug, Clone)]
pub struct PlayerRegistry {
    store: Arc<dyn ArenaStore>,
    max_name_length: usize,
}

impl PlayerRegistry {
    /// Creates a registry backed by the given store.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn ArenaStore>, max_name_length: usize) -> Self {
        info!("Creating PlayerRegistry");
        Self {
            store,
            max_name_length,
        }
    }

    /// Registers a new player.
    ///
    /// The name is trimmed; it must be non-empty and at most the configured
    /// length.
    ///
    /// # Errors
    ///
    /// `InvalidName` for a rejected name, `StorageUnavailable` on store faults.
    #[instrument(skip(self))]
    pub fn create(&self, name: &str) -> Result<Player, ArenaError> {
        let name = name.trim();
        if name.is_empty() {
            warn!("Rejected empty player name");
            return Err(ArenaError::new(
                ArenaErrorKind::InvalidName,
                "player name must not be empty",
            ));
        }
        let length = name.chars().count();
        if length > self.max_name_length {
            warn!(length, max = self.max_name_length, "Rejected long player name");
            return Err(ArenaError::new(
                ArenaErrorKind::InvalidName,
                format!(
                    "player name has {length} characters, at most {} allowed",
                    self.max_name_length
                ),
            ));
        }

        let player = self.store.insert_player(name, Utc::now().naive_utc())?;
        info!(player_id = %player.id(), name = %player.name(), "Player registered");
        Ok(player)
    }

    /// Fetches a player by id.
    ///
    /// # Errors
    ///
    /// `PlayerNotFound` if no such player exists.
    #[instrument(skip(self))]
    pub fn get(&self, id: PlayerId) -> Result<Player, ArenaError> {
        debug!("Looking up player");
        self.store
            .player(id)?
            .ok_or_else(|| ArenaError::player_not_found(id))
    }
}
