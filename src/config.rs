//! Arena configuration loaded from TOML.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::game::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::leaderboard::DEFAULT_LEADERBOARD_LIMIT;
use crate::registry::DEFAULT_MAX_NAME_LENGTH;

/// Runtime settings for an arena process.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArenaConfig {
    /// SQLite database file.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Board size used when a game is created without one.
    #[serde(default = "default_board_size")]
    default_board_size: usize,

    /// Leaderboard length used when no limit is given.
    #[serde(default = "default_leaderboard_limit")]
    leaderboard_limit: usize,

    /// Longest accepted player name, in characters.
    #[serde(default = "default_max_name_length")]
    max_name_length: usize,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

fn default_database_path() -> String {
    "strictly_arena.db".to_string()
}

fn default_board_size() -> usize {
    3
}

fn default_leaderboard_limit() -> usize {
    DEFAULT_LEADERBOARD_LIMIT
}

fn default_max_name_length() -> usize {
    DEFAULT_MAX_NAME_LENGTH
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            default_board_size: default_board_size(),
            leaderboard_limit: default_leaderboard_limit(),
            max_name_length: default_max_name_length(),
            log_filter: default_log_filter(),
        }
    }
}

impl ArenaConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(database_path = %config.database_path, "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces the database path, e.g. from a command-line override.
    pub fn with_database_path(mut self, database_path: impl Into<String>) -> Self {
        self.database_path = database_path.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.default_board_size) {
            return Err(ConfigError::new(format!(
                "default_board_size {} outside [{}, {}]",
                self.default_board_size, MIN_BOARD_SIZE, MAX_BOARD_SIZE
            )));
        }
        if self.max_name_length == 0 {
            return Err(ConfigError::new("max_name_length must be positive"));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ArenaConfig::from_toml("").expect("parse");
        assert_eq!(config, ArenaConfig::default());
        assert_eq!(*config.default_board_size(), 3);
        assert_eq!(*config.leaderboard_limit(), 3);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = ArenaConfig::from_toml(
            "database_path = \"/tmp/arena.db\"\nleaderboard_limit = 10\n",
        )
        .expect("parse");
        assert_eq!(config.database_path(), "/tmp/arena.db");
        assert_eq!(*config.leaderboard_limit(), 10);
        assert_eq!(*config.max_name_length(), 64);
    }

    #[test]
    fn test_out_of_range_board_size_rejected() {
        let err = ArenaConfig::from_toml("default_board_size = 12").expect_err("invalid");
        assert!(err.message.contains("default_board_size"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(ArenaConfig::from_toml("colour = \"blue\"").is_err());
    }
}
