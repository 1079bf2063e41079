//! Server environment and game settings.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Default settings file looked up by `play`.
pub const DEFAULT_SETTINGS_FILE: &str = "lawn_defense.toml";

/// Leaderboard server settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ServerConfig {
    /// Listen address.
    host: String,
    /// Listen port.
    port: u16,
    /// SQLite database file.
    database_path: String,
    /// Verbose logging.
    debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: "game.db".to_string(),
            debug: true,
        }
    }
}

impl ServerConfig {
    /// Creates a configuration from explicit values.
    pub fn new(host: String, port: u16, database_path: String, debug: bool) -> Self {
        Self {
            host,
            port,
            database_path,
            debug,
        }
    }

    /// Reads `LAWN_HOST`, `LAWN_PORT`, `DATABASE_PATH` and `LAWN_DEBUG`.
    ///
    /// Unset variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `LAWN_PORT` is not a valid port number.
    #[instrument]
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = std::env::var("LAWN_HOST").unwrap_or(defaults.host);
        let port = match std::env::var("LAWN_PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid LAWN_PORT '{}': {}", raw, e)))?,
            Err(_) => defaults.port,
        };
        let database_path = std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path);
        let debug = std::env::var("LAWN_DEBUG")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.debug);

        let config = Self::new(host, port, database_path, debug);
        debug!(?config, "Server config loaded from environment");
        Ok(config)
    }

    /// Replaces the listen host.
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Replaces the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Replaces the database path.
    pub fn with_database_path(mut self, database_path: String) -> Self {
        self.database_path = database_path;
        self
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Player-side settings for `play`, loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Leaderboard server base URL; offline play when unset.
    server_url: Option<String>,
    /// Prefilled player name.
    player_name: String,
    /// Prefilled employee id.
    employee_id: String,
    /// Custom level file; the built-in level when unset.
    level: Option<PathBuf>,
}

impl GameSettings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read settings file: {}", e)))?;
        let settings: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse settings: {}", e)))?;
        info!(server = ?settings.server_url, "Settings loaded");
        Ok(settings)
    }

    /// Loads settings if the file exists, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but is invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            warn!("Settings file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Points the game at a leaderboard server.
    pub fn with_server_url(mut self, server_url: Option<String>) -> Self {
        self.server_url = server_url;
        self
    }

    /// Sets the prefilled player identity.
    pub fn with_player(mut self, player_name: String, employee_id: String) -> Self {
        self.player_name = player_name;
        self.employee_id = employee_id;
        self
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
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_parse_partial_toml() {
        let settings: GameSettings =
            toml::from_str("server_url = \"http://localhost:5000\"\nplayer_name = \"Ann\"\n")
                .expect("valid toml");
        assert_eq!(
            settings.server_url().as_deref(),
            Some("http://localhost:5000")
        );
        assert_eq!(settings.player_name(), "Ann");
        assert!(settings.employee_id().is_empty());
        assert!(settings.level().is_none());
    }

    #[test]
    fn missing_settings_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings =
            GameSettings::load_or_default(dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(settings, GameSettings::default());
    }

    #[test]
    fn server_config_bind_address() {
        let config = ServerConfig::default().with_port(8080);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
