//! Application settings and configuration structures.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::services::{RankMode, ScoreOrder, ScoreboardOptions};

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Quiz session behaviour
    pub game: GameSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 64KB)
    pub max_message_size: usize,

    /// Maximum frame size in bytes (default: 16KB)
    pub max_frame_size: usize,
}

/// Session, round and scoreboard behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct GameSettings {
    /// Length of generated session codes
    pub code_length: usize,

    /// Code generation attempts before giving up on collisions
    pub code_max_attempts: u32,

    /// Pause between a round's result and the next question, in milliseconds
    pub between_rounds_ms: u64,

    /// Period of round-tick broadcasts, in milliseconds
    pub tick_interval_ms: u64,

    /// Scoreboard tie ranking (dense or competition)
    pub ranking: RankMode,

    /// Scoreboard ordering (asc or desc)
    pub score_order: ScoreOrder,

    /// Only broadcast the top N scoreboard entries
    #[serde(default)]
    pub scoreboard_limit: Option<usize>,
}

/// Shortest accepted session code length.
pub const MIN_CODE_LENGTH: usize = 4;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the game settings are out of range.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("websocket.max_message_size", 65536_i64)? // 64KB
            .set_default("websocket.max_frame_size", 16384_i64)? // 16KB
            .set_default("game.code_length", 6_i64)?
            .set_default("game.code_max_attempts", 5_i64)?
            .set_default("game.between_rounds_ms", 2000_i64)?
            .set_default("game.tick_interval_ms", 1000_i64)?
            .set_default("game.ranking", "dense")?
            .set_default("game.score_order", "desc")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__GAME__BETWEEN_ROUNDS_MS=1500 -> game.between_rounds_ms = 1500
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.game.validate()?;
                Ok(settings)
            })
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl GameSettings {
    /// Reject values the session runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length < MIN_CODE_LENGTH {
            return Err(ConfigError::Message(format!(
                "game.code_length must be at least {}. Current value: {}",
                MIN_CODE_LENGTH, self.code_length
            )));
        }
        if self.code_max_attempts == 0 {
            return Err(ConfigError::Message(
                "game.code_max_attempts must be at least 1".into(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Message(
                "game.tick_interval_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn between_rounds(&self) -> Duration {
        Duration::from_millis(self.between_rounds_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Scoreboard options used for every broadcast scoreboard.
    pub fn scoreboard_options(&self) -> ScoreboardOptions {
        ScoreboardOptions {
            order: self.score_order,
            rank_mode: self.ranking,
            limit: self.scoreboard_limit,
            include_ids: false,
        }
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            code_length: 6,
            code_max_attempts: 5,
            between_rounds_ms: 2000,
            tick_interval_ms: 1000,
            ranking: RankMode::Dense,
            score_order: ScoreOrder::Descending,
            scoreboard_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_game_settings_are_valid() {
        let game = GameSettings::default();
        assert!(game.validate().is_ok());
        assert_eq!(game.between_rounds(), Duration::from_secs(2));
        assert_eq!(game.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_short_codes_rejected() {
        let game = GameSettings {
            code_length: 3,
            ..Default::default()
        };
        assert!(game.validate().is_err());
    }

    #[test]
    fn test_scoreboard_options_follow_settings() {
        let game = GameSettings {
            ranking: RankMode::Competition,
            score_order: ScoreOrder::Ascending,
            scoreboard_limit: Some(10),
            ..Default::default()
        };
        let options = game.scoreboard_options();
        assert_eq!(options.rank_mode, RankMode::Competition);
        assert_eq!(options.order, ScoreOrder::Ascending);
        assert_eq!(options.limit, Some(10));
        assert!(!options.include_ids);
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerSettings {
            host: "127.0.0.1".into(),
            port: 8080,
        };
        assert_eq!(server.socket_addr().unwrap().port(), 8080);
    }
}
