//! Process configuration
//!
//! Secrets and connection details come from the environment (optionally via a
//! `.env` file) and are gathered once into an [`IngestConfig`] that is passed to
//! constructors explicitly.

use crate::client::DEFAULT_HOST_TEMPLATE;
use crate::fetcher::retry::DEFAULT_MAX_RETRIES;

/// Environment variable holding the database connection string
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "RIOT_API_KEY";

/// Default cap on distinct players considered by the match phase
pub const DEFAULT_MAX_PLAYERS: u32 = 50;
/// Default cap on match ids fetched per player
pub const DEFAULT_MATCHES_PER_PLAYER: u32 = 20;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable missing or empty
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
}

/// Limits applied by the match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLimits {
    /// Maximum distinct players considered
    pub max_players: u32,
    /// Maximum match ids fetched per player
    pub matches_per_player: u32,
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            matches_per_player: DEFAULT_MATCHES_PER_PLAYER,
        }
    }
}

/// Everything one ingestion run needs to connect and behave
#[derive(Clone)]
pub struct IngestConfig {
    /// Database connection string (`postgres://...` or `sqlite://...`)
    pub database_url: String,
    /// API key sent with every request
    pub api_key: String,
    /// Match phase limits
    pub limits: MatchLimits,
    /// Retry ceiling for 429 responses
    pub max_retries: u32,
    /// Upstream host template
    pub host_template: String,
}

impl std::fmt::Debug for IngestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestConfig")
            .field("database_url", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("limits", &self.limits)
            .field("max_retries", &self.max_retries)
            .field("host_template", &self.host_template)
            .finish()
    }
}

impl IngestConfig {
    /// Build a configuration with default limits
    pub fn new(database_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            api_key: api_key.into(),
            limits: MatchLimits::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            host_template: DEFAULT_HOST_TEMPLATE.to_string(),
        }
    }

    /// Read `DATABASE_URL` and `RIOT_API_KEY`, loading `.env` first if present
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingVar`] if either variable is unset or empty
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };
        Ok(Self::new(require(DATABASE_URL_VAR)?, require(API_KEY_VAR)?))
    }

    /// Replace the match phase limits
    pub fn with_limits(mut self, limits: MatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replace the 429 retry ceiling
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}
