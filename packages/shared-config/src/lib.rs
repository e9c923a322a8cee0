//! Shared configuration types for Deckhand
//!
//! Configuration is read from environment variables (optionally seeded
//! from a `.env` file). The Spotify credentials are opaque strings to the
//! rest of the workspace; this crate only checks that they are present.
//!
//! # Environment Variables
//!
//! - `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`, `SPOTIFY_REFRESH_TOKEN` (required)
//! - `SPOTIFY_TOKEN_URL`, `SPOTIFY_API_URL`, `SPOTIFY_TOKEN_REFRESH_SECS`
//! - `HTTP_INACTIVITY_TIMEOUT_MS`, `HTTP_REQUEST_TIMEOUT_SECS`,
//!   `HTTP_CONNECT_TIMEOUT_SECS`, `HTTP_BUFFER_CAPACITY`, `HTTP_MAX_BODY_BYTES`
//! - `ENVIRONMENT`, `RUST_LOG` / `LOG_LEVEL`

mod error;
mod http;
mod spotify;

pub use error::{ConfigError, ConfigResult};
pub use http::HttpConfig;
pub use spotify::SpotifyConfig;

use std::env;

/// Configuration shared by everything that drives a playback session
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Spotify credentials and endpoints
    pub spotify: SpotifyConfig,

    /// Transport tuning
    pub http: HttpConfig,

    /// Environment mode (development, production)
    pub environment: Environment,

    /// Log level (from RUST_LOG or LOG_LEVEL)
    pub log_level: String,
}

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        })
    }
}

impl Environment {
    /// Production runs log without ANSI colours or targets
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl CommonConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            spotify: SpotifyConfig::from_env()?,
            http: HttpConfig::from_env()?,
            environment: get_env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env::var("RUST_LOG")
                .or_else(|_| env::var("LOG_LEVEL"))
                .unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Seed the process environment from `.env` (if present), then load
    pub fn load() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }
}

/// Helper function to get a required environment variable
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Helper function to get a required environment variable that must not be blank
pub fn get_required_non_empty_env(name: &str) -> ConfigResult<String> {
    let value = get_required_env(name)?;
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(name, "value cannot be empty"));
    }
    Ok(value)
}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::invalid(name, format!("{}", e))),
        Err(_) => Ok(default),
    }
}

/// Check that `value` is an absolute http(s) URL
pub(crate) fn validate_http_url(name: &str, value: &str) -> ConfigResult<()> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            name: name.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
