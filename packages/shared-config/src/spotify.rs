//! Spotify credential and endpoint configuration

use std::fmt;
use std::time::Duration;

use crate::{
    get_env_or_default, get_required_non_empty_env, parse_env, validate_http_url, ConfigError,
    ConfigResult,
};

/// Spotify accounts service token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Spotify Web API base URL
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Access tokens live for an hour; refresh a little before that
const DEFAULT_TOKEN_REFRESH_SECS: u64 = 3500;

/// Spotify OAuth credentials and endpoints
///
/// The credentials are consumed as opaque strings. `Debug` output redacts
/// the client secret and refresh token.
#[derive(Clone)]
pub struct SpotifyConfig {
    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Long-lived refresh token exchanged for access tokens
    pub refresh_token: String,

    /// Token endpoint URL
    pub token_url: String,

    /// Web API base URL (without trailing slash)
    pub api_url: String,

    /// Period of the background access-token refresh
    pub token_refresh_interval: Duration,
}

impl fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .field("token_refresh_interval", &self.token_refresh_interval)
            .finish()
    }
}

impl SpotifyConfig {
    /// Load Spotify configuration from environment variables
    ///
    /// # Errors
    /// - `ConfigError::MissingEnvVar` if a credential variable is not set
    /// - `ConfigError::InvalidValue` if a credential is blank or a number does not parse
    /// - `ConfigError::InvalidUrl` if an endpoint override is not an http(s) URL
    /// - `ConfigError::ValidationError` if the refresh interval is zero
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            client_id: get_required_non_empty_env("SPOTIFY_CLIENT_ID")?,
            client_secret: get_required_non_empty_env("SPOTIFY_CLIENT_SECRET")?,
            refresh_token: get_required_non_empty_env("SPOTIFY_REFRESH_TOKEN")?,
            token_url: get_env_or_default("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: get_env_or_default("SPOTIFY_API_URL", DEFAULT_API_URL),
            token_refresh_interval: Duration::from_secs(parse_env(
                "SPOTIFY_TOKEN_REFRESH_SECS",
                DEFAULT_TOKEN_REFRESH_SECS,
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration with explicit credentials and default endpoints
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            token_refresh_interval: Duration::from_secs(DEFAULT_TOKEN_REFRESH_SECS),
        }
    }

    /// Point the token exchange at a different endpoint (useful for testing)
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Point playback calls at a different API base (useful for testing)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Override the background refresh period
    pub fn with_token_refresh_interval(mut self, interval: Duration) -> Self {
        self.token_refresh_interval = interval;
        self
    }

    /// Check endpoint URLs and the refresh period
    pub fn validate(&self) -> ConfigResult<()> {
        validate_http_url("SPOTIFY_TOKEN_URL", &self.token_url)?;
        validate_http_url("SPOTIFY_API_URL", &self.api_url)?;

        if self.token_refresh_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "token refresh interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the full URL for a Web API path
    pub fn api_endpoint(&self, path: &str) -> String {
        let base = self.api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_new_config_uses_spotify_endpoints() {
        let config = SpotifyConfig::new("id", "secret", "refresh");
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token_refresh_interval, Duration::from_secs(3500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_endpoint() {
        let config = SpotifyConfig::new("id", "secret", "refresh");
        assert_eq!(
            config.api_endpoint("me/player/play"),
            "https://api.spotify.com/v1/me/player/play"
        );
        assert_eq!(
            config.api_endpoint("/me/player/next"),
            "https://api.spotify.com/v1/me/player/next"
        );
    }

    #[test]
    fn test_api_endpoint_with_trailing_slash() {
        let config =
            SpotifyConfig::new("id", "secret", "refresh").with_api_url("http://localhost:9000/v1/");
        assert_eq!(
            config.api_endpoint("me/player/pause"),
            "http://localhost:9000/v1/me/player/pause"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = SpotifyConfig::new("visible-id", "top-secret", "long-lived-refresh");
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("visible-id"));
        assert!(!debug_str.contains("top-secret"));
        assert!(!debug_str.contains("long-lived-refresh"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_zero_refresh_interval_rejected() {
        let config = SpotifyConfig::new("id", "secret", "refresh")
            .with_token_refresh_interval(Duration::ZERO);
        assert_matches!(config.validate(), Err(ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_from_env_requires_credentials() {
        temp_env::with_vars(
            [
                ("SPOTIFY_CLIENT_ID", Some("id")),
                ("SPOTIFY_CLIENT_SECRET", None),
                ("SPOTIFY_REFRESH_TOKEN", Some("refresh")),
            ],
            || {
                assert_matches!(
                    SpotifyConfig::from_env(),
                    Err(ConfigError::MissingEnvVar(name)) if name == "SPOTIFY_CLIENT_SECRET"
                );
            },
        );
    }

    #[test]
    fn test_from_env_with_overrides() {
        temp_env::with_vars(
            [
                ("SPOTIFY_CLIENT_ID", Some("id")),
                ("SPOTIFY_CLIENT_SECRET", Some("secret")),
                ("SPOTIFY_REFRESH_TOKEN", Some("refresh")),
                ("SPOTIFY_TOKEN_URL", Some("http://localhost:8080/api/token")),
                ("SPOTIFY_API_URL", Some("http://localhost:8080/v1")),
                ("SPOTIFY_TOKEN_REFRESH_SECS", Some("60")),
            ],
            || {
                let config = SpotifyConfig::from_env().unwrap();
                assert_eq!(config.token_url, "http://localhost:8080/api/token");
                assert_eq!(config.api_url, "http://localhost:8080/v1");
                assert_eq!(config.token_refresh_interval, Duration::from_secs(60));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_token_url() {
        temp_env::with_vars(
            [
                ("SPOTIFY_CLIENT_ID", Some("id")),
                ("SPOTIFY_CLIENT_SECRET", Some("secret")),
                ("SPOTIFY_REFRESH_TOKEN", Some("refresh")),
                ("SPOTIFY_TOKEN_URL", Some("accounts.spotify.com/api/token")),
            ],
            || {
                assert_matches!(
                    SpotifyConfig::from_env(),
                    Err(ConfigError::InvalidUrl { .. })
                );
            },
        );
    }
}
