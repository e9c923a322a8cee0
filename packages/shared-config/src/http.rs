//! HTTP transport configuration

use std::time::Duration;

use crate::{parse_env, ConfigError, ConfigResult};

/// Tuning for the streaming HTTP transport
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Longest wait for the next body chunk before the body is considered complete
    pub inactivity_timeout: Duration,

    /// Overall request timeout enforced by the underlying client
    pub request_timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Number of body chunks the response buffer holds before the producer waits
    pub buffer_capacity: usize,

    /// Largest response body accepted in memory
    pub max_body_bytes: usize,

    /// User agent sent with every request
    pub user_agent: String,
}

impl HttpConfig {
    /// Load HTTP configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();
        let config = Self {
            inactivity_timeout: Duration::from_millis(parse_env(
                "HTTP_INACTIVITY_TIMEOUT_MS",
                defaults.inactivity_timeout.as_millis() as u64,
            )?),
            request_timeout_secs: parse_env(
                "HTTP_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            connect_timeout_secs: parse_env(
                "HTTP_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            buffer_capacity: parse_env("HTTP_BUFFER_CAPACITY", defaults.buffer_capacity)?,
            max_body_bytes: parse_env("HTTP_MAX_BODY_BYTES", defaults.max_body_bytes)?,
            user_agent: defaults.user_agent,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the inactivity timeout (useful for testing)
    pub fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    /// Reject settings the transport cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.inactivity_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "inactivity timeout must be greater than zero".to_string(),
            ));
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "response buffer capacity must be at least one chunk".to_string(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max body size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Overall request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_millis(1000),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            buffer_capacity: 16,
            max_body_bytes: 1024 * 1024,
            user_agent: concat!("Deckhand/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
