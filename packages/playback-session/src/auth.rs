//! Refresh-grant token exchange helpers

use std::fmt;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use url::form_urlencoded;

use crate::error::{SessionError, SessionResult};

/// Content type of the token request body
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `Authorization` value for the token endpoint: `Basic base64(id:secret)`
pub fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    let credentials = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(credentials))
}

/// Form body exchanging `refresh_token` for a new access token
pub fn refresh_grant_body(refresh_token: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "refresh_token")
        .append_pair("refresh_token", refresh_token)
        .finish()
}

/// A bearer credential for the Web API
///
/// Expiry is not tracked from the server; the session replaces the token
/// on a fixed period. `Debug` output redacts the value.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    obtained_at: Instant,
}

impl AccessToken {
    /// Wrap a freshly obtained token
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            obtained_at: Instant::now(),
        }
    }

    /// Parse a token endpoint response body
    ///
    /// # Errors
    /// `SessionError::MalformedResponse` if the body is not JSON, lacks
    /// `access_token`, or the token is empty
    pub fn from_response(body: &[u8]) -> SessionResult<Self> {
        let response: TokenResponse = serde_json::from_slice(body)
            .map_err(|e| SessionError::malformed("token response", e))?;

        if response.access_token.is_empty() {
            return Err(SessionError::MalformedResponse(
                "token response: access_token is empty".to_string(),
            ));
        }

        if let Some(expires_in) = response.expires_in {
            tracing::debug!(
                expires_in,
                token_type = response.token_type.as_deref().unwrap_or("unknown"),
                "Token endpoint reported lifetime"
            );
        }

        Ok(Self::new(response.access_token))
    }

    /// The raw token string
    pub fn secret(&self) -> &str {
        &self.value
    }

    /// `Authorization` header value carrying this token
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }

    /// Time since the token was obtained
    pub fn age(&self) -> Duration {
        self.obtained_at.elapsed()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("age", &self.age())
            .finish()
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}
