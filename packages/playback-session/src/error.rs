//! Playback session error types

use deckhand_streaming_http::{HttpError, StatusCode};
use thiserror::Error;

/// Errors surfaced by [`PlaybackSession`](crate::PlaybackSession) operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// No access token has been obtained yet
    #[error("no access token available; the token exchange has not succeeded yet")]
    AuthNotReady,

    /// Transport failure or unaccepted HTTP status
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Body was not JSON or lacked an expected field
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// An endpoint URL could not be built
    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl SessionError {
    /// Wrap a JSON decoding failure with the payload it concerned
    pub(crate) fn malformed(what: &str, error: serde_json::Error) -> Self {
        Self::MalformedResponse(format!("{}: {}", what, error))
    }

    /// HTTP status for status errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SessionError::Http(e) => e.status(),
            _ => None,
        }
    }

    /// True for connect/DNS/TLS failures
    pub fn is_transport(&self) -> bool {
        matches!(self, SessionError::Http(e) if e.is_transport())
    }

    /// True when no token was available for the call
    pub fn is_auth_not_ready(&self) -> bool {
        matches!(self, SessionError::AuthNotReady)
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_passthrough() {
        let err = SessionError::from(HttpError::Status {
            status: StatusCode::FORBIDDEN,
            body: String::new(),
        });
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(!err.is_transport());
        assert!(!err.is_auth_not_ready());
    }

    #[test]
    fn test_malformed_message_names_payload() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SessionError::malformed("token response", json_err);
        assert!(err.to_string().starts_with("malformed response: token response:"));
        assert_eq!(err.status(), None);
    }
}
