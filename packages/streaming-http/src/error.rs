//! Error types for the streaming HTTP client

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while performing a request
#[derive(Error, Debug)]
pub enum HttpError {
    /// The underlying client could not be built
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Header name or value rejected by the transport
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Connect, DNS, TLS or mid-body transport failure
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a status the caller did not accept
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Response body exceeded the configured memory bound
    #[error("response body exceeded {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl HttpError {
    /// HTTP status for `Status` errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for connect/DNS/TLS/stream failures
    pub fn is_transport(&self) -> bool {
        matches!(self, HttpError::Transport(_))
    }

    /// True when the server answered but with an unaccepted status
    pub fn is_status(&self) -> bool {
        matches!(self, HttpError::Status { .. })
    }
}

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let err = HttpError::Status {
            status: StatusCode::FORBIDDEN,
            body: "no".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(err.is_status());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_non_status_errors_have_no_status() {
        let err = HttpError::BodyTooLarge { limit: 10 };
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "response body exceeded 10 bytes");
    }
}
