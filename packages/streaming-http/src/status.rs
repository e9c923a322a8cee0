//! Accepted-status policy for a single request

use reqwest::StatusCode;

/// Which response statuses count as success for a call
///
/// Each request states its own policy so that endpoints answering
/// `201`/`202`/`204` are not misclassified as failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedStatus {
    /// Exactly one status code
    Exactly(StatusCode),
    /// Any of the listed status codes
    AnyOf(&'static [StatusCode]),
    /// Any `2xx` status
    Success,
}

impl ExpectedStatus {
    /// Only `200 OK`
    pub const OK: Self = Self::Exactly(StatusCode::OK);

    /// Check whether `status` satisfies this policy
    pub fn accepts(&self, status: StatusCode) -> bool {
        match self {
            Self::Exactly(expected) => status == *expected,
            Self::AnyOf(list) => list.contains(&status),
            Self::Success => status.is_success(),
        }
    }
}

impl Default for ExpectedStatus {
    fn default() -> Self {
        Self::OK
    }
}
