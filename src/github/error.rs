//! GitHub API error types.
//!
//! Workflows never retry, so the categorisation here exists for diagnostics:
//! an operator reading the logs (or a test reading a workflow report) should
//! be able to tell an auth problem from a name collision from a GitHub outage
//! without parsing free text.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GitHubErrorKind {
    /// HTTP 401, or 403 without rate-limit markers.
    Unauthorized,

    /// HTTP 404: the reference, commit or repository doesn't exist (or is
    /// invisible to this installation).
    NotFound,

    /// HTTP 409, or 422 "Reference already exists".
    ///
    /// Creating a branch whose name is taken lands here.
    Conflict,

    /// HTTP 422 other than a name collision: GitHub rejected the request body
    /// (e.g. a tree referencing a missing object).
    Validation,

    /// HTTP 429, or 403 with rate-limit markers.
    RateLimited,

    /// HTTP 5xx.
    Server,

    /// No HTTP response: DNS, connect, TLS or timeout failures.
    Network,

    /// A response arrived but couldn't be turned into the expected data.
    InvalidResponse,

    /// Anything else.
    Other,
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GitHubErrorKind::Unauthorized => "unauthorized",
            GitHubErrorKind::NotFound => "not found",
            GitHubErrorKind::Conflict => "conflict",
            GitHubErrorKind::Validation => "validation failed",
            GitHubErrorKind::RateLimited => "rate limited",
            GitHubErrorKind::Server => "server error",
            GitHubErrorKind::Network => "network error",
            GitHubErrorKind::InvalidResponse => "invalid response",
            GitHubErrorKind::Other => "error",
        };
        f.write_str(s)
    }
}

/// A categorised GitHub API error.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The kind of error.
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if a response was received.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(
                f,
                "GitHub API {} (HTTP {}): {}",
                self.kind, code, self.message
            ),
            None => write!(f, "GitHub API {}: {}", self.kind, self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates an error without an octocrab source.
    pub fn new(kind: GitHubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error carrying an HTTP status but no octocrab source.
    pub fn with_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: categorize(Some(status_code), &message),
            status_code: Some(status_code),
            message,
            source: None,
        }
    }

    /// Creates an error for a response that didn't have the expected shape.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidResponse, message)
    }

    /// Categorises an octocrab error.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let (status_code, message) = match &err {
            octocrab::Error::GitHub { source, .. } => {
                (Some(source.status_code.as_u16()), source.message.clone())
            }
            other => (None, other.to_string()),
        };

        Self {
            kind: categorize(status_code, &message),
            status_code,
            message,
            source: Some(err),
        }
    }
}

/// Maps an HTTP status and GitHub's message onto an error kind.
///
/// This is a pure function extracted for testability.
pub fn categorize(status_code: Option<u16>, message: &str) -> GitHubErrorKind {
    match status_code {
        Some(401) => GitHubErrorKind::Unauthorized,
        Some(403) if is_rate_limit_error(message) => GitHubErrorKind::RateLimited,
        Some(403) => GitHubErrorKind::Unauthorized,
        Some(404) => GitHubErrorKind::NotFound,
        Some(409) => GitHubErrorKind::Conflict,
        Some(422) if is_already_exists_error(message) => GitHubErrorKind::Conflict,
        Some(422) => GitHubErrorKind::Validation,
        Some(429) => GitHubErrorKind::RateLimited,
        Some(code) if (500..600).contains(&code) => GitHubErrorKind::Server,
        Some(_) => GitHubErrorKind::Other,
        None if is_network_error(message) => GitHubErrorKind::Network,
        None => GitHubErrorKind::Other,
    }
}

/// GitHub answers a create-ref collision with 422 "Reference already exists".
fn is_already_exists_error(message: &str) -> bool {
    message.to_lowercase().contains("already exists")
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
}
