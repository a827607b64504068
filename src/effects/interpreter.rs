//! Effect interpreter trait.
//!
//! This trait defines how effects are executed. The octocrab-backed
//! implementation lives in [`crate::github`]; tests use an in-memory one.

use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct FailingGitHub;
///
/// impl GitHubInterpreter for FailingGitHub {
///     type Error = GitHubApiError;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         Err(GitHubApiError::new(
///             GitHubErrorKind::Server,
///             format!("refusing {}", effect.name()),
///         ))
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}
