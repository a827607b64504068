//! Octocrab client wrapper scoped to a specific repository.
//!
//! This module provides `OctocrabClient`, which wraps an `Octocrab` instance
//! and scopes all operations to a specific repository. This matches the design
//! where effects are repo-scoped (the `GitHubEffect` enum doesn't include repo info).

use octocrab::Octocrab;

use crate::effects::GitHubInterpreter;
use crate::types::{InstallationId, RepoId};

use super::error::GitHubApiError;

/// A GitHub API client scoped to a specific repository.
#[derive(Clone)]
pub struct OctocrabClient {
    /// The underlying octocrab client.
    client: Octocrab,

    /// The repository this client is scoped to.
    repo: RepoId,
}

impl OctocrabClient {
    /// Creates a new client scoped to the given repository.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    /// Creates a client from a GitHub token.
    pub fn from_token(token: impl Into<String>, repo: RepoId) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client, repo))
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    /// Returns the repository this client is scoped to.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Returns the repository owner.
    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    /// Returns the repository name.
    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }

    /// Builds a `/repos/{owner}/{repo}/...` route.
    pub(crate) fn route(&self, tail: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner(), self.repo_name(), tail)
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

/// Hands out authenticated, repo-scoped gateway handles for incoming events.
///
/// The webhook layer calls this once per delivery. Implementations decide how
/// credentials are obtained; token issuance is not this crate's concern.
pub trait ClientFactory: Clone + Send + Sync + 'static {
    /// The gateway handed to the event handler.
    type Client: GitHubInterpreter<Error = GitHubApiError> + Send + Sync;

    /// Returns a client for `repo`, authenticated for `installation` when the
    /// event carried one.
    fn client_for(
        &self,
        installation: Option<InstallationId>,
        repo: RepoId,
    ) -> Result<Self::Client, GitHubApiError>;
}

/// A [`ClientFactory`] backed by one pre-authenticated octocrab instance.
///
/// Every repository is reached with the same credentials, so the installation
/// id only serves as logging context.
#[derive(Clone)]
pub struct StaticTokenFactory {
    client: Octocrab,
}

impl StaticTokenFactory {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds the shared client from a personal or installation access token.
    pub fn from_token(token: impl Into<String>) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client))
    }
}

impl ClientFactory for StaticTokenFactory {
    type Client = OctocrabClient;

    fn client_for(
        &self,
        installation: Option<InstallationId>,
        repo: RepoId,
    ) -> Result<Self::Client, GitHubApiError> {
        tracing::debug!(
            repo = %repo,
            installation = ?installation,
            "Creating repository client"
        );
        Ok(OctocrabClient::new(self.client.clone(), repo))
    }
}

impl std::fmt::Debug for StaticTokenFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenFactory").finish_non_exhaustive()
    }
}
