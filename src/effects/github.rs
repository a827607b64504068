//! GitHub API effect types.
//!
//! These types describe GitHub API operations as data, without executing them.
//! The interpreter in [`crate::github`] executes these effects against the
//! actual GitHub API; tests execute them against an in-memory repository.

use serde::{Deserialize, Serialize};

use crate::types::{
    CommentId, CommitAuthor, CommitData, GitReference, IssueNumber, PullRequestData, Sha,
    TreeEntry,
};

/// Request body for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewPullRequest {
    pub title: String,
    /// Branch containing the changes.
    pub head: String,
    /// Branch the changes should be merged into.
    pub base: String,
    pub body: String,
}

/// A GitHub API effect.
///
/// Each variant describes a GitHub API operation. Effects are repo-scoped:
/// the interpreter is constructed with a `RepoId`, so effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── References ───────────────────────────────────────────────────────────
    /// Resolve a reference. `ref_name` is relative to `refs/` (e.g. `heads/main`).
    ///
    /// Fails with not-found if the reference does not exist.
    GetRef { ref_name: String },

    /// Create a reference. `ref_name` is fully qualified (e.g. `refs/heads/x`).
    ///
    /// Fails if a reference with that name already exists.
    CreateRef { ref_name: String, sha: Sha },

    /// Repoint an existing reference. `ref_name` is relative to `refs/`.
    ///
    /// With `force`, the update need not be a fast-forward.
    UpdateRef {
        ref_name: String,
        sha: Sha,
        force: bool,
    },

    // ─── Objects ──────────────────────────────────────────────────────────────
    /// Create a tree from `entries` layered over `base_tree`.
    CreateTree {
        base_tree: Sha,
        entries: Vec<TreeEntry>,
    },

    /// Fetch a commit object.
    GetCommit { sha: Sha },

    /// Create a commit. The tree and every parent must already exist.
    CreateCommit {
        message: String,
        author: CommitAuthor,
        tree: Sha,
        parents: Vec<Sha>,
    },

    // ─── Pull Requests ────────────────────────────────────────────────────────
    /// Open a pull request.
    CreatePullRequest(NewPullRequest),

    // ─── Comments ─────────────────────────────────────────────────────────────
    /// Post a new comment on an issue or PR conversation.
    PostComment { issue: IssueNumber, body: String },
}

impl GitHubEffect {
    /// Short, stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::GetRef { .. } => "get_ref",
            GitHubEffect::CreateRef { .. } => "create_ref",
            GitHubEffect::UpdateRef { .. } => "update_ref",
            GitHubEffect::CreateTree { .. } => "create_tree",
            GitHubEffect::GetCommit { .. } => "get_commit",
            GitHubEffect::CreateCommit { .. } => "create_commit",
            GitHubEffect::CreatePullRequest(_) => "create_pull_request",
            GitHubEffect::PostComment { .. } => "post_comment",
        }
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `GetRef`, `CreateRef` and `UpdateRef`.
    Ref(GitReference),

    /// Response to `CreateTree`.
    Tree {
        /// The SHA of the new tree.
        sha: Sha,
    },

    /// Response to `GetCommit` and `CreateCommit`.
    Commit(CommitData),

    /// Response to `CreatePullRequest`.
    PullRequest(PullRequestData),

    /// Response to `PostComment`.
    CommentPosted {
        /// The ID of the newly created comment.
        id: CommentId,
    },
}

impl GitHubResponse {
    /// Short, stable name for logging and mismatch errors.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubResponse::Ref(_) => "ref",
            GitHubResponse::Tree { .. } => "tree",
            GitHubResponse::Commit(_) => "commit",
            GitHubResponse::PullRequest(_) => "pull_request",
            GitHubResponse::CommentPosted { .. } => "comment_posted",
        }
    }
}
