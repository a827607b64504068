//! GitHub webhook event types.
//!
//! Only `issue_comment` deliveries carry slash commands, so that is the only
//! event modelled here. Comments on the conversation tab of a pull request
//! arrive as `issue_comment` too.

use serde::{Deserialize, Serialize};

use crate::types::{CommentId, InstallationId, IssueNumber, RepoId};

/// A parsed GitHub webhook event.
///
/// Event types the bot doesn't handle are represented by the parser returning
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubEvent {
    /// An issue or PR comment was created, edited, or deleted.
    IssueComment(IssueCommentEvent),
}

impl GitHubEvent {
    /// Returns the repository this event belongs to.
    pub fn repo_id(&self) -> &RepoId {
        match self {
            GitHubEvent::IssueComment(e) => &e.repo,
        }
    }

    /// Returns the app installation the delivery was sent for, if any.
    pub fn installation_id(&self) -> Option<InstallationId> {
        match self {
            GitHubEvent::IssueComment(e) => e.installation_id,
        }
    }
}

/// Action performed on an issue comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    Created,
    Edited,
    Deleted,
    /// An action GitHub may add later. Kept rather than rejected.
    Other(String),
}

impl CommentAction {
    pub fn from_api_str(action: &str) -> Self {
        match action {
            "created" => CommentAction::Created,
            "edited" => CommentAction::Edited,
            "deleted" => CommentAction::Deleted,
            other => CommentAction::Other(other.to_string()),
        }
    }
}

/// An issue/PR comment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    /// The repository.
    pub repo: RepoId,

    /// The action that triggered this event.
    pub action: CommentAction,

    /// The issue or pull request the comment was posted on.
    pub issue_number: IssueNumber,

    /// True when `issue_number` refers to a pull request.
    pub is_pull_request: bool,

    /// The comment ID.
    pub comment_id: CommentId,

    /// The comment body text. Empty when GitHub omits it.
    pub body: String,

    /// The comment author's login name.
    pub author_login: String,

    /// The app installation the delivery was sent for.
    pub installation_id: Option<InstallationId>,
}

impl IssueCommentEvent {
    /// Returns true if the author's login ends with `suffix`.
    pub fn is_from_bot(&self, suffix: &str) -> bool {
        self.author_login.ends_with(suffix)
    }
}
