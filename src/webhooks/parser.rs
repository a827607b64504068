//! GitHub webhook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed [`GitHubEvent`] values.
//! The parser tolerates unknown fields and unknown event types.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types return `Ok(None)` (ignored, not error)
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CommentId, InstallationId, IssueNumber, RepoId};

use super::events::{CommentAction, GitHubEvent, IssueCommentEvent};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value (e.g. an empty repository name).
    #[error("invalid field value for {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// # Returns
///
/// * `Ok(Some(event))` - Successfully parsed a known event type
/// * `Ok(None)` - Unknown event type (ignored, not an error)
/// * `Err(e)` - Malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use slash_bot::webhooks::parse_webhook;
///
/// let payload = br#"{
///     "action": "created",
///     "comment": {
///         "id": 123,
///         "body": "/create-branch",
///         "user": { "login": "octocat" }
///     },
///     "issue": { "number": 42 },
///     "repository": {
///         "owner": { "login": "owner" },
///         "name": "repo"
///     }
/// }"#;
///
/// let result = parse_webhook("issue_comment", payload);
/// assert!(matches!(result, Ok(Some(_))));
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitHubEvent>, ParseError> {
    match event_type {
        "issue_comment" => parse_issue_comment(payload).map(|e| Some(GitHubEvent::IssueComment(e))),
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure, keeping only what the bot reads.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawOwner,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawInstallation {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawIssueCommentPayload {
    action: String,
    comment: RawComment,
    issue: RawIssue,
    repository: RawRepository,
    installation: Option<RawInstallation>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: u64,
    body: Option<String>,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    // Present only when the issue is a pull request
    pull_request: Option<serde_json::Value>,
}

fn parse_issue_comment(payload: &[u8]) -> Result<IssueCommentEvent, ParseError> {
    let raw: RawIssueCommentPayload = serde_json::from_slice(payload)?;

    non_empty("repository.owner.login", &raw.repository.owner.login)?;
    non_empty("repository.name", &raw.repository.name)?;
    non_empty("comment.user.login", &raw.comment.user.login)?;

    Ok(IssueCommentEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        action: CommentAction::from_api_str(&raw.action),
        issue_number: IssueNumber(raw.issue.number),
        is_pull_request: raw.issue.pull_request.is_some(),
        comment_id: CommentId(raw.comment.id),
        body: raw.comment.body.unwrap_or_default(),
        author_login: raw.comment.user.login,
        installation_id: raw.installation.map(|i| InstallationId(i.id)),
    })
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ParseError> {
    if value.is_empty() {
        return Err(ParseError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
