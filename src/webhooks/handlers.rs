//! Event handlers for GitHub webhook events.
//!
//! Handlers run a delivery to completion against a GitHub interpreter and
//! describe what happened in a [`HandlerOutcome`]. Remote failures are logged
//! and recorded in the outcome; they never surface as errors.
//!
//! # Event Types
//!
//! | Event | Handler |
//! |-------|---------|
//! | `issue_comment` | `handle_issue_comment` - acknowledge, then run the command's workflow |

mod issue_comment;

use serde::Serialize;

use crate::commands::Command;
use crate::config::BotConfig;
use crate::effects::GitHubInterpreter;
use crate::github::GitHubApiError;
use crate::webhooks::GitHubEvent;
use crate::workflow::{StepResult, WorkflowReport};

pub use issue_comment::{format_acknowledgement, handle_issue_comment, ignore_reason};

/// Why an event was dropped without touching GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The comment was edited or deleted rather than created.
    NotCreated,
    /// The comment was written by a bot account.
    BotAuthor,
}

/// Result of handling an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandlerOutcome {
    /// Nothing was sent to GitHub.
    Ignored { reason: IgnoreReason },

    /// The comment was acknowledged and, if it named a known command, the
    /// command's workflow was run.
    Processed {
        command: Command,
        acknowledgement: StepResult,
        report: Option<WorkflowReport>,
    },
}

impl HandlerOutcome {
    pub fn ignored(reason: IgnoreReason) -> Self {
        HandlerOutcome::Ignored { reason }
    }

    /// Returns true if the event was dropped.
    pub fn is_ignored(&self) -> bool {
        matches!(self, HandlerOutcome::Ignored { .. })
    }

    /// The workflow report, if a workflow ran.
    pub fn report(&self) -> Option<&WorkflowReport> {
        match self {
            HandlerOutcome::Processed { report, .. } => report.as_ref(),
            HandlerOutcome::Ignored { .. } => None,
        }
    }
}

/// Returns why `event` would be dropped, without needing a GitHub client.
pub fn screen_event(event: &GitHubEvent, config: &BotConfig) -> Option<IgnoreReason> {
    match event {
        GitHubEvent::IssueComment(e) => ignore_reason(e, config),
    }
}

/// Handles a GitHub webhook event.
///
/// This is the main entry point for event handling. It dispatches to the
/// appropriate handler based on the event type.
pub async fn handle_event<I>(event: &GitHubEvent, gateway: &I, config: &BotConfig) -> HandlerOutcome
where
    I: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    match event {
        GitHubEvent::IssueComment(e) => handle_issue_comment(e, gateway, config).await,
    }
}
