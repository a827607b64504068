//! Handler for `issue_comment` webhook events.
//!
//! A newly created comment from a human is echoed back with the slash command
//! found at its start (or `None`), and a recognised command then runs its
//! workflow. Comments on plain issues and on pull requests are treated alike.

use tracing::{debug, error, info, instrument};

use crate::commands::{Command, classify};
use crate::config::BotConfig;
use crate::effects::{GitHubEffect, GitHubInterpreter};
use crate::github::GitHubApiError;
use crate::webhooks::events::{CommentAction, IssueCommentEvent};
use crate::workflow::{
    CompletedStep, StepFailure, StepResult, Workflow, WorkflowEngine, WorkflowStep,
};

use super::{HandlerOutcome, IgnoreReason};

/// Handles an issue comment event.
///
/// # Event Actions
///
/// | Action | Behavior |
/// |--------|----------|
/// | `created` | Acknowledge, then run the command's workflow if any |
/// | anything else | Ignored |
///
/// Comments whose author login ends with `config.bot_suffix` are ignored too.
/// Ignored events make no GitHub calls.
#[instrument(
    skip_all,
    fields(
        repo = %event.repo,
        issue = %event.issue_number,
        installation = ?event.installation_id,
    )
)]
pub async fn handle_issue_comment<I>(
    event: &IssueCommentEvent,
    gateway: &I,
    config: &BotConfig,
) -> HandlerOutcome
where
    I: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    debug!(action = ?event.action, "Handling issue comment");

    if let Some(reason) = ignore_reason(event, config) {
        debug!(author = %event.author_login, reason = ?reason, "Dropping issue comment");
        return HandlerOutcome::ignored(reason);
    }

    let command = classify(&event.body);
    info!(
        author = %event.author_login,
        command = %command,
        is_pull_request = event.is_pull_request,
        "Echoing comment"
    );

    let acknowledgement = acknowledge(event, &command, gateway, config).await;

    let report = match Workflow::for_command(&command) {
        Some(workflow) => {
            let engine = WorkflowEngine::new(config.workflow.clone());
            Some(
                engine
                    .run(gateway, &event.repo, event.issue_number, workflow)
                    .await,
            )
        }
        None => None,
    };

    HandlerOutcome::Processed {
        command,
        acknowledgement,
        report,
    }
}

/// Decides from the payload alone whether a comment is dropped.
///
/// Only newly created comments by non-bot authors are handled.
pub fn ignore_reason(event: &IssueCommentEvent, config: &BotConfig) -> Option<IgnoreReason> {
    if event.action != CommentAction::Created {
        Some(IgnoreReason::NotCreated)
    } else if event.is_from_bot(&config.bot_suffix) {
        Some(IgnoreReason::BotAuthor)
    } else {
        None
    }
}

/// Posts the acknowledgement comment. A failure is logged and returned, and
/// does not stop the workflow.
async fn acknowledge<I>(
    event: &IssueCommentEvent,
    command: &Command,
    gateway: &I,
    config: &BotConfig,
) -> StepResult
where
    I: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    let step = WorkflowStep::PostAcknowledgement;
    let effect = GitHubEffect::PostComment {
        issue: event.issue_number,
        body: format_acknowledgement(&config.preamble, &event.author_login, &event.body, command),
    };

    match gateway.interpret(effect).await {
        Ok(output) => Ok(CompletedStep { step, output }),
        Err(e) => {
            error!(repo = %event.repo, error = %e, "Failed to comment on issue");
            Err(StepFailure::from_api_error(step, &e))
        }
    }
}

/// Formats the comment echoing a command back to its author.
///
/// The body is reproduced verbatim inside a fenced block; the command is its
/// slash token, or `None` when the comment has none.
pub fn format_acknowledgement(preamble: &str, author: &str, body: &str, command: &Command) -> String {
    format!(
        "{preamble}\n{author} said\n```\n{body}\n```\nFound the slash command: `{}`\n",
        command.token()
    )
}
