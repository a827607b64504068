//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Typed event models ([`events`])
//! - Payload parsing keyed by the `X-GitHub-Event` header ([`parser`])
//! - Event handlers that acknowledge commands and run workflows ([`handlers`])

pub mod events;
pub mod handlers;
pub mod parser;

pub use events::{CommentAction, GitHubEvent, IssueCommentEvent};
pub use handlers::{
    HandlerOutcome, IgnoreReason, handle_event, handle_issue_comment, screen_event,
};
pub use parser::{ParseError, parse_webhook};
