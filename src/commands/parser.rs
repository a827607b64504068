//! Classifier for slash commands in comment text.
//!
//! This module provides a pure classifier that extracts a leading slash token
//! from unstructured GitHub comment text.

use std::sync::LazyLock;

use regex::Regex;

use super::types::Command;

/// A slash, one or more word characters, then any number of `-word` groups.
///
/// Word characters are ASCII only, so `/café` yields `/caf`.
static SLASH_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/[0-9A-Za-z_]+(?:-[0-9A-Za-z_]+)*").expect("slash command pattern is valid")
});

/// Returns the slash token at the very start of `text`, if any.
///
/// # Matching Rules
///
/// - The token must start at byte 0: no leading whitespace, no mid-text matches
/// - Only the first token counts; everything after it is ignored
/// - No case folding
///
/// # Examples
///
/// ```
/// use slash_bot::commands::parse_slash_command;
///
/// assert_eq!(parse_slash_command("/create-branch please"), Some("/create-branch"));
/// assert_eq!(parse_slash_command("/create-branch-now"), Some("/create-branch-now"));
/// assert_eq!(parse_slash_command("see /foo"), None);
/// ```
pub fn parse_slash_command(text: &str) -> Option<&str> {
    SLASH_COMMAND.find(text).map(|m| m.as_str())
}

/// Classifies a comment into a [`Command`]. Never fails.
///
/// # Examples
///
/// ```
/// use slash_bot::commands::{classify, Command};
///
/// assert_eq!(classify("/create-pr"), Command::CreatePr);
/// assert_eq!(classify("/deploy now"), Command::Unrecognized("/deploy".to_string()));
/// assert_eq!(classify("hello"), Command::None);
/// ```
pub fn classify(text: &str) -> Command {
    match parse_slash_command(text) {
        Some(token) => Command::from_token(token),
        None => Command::None,
    }
}
