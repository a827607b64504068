//! Command types for slash commands.
//!
//! These commands are classified from GitHub issue/PR comments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The classification of a comment.
///
/// Recognised slash commands get their own variant so that dispatch is checked
/// for exhaustiveness. Any other slash token is kept verbatim so it can still
/// be echoed back, and a comment with no leading slash token is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "command", content = "token", rename_all = "snake_case")]
pub enum Command {
    /// `/create-branch`: create the bot branch and commit the file manifest to it.
    CreateBranch,

    /// `/create-pr`: open a pull request from the configured head branch.
    CreatePr,

    /// `/testpr`: create the bot branch, then open a pull request from it and
    /// link the pull request back on the originating thread.
    TestPr,

    /// A slash token that no workflow handles.
    Unrecognized(String),

    /// The comment does not start with a slash token.
    None,
}

impl Command {
    /// Sentinel text echoed for comments without a slash token.
    pub const NONE_TOKEN: &'static str = "None";

    /// Maps a raw slash token onto a command.
    pub fn from_token(token: &str) -> Self {
        match token {
            "/create-branch" => Command::CreateBranch,
            "/create-pr" => Command::CreatePr,
            "/testpr" => Command::TestPr,
            other => Command::Unrecognized(other.to_string()),
        }
    }

    /// Returns the slash token this command was classified from, or the
    /// sentinel for [`Command::None`].
    pub fn token(&self) -> &str {
        match self {
            Command::CreateBranch => "/create-branch",
            Command::CreatePr => "/create-pr",
            Command::TestPr => "/testpr",
            Command::Unrecognized(token) => token,
            Command::None => Self::NONE_TOKEN,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
