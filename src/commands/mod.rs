//! Command classification for bot commands.
//!
//! This module provides types and classification for the slash commands that
//! users issue via GitHub PR/issue comments.
//!
//! # Supported Commands
//!
//! - `/create-branch` - Creates the bot branch from the base branch and commits
//!   the configured files to it
//! - `/create-pr` - Opens a pull request from the configured head branch
//! - `/testpr` - Does both: creates the bot branch, then opens a pull request
//!   from it and links it on the thread
//!
//! Any other leading slash token is classified but not acted on.
//!
//! # Example
//!
//! ```
//! use slash_bot::commands::{classify, Command};
//!
//! assert_eq!(classify("/create-branch please"), Command::CreateBranch);
//! assert_eq!(classify("please /create-branch"), Command::None);
//! ```

mod parser;
mod types;

pub use parser::{classify, parse_slash_command};
pub use types::Command;
