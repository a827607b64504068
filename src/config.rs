//! Runtime configuration.
//!
//! Everything the workflows used to hardcode (branch names, the file
//! manifest, commit identity, pull request text) lives in [`WorkflowConfig`],
//! which is handed to the engine at construction. [`BotConfig`] wraps it with
//! the handler and server settings.
//!
//! # Environment
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SLASH_BOT_LISTEN_ADDR` | `0.0.0.0:3000` |
//! | `GITHUB_TOKEN` | required by the binary |
//! | `SLASH_BOT_PREAMBLE` | `Hi there!` |
//! | `SLASH_BOT_BOT_SUFFIX` | `[bot]` |
//! | `SLASH_BOT_BASE_BRANCH` | `main` |
//! | `SLASH_BOT_BRANCH` | `myNewBranch` |
//! | `SLASH_BOT_PR_HEAD` | `pr-branch` |
//! | `SLASH_BOT_AUTHOR_NAME` | `codetoolz-bot` |
//! | `SLASH_BOT_AUTHOR_EMAIL` | `john@example.com` |

use std::net::SocketAddr;

use thiserror::Error;

use crate::types::TreeEntry;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PREAMBLE: &str = "Hi there!";
const DEFAULT_BOT_SUFFIX: &str = "[bot]";

const DEFAULT_BASE_BRANCH: &str = "main";
const DEFAULT_BOT_BRANCH: &str = "myNewBranch";
const DEFAULT_PR_HEAD_BRANCH: &str = "pr-branch";
const DEFAULT_AUTHOR_NAME: &str = "codetoolz-bot";
const DEFAULT_AUTHOR_EMAIL: &str = "john@example.com";
const DEFAULT_COMMIT_MESSAGE: &str = "This is a commit by bot";
const DEFAULT_PR_TITLE: &str = "First PR";
const DEFAULT_PR_BODY: &str = "This is a PR created by a bot";

/// Errors loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but can't be parsed.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// A file the branch workflow commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub path: String,
    pub content: String,
}

impl FileSpec {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Converts to a regular-file tree entry with inline content.
    pub fn to_tree_entry(&self) -> TreeEntry {
        TreeEntry::inline_file(&self.path, &self.content)
    }
}

/// Names and content used by the workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Branch the bot branches from and opens pull requests against.
    pub base_branch: String,

    /// Branch created by `/create-branch` and `/testpr`.
    pub bot_branch: String,

    /// Head branch for the standalone `/create-pr` workflow. Must already exist.
    pub pr_head_branch: String,

    /// Files committed to the bot branch.
    pub files: Vec<FileSpec>,

    pub commit_message: String,
    pub author_name: String,
    pub author_email: String,

    pub pr_title: String,
    pub pr_body: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
            bot_branch: DEFAULT_BOT_BRANCH.to_string(),
            pr_head_branch: DEFAULT_PR_HEAD_BRANCH.to_string(),
            files: vec![
                FileSpec::new("file1.txt", "file content"),
                FileSpec::new("file2.txt", "another file content"),
            ],
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
            pr_title: DEFAULT_PR_TITLE.to_string(),
            pr_body: DEFAULT_PR_BODY.to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Overlays `SLASH_BOT_*` workflow variables onto the defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str, default: String| non_empty(lookup(name)).unwrap_or(default);
        let defaults = Self::default();

        WorkflowConfig {
            base_branch: var("SLASH_BOT_BASE_BRANCH", defaults.base_branch),
            bot_branch: var("SLASH_BOT_BRANCH", defaults.bot_branch),
            pr_head_branch: var("SLASH_BOT_PR_HEAD", defaults.pr_head_branch),
            author_name: var("SLASH_BOT_AUTHOR_NAME", defaults.author_name),
            author_email: var("SLASH_BOT_AUTHOR_EMAIL", defaults.author_email),
            ..defaults
        }
    }

    /// Ref path of the base branch relative to `refs/`, e.g. `heads/main`.
    pub fn base_ref(&self) -> String {
        format!("heads/{}", self.base_branch)
    }

    /// Fully qualified bot branch ref, e.g. `refs/heads/myNewBranch`.
    pub fn bot_ref_qualified(&self) -> String {
        format!("refs/heads/{}", self.bot_branch)
    }

    /// Bot branch ref relative to `refs/`, e.g. `heads/myNewBranch`.
    pub fn bot_ref(&self) -> String {
        format!("heads/{}", self.bot_branch)
    }

    /// The file manifest as tree entries.
    pub fn tree_entries(&self) -> Vec<TreeEntry> {
        self.files.iter().map(FileSpec::to_tree_entry).collect()
    }
}

/// Top-level bot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Address the webhook server binds.
    pub listen_addr: SocketAddr,

    /// First line of every acknowledgement comment.
    pub preamble: String,

    /// Authors whose login ends with this are ignored.
    pub bot_suffix: String,

    pub workflow: WorkflowConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            preamble: DEFAULT_PREAMBLE.to_string(),
            bot_suffix: DEFAULT_BOT_SUFFIX.to_string(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl BotConfig {
    /// Creates a `BotConfig` from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = non_empty(lookup("SLASH_BOT_LISTEN_ADDR"))
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr =
            addr.parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: "SLASH_BOT_LISTEN_ADDR",
                    value: addr.clone(),
                    reason: e.to_string(),
                })?;

        let defaults = Self::default();
        Ok(BotConfig {
            listen_addr,
            preamble: non_empty(lookup("SLASH_BOT_PREAMBLE")).unwrap_or(defaults.preamble),
            bot_suffix: non_empty(lookup("SLASH_BOT_BOT_SUFFIX")).unwrap_or(defaults.bot_suffix),
            workflow: WorkflowConfig::from_lookup(&lookup),
        })
    }
}

/// Reads the GitHub token the binary authenticates with.
pub fn github_token_from_env() -> Result<String, ConfigError> {
    non_empty(std::env::var("GITHUB_TOKEN").ok()).ok_or(ConfigError::Missing("GITHUB_TOKEN"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
