//! Git object models as seen through the GitHub Git Data API.
//!
//! Everything here except [`GitReference`] is content-addressed and immutable
//! once created. A reference is the only mutable pointer: workflows create new
//! trees and commits, then repoint a branch at the result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{IssueNumber, Sha};

/// A named pointer to a git object, e.g. `refs/heads/main` → commit SHA.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitReference {
    /// Fully qualified name (`refs/heads/...`).
    pub ref_name: String,
    /// The object the reference points at.
    pub sha: Sha,
}

impl GitReference {
    /// Returns the reference name relative to `refs/`, the form the
    /// `git/ref` and `git/refs` endpoints accept in their path.
    pub fn short_name(&self) -> &str {
        self.ref_name
            .strip_prefix("refs/")
            .unwrap_or(&self.ref_name)
    }
}

/// File mode of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileMode {
    /// Regular, non-executable file.
    #[serde(rename = "100644")]
    Regular,
    /// Executable file.
    #[serde(rename = "100755")]
    Executable,
}

impl FileMode {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            FileMode::Regular => "100644",
            FileMode::Executable => "100755",
        }
    }
}

/// Kind of object a tree entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Blob,
}

impl ObjectKind {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
        }
    }
}

/// Where a tree entry's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeEntryContent {
    /// Literal file content; GitHub creates the blob as part of the tree.
    Inline(String),
    /// An existing blob.
    Blob(Sha),
}

/// One path in a tree being built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: FileMode,
    pub kind: ObjectKind,
    pub content: TreeEntryContent,
}

impl TreeEntry {
    /// A regular file with inline content.
    pub fn inline_file(path: impl Into<String>, content: impl Into<String>) -> Self {
        TreeEntry {
            path: path.into(),
            mode: FileMode::Regular,
            kind: ObjectKind::Blob,
            content: TreeEntryContent::Inline(content.into()),
        }
    }
}

/// Author (or committer) identity plus timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// A commit object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitData {
    pub sha: Sha,
    pub message: String,
    pub author: CommitAuthor,
    pub tree: Sha,
    /// Parent commits, in order.
    pub parents: Vec<Sha>,
}

/// A pull request as returned on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestData {
    pub number: IssueNumber,
    pub title: String,
    /// Canonical browser URL of the pull request.
    pub html_url: String,
}
