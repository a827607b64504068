//! Core domain types for the slash-command bot.
//!
//! Identifiers are newtypes so that an issue number can't be passed where a
//! comment id is expected; git objects mirror the GitHub Git Data API.

pub mod git;
pub mod ids;

pub use git::{
    CommitAuthor, CommitData, FileMode, GitReference, ObjectKind, PullRequestData, TreeEntry,
    TreeEntryContent,
};
pub use ids::{CommentId, DeliveryId, InstallationId, InvalidSha, IssueNumber, RepoId, Sha};
