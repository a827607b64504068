//! Effects-as-data for GitHub operations.
//!
//! This module defines effect types that describe operations without executing them.
//! This enables:
//! - Workflow logic that is written once against a small capability set
//! - Testability via mock interpreters
//! - Logging/tracing of intended operations

pub mod github;
pub mod interpreter;

pub use github::{GitHubEffect, GitHubResponse, NewPullRequest};
pub use interpreter::GitHubInterpreter;
