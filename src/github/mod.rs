//! GitHub API client and effect interpreter.
//!
//! This module provides the implementation for executing GitHub effects via the octocrab
//! library. It implements the `GitHubInterpreter` trait defined in the effects module.
//!
//! Key features:
//! - Git Data API (refs, trees, commits) through raw REST routes
//! - Errors categorised by cause (auth, not-found, conflict, rate-limit, network)
//! - A `ClientFactory` seam so the webhook layer never constructs clients itself

mod client;
mod error;
mod interpreter;

pub use client::{ClientFactory, OctocrabClient, StaticTokenFactory};
pub use error::{GitHubApiError, GitHubErrorKind, categorize};
pub use interpreter::{encode_ref_path, interpret_github_effect};
