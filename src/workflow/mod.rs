//! Workflow engine.
//!
//! A workflow is a fixed sequence of repository operations triggered by a
//! slash command:
//!
//! - **CreateBranch**: branch off the base branch, commit the configured
//!   files onto the new branch.
//! - **OpenPullRequest**: open a pull request from a pre-existing head branch.
//! - **CreateBranchAndOpenPullRequest**: run `CreateBranch`, then open a pull
//!   request from the new branch and link it back on the triggering issue.
//!
//! # Failure model
//!
//! The first failing step ends the run. Nothing is rolled back and nothing is
//! retried; the failure is logged and recorded in the returned
//! [`WorkflowReport`]. A run never returns an error to its caller.

pub mod engine;
pub mod report;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::commands::Command;

pub use engine::WorkflowEngine;
pub use report::{CompletedStep, StepFailure, StepResult, WorkflowReport, WorkflowStep};

/// The workflows a command can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    CreateBranch,
    OpenPullRequest,
    CreateBranchAndOpenPullRequest,
}

impl Workflow {
    /// Looks up the workflow a command triggers, if any.
    pub fn for_command(command: &Command) -> Option<Workflow> {
        match command {
            Command::CreateBranch => Some(Workflow::CreateBranch),
            Command::CreatePr => Some(Workflow::OpenPullRequest),
            Command::TestPr => Some(Workflow::CreateBranchAndOpenPullRequest),
            Command::Unrecognized(_) | Command::None => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Workflow::CreateBranch => "create_branch",
            Workflow::OpenPullRequest => "open_pull_request",
            Workflow::CreateBranchAndOpenPullRequest => "create_branch_and_open_pull_request",
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
