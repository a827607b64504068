//! Structured results of a workflow run.
//!
//! A run never returns an error. Instead it hands back a [`WorkflowReport`]
//! listing the steps that completed and, if the run stopped early, the step
//! that failed and why.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effects::GitHubResponse;
use crate::github::{GitHubApiError, GitHubErrorKind};

use super::Workflow;

/// One remote call made by a workflow (or by the handler around it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    /// Post the acknowledgement comment. Performed by the handler, not the
    /// engine, but reported with the same types.
    PostAcknowledgement,

    /// Resolve the base branch to a commit.
    GetBaseRef,

    /// Create the bot branch at the base commit.
    CreateBranchRef,

    /// Create a tree holding the file manifest.
    CreateTree,

    /// Fetch the base commit to use as parent.
    GetBaseCommit,

    /// Create the commit on top of the base commit.
    CreateCommit,

    /// Force-move the bot branch to the new commit.
    UpdateBranchRef,

    /// Open the pull request.
    CreatePullRequest,

    /// Post the pull request link back on the originating issue.
    PostPullRequestLink,
}

impl WorkflowStep {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowStep::PostAcknowledgement => "post_acknowledgement",
            WorkflowStep::GetBaseRef => "get_base_ref",
            WorkflowStep::CreateBranchRef => "create_branch_ref",
            WorkflowStep::CreateTree => "create_tree",
            WorkflowStep::GetBaseCommit => "get_base_commit",
            WorkflowStep::CreateCommit => "create_commit",
            WorkflowStep::UpdateBranchRef => "update_branch_ref",
            WorkflowStep::CreatePullRequest => "create_pull_request",
            WorkflowStep::PostPullRequestLink => "post_pull_request_link",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A step that succeeded, with what the remote returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedStep {
    pub step: WorkflowStep,
    pub output: GitHubResponse,
}

/// The step a run stopped at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: WorkflowStep,
    pub kind: GitHubErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
}

impl StepFailure {
    pub fn from_api_error(step: WorkflowStep, err: &GitHubApiError) -> Self {
        StepFailure {
            step,
            kind: err.kind,
            status_code: err.status_code,
            message: err.message.clone(),
        }
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.step, self.kind, self.message)
    }
}

/// Outcome of a single step performed outside a workflow run.
pub type StepResult = Result<CompletedStep, StepFailure>;

/// What a workflow run did.
///
/// `completed` is in execution order. When `failure` is set, no step after it
/// was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub workflow: Workflow,
    pub completed: Vec<CompletedStep>,
    pub failure: Option<StepFailure>,
}

impl WorkflowReport {
    pub fn new(workflow: Workflow) -> Self {
        WorkflowReport {
            workflow,
            completed: Vec::new(),
            failure: None,
        }
    }

    /// Returns true if every step of the workflow ran.
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// The step the run stopped at, if any.
    pub fn failed_step(&self) -> Option<WorkflowStep> {
        self.failure.as_ref().map(|f| f.step)
    }

    /// The completed steps, in order, without their outputs.
    pub fn steps(&self) -> Vec<WorkflowStep> {
        self.completed.iter().map(|c| c.step).collect()
    }

    /// Output of the given step, if it completed.
    pub fn output_of(&self, step: WorkflowStep) -> Option<&GitHubResponse> {
        self.completed
            .iter()
            .find(|c| c.step == step)
            .map(|c| &c.output)
    }
}
