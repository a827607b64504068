//! Runs workflows against a GitHub interpreter.
//!
//! The engine holds only configuration. Each call to [`WorkflowEngine::run`]
//! owns its own [`WorkflowReport`], so one engine can serve concurrent
//! deliveries.

use chrono::Utc;
use tracing::{debug, error, info, instrument};

use crate::config::WorkflowConfig;
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, NewPullRequest};
use crate::github::GitHubApiError;
use crate::types::{CommentId, CommitAuthor, CommitData, IssueNumber, PullRequestData, RepoId, Sha};

use super::Workflow;
use super::report::{CompletedStep, StepFailure, WorkflowReport, WorkflowStep};

/// Executes workflows step by step, stopping at the first failure.
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    config: WorkflowConfig,
}

impl WorkflowEngine {
    pub fn new(config: WorkflowConfig) -> Self {
        WorkflowEngine { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Runs `workflow` against `repo` through `gateway`.
    ///
    /// `issue` is the thread the triggering comment was posted on; only the
    /// chained workflow writes to it.
    #[instrument(skip_all, fields(repo = %repo, issue = %issue, workflow = %workflow))]
    pub async fn run<I>(
        &self,
        gateway: &I,
        repo: &RepoId,
        issue: IssueNumber,
        workflow: Workflow,
    ) -> WorkflowReport
    where
        I: GitHubInterpreter<Error = GitHubApiError> + Sync,
    {
        let mut run = Run {
            gateway,
            repo,
            report: WorkflowReport::new(workflow),
        };

        match workflow {
            Workflow::CreateBranch => {
                self.create_branch(&mut run).await;
            }
            Workflow::OpenPullRequest => {
                self.open_pull_request(&mut run, &self.config.pr_head_branch)
                    .await;
            }
            Workflow::CreateBranchAndOpenPullRequest => {
                if self.create_branch(&mut run).await.is_some()
                    && let Some(pr) = self
                        .open_pull_request(&mut run, &self.config.bot_branch)
                        .await
                {
                    self.post_pull_request_link(&mut run, issue, &pr).await;
                }
            }
        }

        if run.report.succeeded() {
            info!(steps = run.report.completed.len(), "Workflow completed");
        }
        run.report
    }

    /// Branches off the base branch and commits the file manifest onto the
    /// new branch. Returns the new commit's SHA.
    async fn create_branch<I>(&self, run: &mut Run<'_, I>) -> Option<Sha>
    where
        I: GitHubInterpreter<Error = GitHubApiError> + Sync,
    {
        let config = &self.config;

        let base_sha = run
            .execute(
                WorkflowStep::GetBaseRef,
                GitHubEffect::GetRef {
                    ref_name: config.base_ref(),
                },
                ref_sha,
            )
            .await?;

        run.execute(
            WorkflowStep::CreateBranchRef,
            GitHubEffect::CreateRef {
                ref_name: config.bot_ref_qualified(),
                sha: base_sha.clone(),
            },
            ref_sha,
        )
        .await?;

        // The base commit SHA stands in for its tree; GitHub peels it.
        let tree = run
            .execute(
                WorkflowStep::CreateTree,
                GitHubEffect::CreateTree {
                    base_tree: base_sha.clone(),
                    entries: config.tree_entries(),
                },
                tree_sha,
            )
            .await?;

        let parent = run
            .execute(
                WorkflowStep::GetBaseCommit,
                GitHubEffect::GetCommit { sha: base_sha },
                commit,
            )
            .await?;

        let created = run
            .execute(
                WorkflowStep::CreateCommit,
                GitHubEffect::CreateCommit {
                    message: config.commit_message.clone(),
                    author: CommitAuthor {
                        name: config.author_name.clone(),
                        email: config.author_email.clone(),
                        date: Utc::now(),
                    },
                    tree,
                    parents: vec![parent.sha],
                },
                commit,
            )
            .await?;

        run.execute(
            WorkflowStep::UpdateBranchRef,
            GitHubEffect::UpdateRef {
                ref_name: config.bot_ref(),
                sha: created.sha.clone(),
                force: true,
            },
            ref_sha,
        )
        .await?;

        info!(
            branch = %config.bot_branch,
            commit = %created.sha.short(),
            "Branch created"
        );
        Some(created.sha)
    }

    async fn open_pull_request<I>(&self, run: &mut Run<'_, I>, head: &str) -> Option<PullRequestData>
    where
        I: GitHubInterpreter<Error = GitHubApiError> + Sync,
    {
        let request = NewPullRequest {
            title: self.config.pr_title.clone(),
            head: head.to_string(),
            base: self.config.base_branch.clone(),
            body: self.config.pr_body.clone(),
        };

        let pr = run
            .execute(
                WorkflowStep::CreatePullRequest,
                GitHubEffect::CreatePullRequest(request),
                pull_request,
            )
            .await?;

        debug!(pr = %pr.number, title = %pr.title, "Pull request opened");
        Some(pr)
    }

    async fn post_pull_request_link<I>(
        &self,
        run: &mut Run<'_, I>,
        issue: IssueNumber,
        pr: &PullRequestData,
    ) -> Option<CommentId>
    where
        I: GitHubInterpreter<Error = GitHubApiError> + Sync,
    {
        run.execute(
            WorkflowStep::PostPullRequestLink,
            GitHubEffect::PostComment {
                issue,
                body: pull_request_link_body(pr),
            },
            comment_id,
        )
        .await
    }
}

/// Body of the comment linking a freshly opened pull request.
pub fn pull_request_link_body(pr: &PullRequestData) -> String {
    format!("Opened pull request {}: {}", pr.number, pr.html_url)
}

/// State of one in-flight run.
struct Run<'a, I> {
    gateway: &'a I,
    repo: &'a RepoId,
    report: WorkflowReport,
}

impl<I> Run<'_, I>
where
    I: GitHubInterpreter<Error = GitHubApiError> + Sync,
{
    /// Performs one step and records its outcome.
    ///
    /// `extract` pulls the value the next step needs out of the response; a
    /// response of the wrong shape counts as a failure of this step.
    async fn execute<T>(
        &mut self,
        step: WorkflowStep,
        effect: GitHubEffect,
        extract: fn(&GitHubResponse) -> Option<T>,
    ) -> Option<T> {
        debug!(step = %step, effect = effect.name(), "Executing step");

        let outcome = match self.gateway.interpret(effect).await {
            Ok(response) => match extract(&response) {
                Some(value) => Ok((response, value)),
                None => Err(GitHubApiError::invalid_response(format!(
                    "{step} got an unexpected {} response",
                    response.name()
                ))),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok((output, value)) => {
                self.report.completed.push(CompletedStep { step, output });
                Some(value)
            }
            Err(e) => {
                error!(
                    repo = %self.repo,
                    workflow = %self.report.workflow,
                    step = %step,
                    error = %e,
                    "Workflow step failed"
                );
                self.report.failure = Some(StepFailure::from_api_error(step, &e));
                None
            }
        }
    }
}

fn ref_sha(response: &GitHubResponse) -> Option<Sha> {
    match response {
        GitHubResponse::Ref(reference) => Some(reference.sha.clone()),
        _ => None,
    }
}

fn tree_sha(response: &GitHubResponse) -> Option<Sha> {
    match response {
        GitHubResponse::Tree { sha } => Some(sha.clone()),
        _ => None,
    }
}

fn commit(response: &GitHubResponse) -> Option<CommitData> {
    match response {
        GitHubResponse::Commit(commit) => Some(commit.clone()),
        _ => None,
    }
}

fn pull_request(response: &GitHubResponse) -> Option<PullRequestData> {
    match response {
        GitHubResponse::PullRequest(pr) => Some(pr.clone()),
        _ => None,
    }
}

fn comment_id(response: &GitHubResponse) -> Option<CommentId> {
    match response {
        GitHubResponse::CommentPosted { id } => Some(*id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::GitHubErrorKind;
    use crate::test_utils::MockGitHub;
    use crate::types::TreeEntryContent;

    const ISSUE: IssueNumber = IssueNumber(7);

    fn engine() -> WorkflowEngine {
        WorkflowEngine::new(WorkflowConfig::default())
    }

    fn repo() -> RepoId {
        RepoId::new("octo", "widgets")
    }

    const BRANCH_STEPS: [WorkflowStep; 6] = [
        WorkflowStep::GetBaseRef,
        WorkflowStep::CreateBranchRef,
        WorkflowStep::CreateTree,
        WorkflowStep::GetBaseCommit,
        WorkflowStep::CreateCommit,
        WorkflowStep::UpdateBranchRef,
    ];

    #[tokio::test]
    async fn create_branch_runs_all_steps_in_order() {
        let github = MockGitHub::with_branch("main");
        let report = engine()
            .run(&github, &repo(), ISSUE, Workflow::CreateBranch)
            .await;

        assert!(report.succeeded(), "{:?}", report.failure);
        assert_eq!(report.steps(), BRANCH_STEPS);
        assert_eq!(
            github.effect_names(),
            [
                "get_ref",
                "create_ref",
                "create_tree",
                "get_commit",
                "create_commit",
                "update_ref"
            ]
        );
    }

    #[tokio::test]
    async fn create_branch_points_new_branch_at_child_of_base() {
        let github = MockGitHub::with_branch("main");
        let base = github.ref_target("refs/heads/main").unwrap();

        engine()
            .run(&github, &repo(), ISSUE, Workflow::CreateBranch)
            .await;

        let tip = github.ref_target("refs/heads/myNewBranch").unwrap();
        assert_ne!(tip, base);

        let commit = github.commit(&tip).unwrap();
        assert_eq!(commit.parents, vec![base]);
        assert_eq!(commit.message, "This is a commit by bot");
        assert_eq!(commit.author.name, "codetoolz-bot");

        let files = github.tree_files(&commit.tree).unwrap();
        assert_eq!(files.get("file1.txt").map(String::as_str), Some("file content"));
        assert_eq!(
            files.get("file2.txt").map(String::as_str),
            Some("another file content")
        );
        // Files already on the base branch are kept.
        assert!(files.contains_key("README.md"));
    }

    #[tokio::test]
    async fn created_commit_reads_back_identically() {
        let github = MockGitHub::with_branch("main");
        let report = engine()
            .run(&github, &repo(), ISSUE, Workflow::CreateBranch)
            .await;

        let Some(GitHubResponse::Commit(created)) = report.output_of(WorkflowStep::CreateCommit)
        else {
            panic!("no commit in report: {report:?}");
        };

        let fetched = github
            .interpret(GitHubEffect::GetCommit {
                sha: created.sha.clone(),
            })
            .await
            .unwrap();
        assert_eq!(fetched, GitHubResponse::Commit(created.clone()));
    }

    #[tokio::test]
    async fn tree_failure_stops_before_commit() {
        let github = MockGitHub::with_branch("main");
        github.fail_on("create_tree", GitHubApiError::with_status(422, "tree invalid"));

        let report = engine()
            .run(&github, &repo(), ISSUE, Workflow::CreateBranch)
            .await;

        assert_eq!(report.failed_step(), Some(WorkflowStep::CreateTree));
        assert_eq!(
            report.steps(),
            [WorkflowStep::GetBaseRef, WorkflowStep::CreateBranchRef]
        );
        let names = github.effect_names();
        assert!(!names.contains(&"create_commit"));
        assert!(!names.contains(&"update_ref"));

        // The branch created before the failure is left in place.
        assert_eq!(
            github.ref_target("refs/heads/myNewBranch"),
            github.ref_target("refs/heads/main")
        );
    }

    #[tokio::test]
    async fn second_run_fails_at_branch_creation() {
        let github = MockGitHub::with_branch("main");
        let engine = engine();

        let first = engine
            .run(&github, &repo(), ISSUE, Workflow::CreateBranch)
            .await;
        assert!(first.succeeded());
        let tip = github.ref_target("refs/heads/myNewBranch");

        let second = engine
            .run(&github, &repo(), ISSUE, Workflow::CreateBranch)
            .await;
        assert_eq!(second.steps(), [WorkflowStep::GetBaseRef]);
        let failure = second.failure.expect("second run should fail");
        assert_eq!(failure.step, WorkflowStep::CreateBranchRef);
        assert_eq!(failure.kind, GitHubErrorKind::Conflict);

        // Branch untouched by the failed run.
        assert_eq!(github.ref_target("refs/heads/myNewBranch"), tip);
    }

    #[tokio::test]
    async fn missing_base_branch_fails_first_step() {
        let github = MockGitHub::with_branch("trunk");
        let report = engine()
            .run(&github, &repo(), ISSUE, Workflow::CreateBranch)
            .await;

        let failure = report.failure.unwrap();
        assert_eq!(failure.step, WorkflowStep::GetBaseRef);
        assert_eq!(failure.kind, GitHubErrorKind::NotFound);
        assert_eq!(github.effect_names(), ["get_ref"]);
    }

    #[tokio::test]
    async fn manifest_is_sent_inline() {
        let github = MockGitHub::with_branch("main");
        engine()
            .run(&github, &repo(), ISSUE, Workflow::CreateBranch)
            .await;

        let entries = github
            .effects()
            .into_iter()
            .find_map(|e| match e {
                GitHubEffect::CreateTree { entries, .. } => Some(entries),
                _ => None,
            })
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].content,
            TreeEntryContent::Inline("file content".to_string())
        );
    }

    #[tokio::test]
    async fn final_update_is_forced() {
        let github = MockGitHub::with_branch("main");
        engine()
            .run(&github, &repo(), ISSUE, Workflow::CreateBranch)
            .await;

        let last = github.effects().pop().unwrap();
        assert!(matches!(
            last,
            GitHubEffect::UpdateRef { ref ref_name, force: true, .. } if ref_name == "heads/myNewBranch"
        ));
    }

    #[tokio::test]
    async fn open_pull_request_uses_configured_head() {
        let github = MockGitHub::with_branch("main");
        github.add_branch("pr-branch");

        let report = engine()
            .run(&github, &repo(), ISSUE, Workflow::OpenPullRequest)
            .await;

        assert!(report.succeeded());
        assert_eq!(report.steps(), [WorkflowStep::CreatePullRequest]);
        let pr = github.pull_requests().pop().unwrap();
        assert_eq!(pr.head, "pr-branch");
        assert_eq!(pr.base, "main");
        assert_eq!(pr.title, "First PR");
    }

    #[tokio::test]
    async fn open_pull_request_failure_is_reported() {
        let github = MockGitHub::with_branch("main");

        let report = engine()
            .run(&github, &repo(), ISSUE, Workflow::OpenPullRequest)
            .await;

        assert_eq!(report.failed_step(), Some(WorkflowStep::CreatePullRequest));
        assert_eq!(report.failure.unwrap().kind, GitHubErrorKind::Validation);
    }

    #[tokio::test]
    async fn chained_workflow_links_pull_request() {
        let github = MockGitHub::with_branch("main");

        let report = engine()
            .run(
                &github,
                &repo(),
                ISSUE,
                Workflow::CreateBranchAndOpenPullRequest,
            )
            .await;

        assert!(report.succeeded(), "{:?}", report.failure);
        let mut expected = BRANCH_STEPS.to_vec();
        expected.extend([
            WorkflowStep::CreatePullRequest,
            WorkflowStep::PostPullRequestLink,
        ]);
        assert_eq!(report.steps(), expected);

        let pr = github.pull_requests().pop().unwrap();
        assert_eq!(pr.head, "myNewBranch");

        let (issue, body) = github.comments().pop().unwrap();
        assert_eq!(issue, ISSUE);
        assert!(body.contains("https://github.com/octo/widgets/pull/1"), "{body}");
    }

    #[tokio::test]
    async fn chained_workflow_skips_pull_request_when_branch_fails() {
        let github = MockGitHub::with_branch("main");
        github.fail_on("create_commit", GitHubApiError::with_status(500, "boom"));

        let report = engine()
            .run(
                &github,
                &repo(),
                ISSUE,
                Workflow::CreateBranchAndOpenPullRequest,
            )
            .await;

        assert_eq!(report.failed_step(), Some(WorkflowStep::CreateCommit));
        assert!(github.pull_requests().is_empty());
        assert!(github.comments().is_empty());
    }

    #[test]
    fn link_body_names_number_and_url() {
        let pr = PullRequestData {
            number: IssueNumber(12),
            title: "First PR".to_string(),
            html_url: "https://github.com/o/r/pull/12".to_string(),
        };
        assert_eq!(
            pull_request_link_body(&pr),
            "Opened pull request #12: https://github.com/o/r/pull/12"
        );
    }
}
