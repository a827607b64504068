//! Shared test utilities: an in-memory GitHub repository.
//!
//! [`MockGitHub`] interprets effects against refs, trees and commits held in
//! memory, with GitHub's failure behaviour for the cases the workflows hit
//! (unknown refs, name collisions, missing objects). Every effect is recorded,
//! and any effect can be made to fail by name.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use proptest::prelude::*;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, NewPullRequest};
use crate::github::{ClientFactory, GitHubApiError, GitHubErrorKind};
use crate::types::{
    CommentId, CommitData, GitReference, InstallationId, IssueNumber, PullRequestData, RepoId,
    Sha, TreeEntryContent,
};

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(|s| Sha::parse(s).unwrap())
}

pub fn arb_branch_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9/-]{0,50}".prop_map(String::from)
}

type Files = BTreeMap<String, String>;

#[derive(Default)]
struct MockState {
    /// Fully qualified ref name → commit.
    refs: BTreeMap<String, Sha>,
    trees: HashMap<Sha, Files>,
    commits: HashMap<Sha, CommitData>,
    pull_requests: Vec<NewPullRequest>,
    comments: Vec<(IssueNumber, String)>,
    effects: Vec<GitHubEffect>,
    clients: Vec<(Option<InstallationId>, RepoId)>,
    /// Effect name → (status, message) to fail with.
    failures: HashMap<&'static str, (Option<u16>, GitHubErrorKind, String)>,
    root_commit: Option<Sha>,
    next_object: u64,
}

impl MockState {
    fn fresh_sha(&mut self) -> Sha {
        self.next_object += 1;
        Sha::parse(format!("{:040x}", 0xc0ffee_0000 + self.next_object)).unwrap()
    }

    fn add_commit(&mut self, files: Files, message: &str, parents: Vec<Sha>) -> Sha {
        let tree = self.fresh_sha();
        self.trees.insert(tree.clone(), files);
        let sha = self.fresh_sha();
        let commit = CommitData {
            sha: sha.clone(),
            message: message.to_string(),
            author: crate::types::CommitAuthor {
                name: "octocat".to_string(),
                email: "octocat@example.com".to_string(),
                date: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            },
            tree,
            parents,
        };
        self.commits.insert(sha.clone(), commit);
        sha
    }

    fn is_ancestor(&self, ancestor: &Sha, descendant: &Sha) -> bool {
        let mut pending = vec![descendant.clone()];
        while let Some(sha) = pending.pop() {
            if &sha == ancestor {
                return true;
            }
            if let Some(commit) = self.commits.get(&sha) {
                pending.extend(commit.parents.iter().cloned());
            }
        }
        false
    }
}

/// An in-memory repository implementing [`GitHubInterpreter`].
///
/// Cloning shares the repository, so the same instance can be handed out as
/// a [`ClientFactory`] and inspected afterwards.
#[derive(Clone)]
pub struct MockGitHub {
    repo: RepoId,
    state: Arc<Mutex<MockState>>,
}

impl MockGitHub {
    /// An empty repository with no refs.
    pub fn new() -> Self {
        MockGitHub {
            repo: RepoId::new("octo", "widgets"),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// A repository with one commit (holding `README.md`) on `branch`.
    pub fn with_branch(branch: &str) -> Self {
        let github = Self::new();
        {
            let mut state = github.state();
            let files = Files::from([("README.md".to_string(), "# widgets\n".to_string())]);
            let root = state.add_commit(files, "Initial commit", vec![]);
            state.root_commit = Some(root.clone());
            state.refs.insert(format!("refs/heads/{branch}"), root);
        }
        github
    }

    /// Adds another branch pointing at the initial commit.
    pub fn add_branch(&self, branch: &str) {
        let mut state = self.state();
        let root = state.root_commit.clone().expect("repository has no commits");
        state.refs.insert(format!("refs/heads/{branch}"), root);
    }

    /// Makes every subsequent effect with this name fail with `err`.
    pub fn fail_on(&self, effect_name: &'static str, err: GitHubApiError) {
        self.state()
            .failures
            .insert(effect_name, (err.status_code, err.kind, err.message));
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Every effect interpreted so far, including failed ones.
    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.state().effects.clone()
    }

    pub fn effect_names(&self) -> Vec<&'static str> {
        self.state().effects.iter().map(GitHubEffect::name).collect()
    }

    /// The commit a fully qualified ref points at.
    pub fn ref_target(&self, ref_name: &str) -> Option<Sha> {
        self.state().refs.get(ref_name).cloned()
    }

    pub fn commit(&self, sha: &Sha) -> Option<CommitData> {
        self.state().commits.get(sha).cloned()
    }

    pub fn tree_files(&self, sha: &Sha) -> Option<BTreeMap<String, String>> {
        self.state().trees.get(sha).cloned()
    }

    /// Pull requests opened so far, in order.
    pub fn pull_requests(&self) -> Vec<NewPullRequest> {
        self.state().pull_requests.clone()
    }

    /// Comments posted so far, in order.
    pub fn comments(&self) -> Vec<(IssueNumber, String)> {
        self.state().comments.clone()
    }

    /// Clients requested through the [`ClientFactory`] impl.
    pub fn clients(&self) -> Vec<(Option<InstallationId>, RepoId)> {
        self.state().clients.clone()
    }

    fn apply(&self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
        let mut state = self.state();
        state.effects.push(effect.clone());

        if let Some((status, kind, message)) = state.failures.get(effect.name()) {
            return Err(GitHubApiError {
                kind: *kind,
                status_code: *status,
                message: message.clone(),
                source: None,
            });
        }

        match effect {
            GitHubEffect::GetRef { ref_name } => {
                let qualified = format!("refs/{ref_name}");
                let sha = state
                    .refs
                    .get(&qualified)
                    .cloned()
                    .ok_or_else(|| GitHubApiError::with_status(404, "Not Found"))?;
                Ok(GitHubResponse::Ref(GitReference {
                    ref_name: qualified,
                    sha,
                }))
            }

            GitHubEffect::CreateRef { ref_name, sha } => {
                if !ref_name.starts_with("refs/") {
                    return Err(GitHubApiError::with_status(
                        422,
                        "Reference name must start with 'refs/'",
                    ));
                }
                if state.refs.contains_key(&ref_name) {
                    return Err(GitHubApiError::with_status(422, "Reference already exists"));
                }
                if !state.commits.contains_key(&sha) {
                    return Err(GitHubApiError::with_status(422, "Object does not exist"));
                }
                state.refs.insert(ref_name.clone(), sha.clone());
                Ok(GitHubResponse::Ref(GitReference { ref_name, sha }))
            }

            GitHubEffect::UpdateRef {
                ref_name,
                sha,
                force,
            } => {
                let qualified = format!("refs/{ref_name}");
                let current = state
                    .refs
                    .get(&qualified)
                    .cloned()
                    .ok_or_else(|| GitHubApiError::with_status(422, "Reference does not exist"))?;
                if !state.commits.contains_key(&sha) {
                    return Err(GitHubApiError::with_status(422, "Object does not exist"));
                }
                if !force && !state.is_ancestor(&current, &sha) {
                    return Err(GitHubApiError::with_status(422, "Update is not a fast forward"));
                }
                state.refs.insert(qualified.clone(), sha.clone());
                Ok(GitHubResponse::Ref(GitReference {
                    ref_name: qualified,
                    sha,
                }))
            }

            GitHubEffect::CreateTree { base_tree, entries } => {
                // Like GitHub, accept a commit where a tree is expected.
                let base_tree = state
                    .commits
                    .get(&base_tree)
                    .map(|c| c.tree.clone())
                    .unwrap_or(base_tree);
                let mut files = state
                    .trees
                    .get(&base_tree)
                    .cloned()
                    .ok_or_else(|| GitHubApiError::with_status(422, "base_tree is not a valid tree"))?;
                for entry in entries {
                    match entry.content {
                        TreeEntryContent::Inline(content) => {
                            files.insert(entry.path, content);
                        }
                        TreeEntryContent::Blob(sha) => {
                            return Err(GitHubApiError::with_status(
                                422,
                                format!("blob {sha} does not exist"),
                            ));
                        }
                    }
                }
                let sha = state.fresh_sha();
                state.trees.insert(sha.clone(), files);
                Ok(GitHubResponse::Tree { sha })
            }

            GitHubEffect::GetCommit { sha } => state
                .commits
                .get(&sha)
                .cloned()
                .map(GitHubResponse::Commit)
                .ok_or_else(|| GitHubApiError::with_status(404, "Not Found")),

            GitHubEffect::CreateCommit {
                message,
                author,
                tree,
                parents,
            } => {
                if !state.trees.contains_key(&tree) {
                    return Err(GitHubApiError::with_status(422, "Tree SHA does not exist"));
                }
                if parents.iter().any(|p| !state.commits.contains_key(p)) {
                    return Err(GitHubApiError::with_status(422, "Parent SHA does not exist"));
                }
                let sha = state.fresh_sha();
                let commit = CommitData {
                    sha: sha.clone(),
                    message,
                    author,
                    tree,
                    parents,
                };
                state.commits.insert(sha, commit.clone());
                Ok(GitHubResponse::Commit(commit))
            }

            GitHubEffect::CreatePullRequest(request) => {
                for branch in [&request.head, &request.base] {
                    if !state.refs.contains_key(&format!("refs/heads/{branch}")) {
                        return Err(GitHubApiError::with_status(
                            422,
                            format!("Validation Failed: branch {branch} not found"),
                        ));
                    }
                }
                state.pull_requests.push(request.clone());
                let number = state.pull_requests.len() as u64;
                Ok(GitHubResponse::PullRequest(PullRequestData {
                    number: IssueNumber(number),
                    title: request.title,
                    html_url: format!(
                        "https://github.com/{}/{}/pull/{number}",
                        self.repo.owner, self.repo.repo
                    ),
                }))
            }

            GitHubEffect::PostComment { issue, body } => {
                state.comments.push((issue, body));
                Ok(GitHubResponse::CommentPosted {
                    id: CommentId(1000 + state.comments.len() as u64),
                })
            }
        }
    }
}

impl Default for MockGitHub {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubInterpreter for MockGitHub {
    type Error = GitHubApiError;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        let result = self.apply(effect);
        async move { result }
    }
}

impl ClientFactory for MockGitHub {
    type Client = MockGitHub;

    fn client_for(
        &self,
        installation: Option<InstallationId>,
        repo: RepoId,
    ) -> Result<Self::Client, GitHubApiError> {
        self.state().clients.push((installation, repo));
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_ref_is_not_found() {
        let github = MockGitHub::with_branch("main");
        let err = github
            .interpret(GitHubEffect::GetRef {
                ref_name: "heads/nope".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, GitHubErrorKind::NotFound);
    }

    #[tokio::test]
    async fn non_forced_update_must_fast_forward() {
        let github = MockGitHub::with_branch("main");
        let root = github.ref_target("refs/heads/main").unwrap();
        let other = {
            let mut state = github.state();
            state.add_commit(Files::new(), "unrelated", vec![])
        };

        let err = github
            .interpret(GitHubEffect::UpdateRef {
                ref_name: "heads/main".to_string(),
                sha: other.clone(),
                force: false,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, GitHubErrorKind::Validation);
        assert_eq!(github.ref_target("refs/heads/main"), Some(root));

        github
            .interpret(GitHubEffect::UpdateRef {
                ref_name: "heads/main".to_string(),
                sha: other.clone(),
                force: true,
            })
            .await
            .unwrap();
        assert_eq!(github.ref_target("refs/heads/main"), Some(other));
    }

    proptest! {
        /// Generated object ids are always valid and never repeat.
        #[test]
        fn prop_fresh_shas_are_unique(n in 1usize..50) {
            let mut state = MockState::default();
            let shas: std::collections::HashSet<Sha> = (0..n).map(|_| state.fresh_sha()).collect();
            prop_assert_eq!(shas.len(), n);
        }
    }
}
