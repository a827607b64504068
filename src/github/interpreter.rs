//! GitHub effect interpreter using octocrab.
//!
//! This module implements the `GitHubInterpreter` trait, executing GitHub effects
//! against the real GitHub API via octocrab.
//!
//! Key implementation details:
//! - Git Data API calls go through octocrab's raw REST helpers with local
//!   request/response structs, so only the fields the bot reads are modelled
//! - No retries: every effect is attempted exactly once
//! - Errors are categorised by [`GitHubApiError::from_octocrab`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, NewPullRequest};
use crate::types::{
    CommentId, CommitAuthor, CommitData, GitReference, IssueNumber, PullRequestData, Sha,
    TreeEntry, TreeEntryContent,
};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        interpret_github_effect(self, effect).await
    }
}

/// Interprets a GitHub effect, executing it against the GitHub API.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::GetRef { ref_name } => get_ref(client, &ref_name).await,
        GitHubEffect::CreateRef { ref_name, sha } => create_ref(client, ref_name, sha).await,
        GitHubEffect::UpdateRef {
            ref_name,
            sha,
            force,
        } => update_ref(client, &ref_name, sha, force).await,
        GitHubEffect::CreateTree { base_tree, entries } => {
            create_tree(client, base_tree, entries).await
        }
        GitHubEffect::GetCommit { sha } => get_commit(client, sha).await,
        GitHubEffect::CreateCommit {
            message,
            author,
            tree,
            parents,
        } => create_commit(client, message, author, tree, parents).await,
        GitHubEffect::CreatePullRequest(request) => create_pull_request(client, request).await,
        GitHubEffect::PostComment { issue, body } => post_comment(client, issue, body).await,
    }
}

/// Percent-encodes each segment of a ref name, keeping the `/` separators.
///
/// This is a pure function extracted for testability.
pub fn encode_ref_path(ref_name: &str) -> String {
    ref_name
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn parse_sha(field: &str, value: &str) -> Result<Sha, GitHubApiError> {
    Sha::parse(value)
        .map_err(|e| GitHubApiError::invalid_response(format!("{} in response: {}", field, e)))
}

// ─── References ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RefResponse {
    #[serde(rename = "ref")]
    ref_name: String,
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

impl RefResponse {
    fn into_reference(self) -> Result<GitHubResponse, GitHubApiError> {
        Ok(GitHubResponse::Ref(GitReference {
            sha: parse_sha("object.sha", &self.object.sha)?,
            ref_name: self.ref_name,
        }))
    }
}

async fn get_ref(client: &OctocrabClient, ref_name: &str) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.route(&format!("git/ref/{}", encode_ref_path(ref_name)));

    let result: Result<RefResponse, _> = client.inner().get(&url, None::<&()>).await;

    match result {
        Ok(response) => response.into_reference(),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn create_ref(
    client: &OctocrabClient,
    ref_name: String,
    sha: Sha,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.route("git/refs");

    #[derive(Serialize)]
    struct CreateRefRequest<'a> {
        #[serde(rename = "ref")]
        ref_name: &'a str,
        sha: &'a str,
    }

    let request = CreateRefRequest {
        ref_name: &ref_name,
        sha: sha.as_str(),
    };

    let result: Result<RefResponse, _> = client.inner().post(&url, Some(&request)).await;

    match result {
        Ok(response) => response.into_reference(),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn update_ref(
    client: &OctocrabClient,
    ref_name: &str,
    sha: Sha,
    force: bool,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.route(&format!("git/refs/{}", encode_ref_path(ref_name)));

    #[derive(Serialize)]
    struct UpdateRefRequest<'a> {
        sha: &'a str,
        force: bool,
    }

    let request = UpdateRefRequest {
        sha: sha.as_str(),
        force,
    };

    let result: Result<RefResponse, _> = client.inner().patch(&url, Some(&request)).await;

    match result {
        Ok(response) => response.into_reference(),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Trees ────────────────────────────────────────────────────────────────────

/// One entry of a create-tree request body.
///
/// GitHub takes either `content` (creating the blob inline) or `sha`, never both.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct TreeEntryRequest<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

impl<'a> From<&'a TreeEntry> for TreeEntryRequest<'a> {
    fn from(entry: &'a TreeEntry) -> Self {
        let (content, sha) = match &entry.content {
            TreeEntryContent::Inline(content) => (Some(content.as_str()), None),
            TreeEntryContent::Blob(sha) => (None, Some(sha.as_str())),
        };
        TreeEntryRequest {
            path: &entry.path,
            mode: entry.mode.as_api_str(),
            kind: entry.kind.as_api_str(),
            content,
            sha,
        }
    }
}

async fn create_tree(
    client: &OctocrabClient,
    base_tree: Sha,
    entries: Vec<TreeEntry>,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.route("git/trees");

    #[derive(Serialize)]
    struct CreateTreeRequest<'a> {
        base_tree: &'a str,
        tree: Vec<TreeEntryRequest<'a>>,
    }

    #[derive(Deserialize)]
    struct CreateTreeResponse {
        sha: String,
    }

    let request = CreateTreeRequest {
        base_tree: base_tree.as_str(),
        tree: entries.iter().map(TreeEntryRequest::from).collect(),
    };

    let result: Result<CreateTreeResponse, _> = client.inner().post(&url, Some(&request)).await;

    match result {
        Ok(response) => Ok(GitHubResponse::Tree {
            sha: parse_sha("sha", &response.sha)?,
        }),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Commits ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    message: String,
    author: AuthorResponse,
    tree: ShaOnly,
    parents: Vec<ShaOnly>,
}

#[derive(Debug, Deserialize)]
struct AuthorResponse {
    name: String,
    email: String,
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ShaOnly {
    sha: String,
}

impl CommitResponse {
    fn into_commit(self) -> Result<GitHubResponse, GitHubApiError> {
        let parents = self
            .parents
            .iter()
            .map(|p| parse_sha("parents[].sha", &p.sha))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GitHubResponse::Commit(CommitData {
            sha: parse_sha("sha", &self.sha)?,
            message: self.message,
            author: CommitAuthor {
                name: self.author.name,
                email: self.author.email,
                date: self.author.date,
            },
            tree: parse_sha("tree.sha", &self.tree.sha)?,
            parents,
        }))
    }
}

async fn get_commit(client: &OctocrabClient, sha: Sha) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.route(&format!("git/commits/{}", sha));

    let result: Result<CommitResponse, _> = client.inner().get(&url, None::<&()>).await;

    match result {
        Ok(response) => response.into_commit(),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn create_commit(
    client: &OctocrabClient,
    message: String,
    author: CommitAuthor,
    tree: Sha,
    parents: Vec<Sha>,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.route("git/commits");

    #[derive(Serialize)]
    struct CreateCommitRequest<'a> {
        message: &'a str,
        tree: &'a str,
        parents: Vec<&'a str>,
        author: &'a CommitAuthor,
    }

    let request = CreateCommitRequest {
        message: &message,
        tree: tree.as_str(),
        parents: parents.iter().map(Sha::as_str).collect(),
        author: &author,
    };

    let result: Result<CommitResponse, _> = client.inner().post(&url, Some(&request)).await;

    match result {
        Ok(response) => response.into_commit(),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Pull Requests ────────────────────────────────────────────────────────────

async fn create_pull_request(
    client: &OctocrabClient,
    request: NewPullRequest,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = client.route("pulls");

    #[derive(Deserialize)]
    struct PullRequestResponse {
        number: u64,
        title: Option<String>,
        html_url: Option<String>,
    }

    let result: Result<PullRequestResponse, _> = client.inner().post(&url, Some(&request)).await;

    match result {
        Ok(response) => {
            let html_url = response.html_url.ok_or_else(|| {
                GitHubApiError::invalid_response(format!(
                    "pull request #{} has no html_url",
                    response.number
                ))
            })?;
            Ok(GitHubResponse::PullRequest(PullRequestData {
                number: IssueNumber(response.number),
                title: response.title.unwrap_or(request.title),
                html_url,
            }))
        }
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Comments ─────────────────────────────────────────────────────────────────

async fn post_comment(
    client: &OctocrabClient,
    issue: IssueNumber,
    body: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let result = client
        .inner()
        .issues(client.owner(), client.repo_name())
        .create_comment(issue.0, body)
        .await;

    match result {
        Ok(comment) => Ok(GitHubResponse::CommentPosted {
            id: CommentId(comment.id.into_inner()),
        }),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}
