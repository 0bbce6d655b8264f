//! forge::payload
//!
//! REST request and response bodies shared by the HTTP and hub transports.
//!
//! Both transports talk to the same REST endpoints, so the wire format lives
//! here once. Request bodies borrow from the caller; response bodies are
//! deserialized and converted into the transport-neutral types from
//! [`super::traits`].

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::traits::{BranchRef, PullRequest, Release};

// --------------------------------------------------------------------------
// Request bodies
// --------------------------------------------------------------------------

/// Body for `POST /repos/{o}/{r}/git/refs`.
#[derive(Debug, Serialize)]
pub struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: &'a str,
}

/// Body for `POST /repos/{o}/{r}/merges`.
#[derive(Debug, Serialize)]
pub struct MergeBranchesBody<'a> {
    pub base: &'a str,
    pub head: &'a str,
}

/// Body for `POST /repos/{o}/{r}/pulls`.
#[derive(Debug, Serialize)]
pub struct CreatePrBody<'a> {
    pub head: &'a str,
    pub base: &'a str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<&'a str>,
    pub draft: bool,
}

/// Body for `PATCH /repos/{o}/{r}/pulls/{n}`.
#[derive(Debug, Serialize)]
pub struct UpdatePrBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<&'a str>,
}

/// Body for `PUT /repos/{o}/{r}/pulls/{n}/merge`.
#[derive(Debug, Serialize)]
pub struct MergePrBody<'a> {
    pub sha: &'a str,
    pub merge_method: String,
}

/// Body for `POST /repos/{o}/{r}/pulls/{n}/requested_reviewers`.
#[derive(Debug, Serialize)]
pub struct RequestReviewersBody<'a> {
    pub reviewers: &'a [String],
}

/// Body for `POST /repos/{o}/{r}/issues/{n}/assignees`.
#[derive(Debug, Serialize)]
pub struct AssigneesBody<'a> {
    pub assignees: &'a [String],
}

/// Body for `POST /repos/{o}/{r}/issues/{n}/labels`.
#[derive(Debug, Serialize)]
pub struct LabelsBody<'a> {
    pub labels: &'a [String],
}

/// Body for `POST /repos/{o}/{r}/releases`.
#[derive(Debug, Serialize)]
pub struct CreateReleaseBody<'a> {
    pub tag_name: &'a str,
    pub target_commitish: &'a str,
    pub name: &'a str,
    pub body: &'a str,
    pub draft: bool,
    pub prerelease: bool,
}

/// Body for `PATCH /repos/{o}/{r}/releases/{id}`.
#[derive(Debug, Serialize)]
pub struct UpdateReleaseBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<&'a str>,
}

// --------------------------------------------------------------------------
// Response bodies
// --------------------------------------------------------------------------

/// Error response format.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// One entry of an error response's `errors` array.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
    pub code: Option<String>,
}

impl ErrorResponse {
    /// The top-level message followed by any detail messages.
    pub fn describe(&self) -> String {
        let details: Vec<&str> = self
            .errors
            .iter()
            .filter_map(|e| e.message.as_deref().or(e.code.as_deref()))
            .collect();
        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.message, details.join(", "))
        }
    }
}

/// Extract a human readable message from an error body.
///
/// Falls back to the trimmed raw body when it is not the usual JSON shape.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => err.describe(),
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Repository metadata (subset).
#[derive(Debug, Deserialize)]
pub struct RepositoryResponse {
    pub default_branch: String,
}

/// `GET /branches/{name}` response (subset).
#[derive(Debug, Deserialize)]
pub struct BranchResponse {
    pub name: String,
    pub commit: ShaOnly,
}

/// `POST /git/refs` response (subset).
#[derive(Debug, Deserialize)]
pub struct RefResponse {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub object: ShaOnly,
}

/// Any object carrying just a commit SHA.
#[derive(Debug, Deserialize)]
pub struct ShaOnly {
    pub sha: String,
}

/// Pull request response format (subset).
#[derive(Debug, Deserialize)]
pub struct PullRequestResponse {
    pub number: u64,
    pub html_url: String,
    pub title: String,
    pub head: PullRequestRef,
    pub base: PullRequestRef,
}

/// Pull request head/base.
#[derive(Debug, Deserialize)]
pub struct PullRequestRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
}

/// Release response format (subset).
#[derive(Debug, Deserialize)]
pub struct ReleaseResponse {
    pub id: u64,
    pub tag_name: String,
    pub name: Option<String>,
    pub body: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
    pub html_url: String,
}

impl From<BranchResponse> for BranchRef {
    fn from(branch: BranchResponse) -> Self {
        BranchRef {
            name: branch.name,
            sha: branch.commit.sha,
        }
    }
}

impl From<RefResponse> for BranchRef {
    fn from(r: RefResponse) -> Self {
        let name = r
            .ref_name
            .strip_prefix("refs/heads/")
            .unwrap_or(&r.ref_name)
            .to_string();
        BranchRef {
            name,
            sha: r.object.sha,
        }
    }
}

impl From<PullRequestResponse> for PullRequest {
    fn from(pr: PullRequestResponse) -> Self {
        PullRequest {
            number: pr.number,
            url: pr.html_url,
            title: pr.title,
            head: pr.head.ref_name,
            head_sha: pr.head.sha,
            base: pr.base.ref_name,
        }
    }
}

impl From<ReleaseResponse> for Release {
    fn from(release: ReleaseResponse) -> Self {
        Release {
            id: release.id,
            tag: release.tag_name,
            name: release.name.filter(|n| !n.is_empty()),
            body: release.body.unwrap_or_default(),
            draft: release.draft,
            prerelease: release.prerelease,
            url: release.html_url,
        }
    }
}

/// Branch path segment for the refs API (`git/refs/heads/{name}`).
pub fn heads_ref(name: &str) -> String {
    format!("refs/heads/{}", name)
}

/// Percent-encode a branch name for a URL path, keeping `/` separators.
///
/// `#`, `?` and `%` would otherwise end the path or start an escape.
pub fn branch_path(name: &str) -> String {
    name.split('/')
        .map(|part| {
            form_urlencoded::byte_serialize(part.as_bytes())
                .collect::<String>()
                .replace('+', "%20")
        })
        .collect::<Vec<_>>()
        .join("/")
}
