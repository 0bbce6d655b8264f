//! forge::github
//!
//! GitHub forge implementation over the REST API.
//!
//! # Design
//!
//! Every operation is a single REST call built from [`super::payload`]
//! bodies. Non-success responses are mapped to [`ForgeError`] by status code
//! with the API's own message preserved.
//!
//! # Authentication
//!
//! A personal access token is optional. Without one, requests are sent
//! unauthenticated, which is enough for reads against public repositories.
//!
//! # Rate Limiting
//!
//! Returns `ForgeError::RateLimited` when limits are hit. No automatic retry.
//!
//! # Example
//!
//! ```ignore
//! use ugh::core::types::RepositoryId;
//! use ugh::forge::github::GitHubForge;
//! use ugh::forge::Forge;
//!
//! let repo = RepositoryId::parse("acme/widgets")?;
//! let forge = GitHubForge::new(repo, Some("ghp_xxx".into()));
//! let default = forge.default_branch().await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::payload::{
    self, AssigneesBody, BranchResponse, CreatePrBody, CreateRefBody, CreateReleaseBody,
    LabelsBody, MergeBranchesBody, MergePrBody, PullRequestResponse, RefResponse,
    ReleaseResponse, RepositoryResponse, RequestReviewersBody, ShaOnly, UpdatePrBody,
    UpdateReleaseBody,
};
use super::traits::{
    BranchRef, CreatePrRequest, CreateReleaseRequest, Forge, ForgeError, ListPullsOpts,
    ListReleasesOpts, MergePrRequest, PullRequest, Release, UpdatePrRequest,
    UpdateReleaseRequest,
};
use crate::core::config::DEFAULT_API_BASE;
use crate::core::types::RepositoryId;

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("ugh/", env!("CARGO_PKG_VERSION"));

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Personal access token
    token: Option<String>,
    /// Repository this forge is bound to
    repository: RepositoryId,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("has_token", &self.token.is_some())
            .field("repository", &self.repository)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a forge for `repository` against api.github.com.
    pub fn new(repository: RepositoryId, token: Option<String>) -> Self {
        Self::with_api_base(repository, token, DEFAULT_API_BASE)
    }

    /// Create a forge with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (`https://github.example.com/api/v3`)
    /// or for pointing at a test server.
    pub fn with_api_base(
        repository: RepositoryId,
        token: Option<String>,
        api_base: impl Into<String>,
    ) -> Self {
        let api_base = api_base.into();
        Self {
            client: Client::new(),
            token,
            repository,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a GitHub forge from a remote URL.
    ///
    /// # Example
    ///
    /// ```
    /// use ugh::forge::github::GitHubForge;
    ///
    /// let forge = GitHubForge::from_remote_url("git@github.com:acme/widgets.git", None);
    /// assert!(forge.is_some());
    /// ```
    pub fn from_remote_url(url: &str, token: Option<String>) -> Option<Self> {
        let (owner, name) = parse_github_url(url)?;
        let repository = RepositoryId::new(owner, name).ok()?;
        Some(Self::new(repository, token))
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ForgeError::AuthFailed("token contains invalid header characters".into())
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        let base = format!(
            "{}/repos/{}/{}",
            self.api_base,
            self.repository.owner(),
            self.repository.name()
        );
        if path.is_empty() {
            base
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Attach headers, send, and return the raw response.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ForgeError> {
        let response = request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;
        tracing::debug!(url = %response.url(), status = response.status().as_u16(), "github response");
        Ok(response)
    }

    /// Send and decode a JSON response body.
    async fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ForgeError> {
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Send and discard the response body.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ForgeError> {
        let response = self.send(request).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        let body = response.text().await.unwrap_or_default();
        let message = payload::error_message(&body);
        tracing::debug!(status = status.as_u16(), %message, "github error response");
        Err(ForgeError::from_status(status.as_u16(), message))
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    fn repository(&self) -> &RepositoryId {
        &self.repository
    }

    async fn default_branch(&self) -> Result<String, ForgeError> {
        let repo: RepositoryResponse = self
            .send_json(self.client.get(self.repo_url("")))
            .await?;
        Ok(repo.default_branch)
    }

    async fn get_branch(&self, name: &str) -> Result<Option<BranchRef>, ForgeError> {
        let url = self.repo_url(&format!("branches/{}", payload::branch_path(name)));
        match self.send_json::<BranchResponse>(self.client.get(url)).await {
            Ok(branch) => Ok(Some(branch.into())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<BranchRef, ForgeError> {
        let body = CreateRefBody {
            ref_name: payload::heads_ref(name),
            sha,
        };
        let created: RefResponse = self
            .send_json(self.client.post(self.repo_url("git/refs")).json(&body))
            .await?;
        Ok(created.into())
    }

    async fn delete_branch(&self, name: &str) -> Result<(), ForgeError> {
        let url = self.repo_url(&format!("git/refs/heads/{}", payload::branch_path(name)));
        self.send_empty(self.client.delete(url)).await
    }

    async fn merge_branches(&self, base: &str, head: &str) -> Result<Option<String>, ForgeError> {
        let body = MergeBranchesBody { base, head };
        let response = self
            .send(self.client.post(self.repo_url("merges")).json(&body))
            .await?;

        // 204: base already contains head
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let merged: ShaOnly = self.handle_response(response).await?;
        Ok(Some(merged.sha))
    }

    async fn list_open_prs(&self, opts: ListPullsOpts) -> Result<Vec<PullRequest>, ForgeError> {
        let mut query: Vec<(&str, String)> = vec![
            ("state", "open".to_string()),
            ("per_page", opts.per_page.to_string()),
        ];
        if let Some(head) = &opts.head {
            // The API requires owner:branch for the head filter
            let head = if head.contains(':') {
                head.clone()
            } else {
                format!("{}:{}", self.repository.owner(), head)
            };
            query.push(("head", head));
        }
        if let Some(base) = &opts.base {
            query.push(("base", base.clone()));
        }

        let prs: Vec<PullRequestResponse> = self
            .send_json(self.client.get(self.repo_url("pulls")).query(&query))
            .await?;
        Ok(prs.into_iter().map(Into::into).collect())
    }

    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError> {
        let body = CreatePrBody {
            head: &request.head,
            base: &request.base,
            title: &request.title,
            body: request.body.as_deref(),
            draft: request.draft,
        };
        let pr: PullRequestResponse = self
            .send_json(self.client.post(self.repo_url("pulls")).json(&body))
            .await?;
        Ok(pr.into())
    }

    async fn update_pr(&self, request: UpdatePrRequest) -> Result<PullRequest, ForgeError> {
        let url = self.repo_url(&format!("pulls/{}", request.number));
        let body = UpdatePrBody {
            title: request.title.as_deref(),
            body: request.body.as_deref(),
            base: request.base.as_deref(),
        };
        let pr: PullRequestResponse = self.send_json(self.client.patch(url).json(&body)).await?;
        Ok(pr.into())
    }

    async fn merge_pr(&self, request: MergePrRequest) -> Result<String, ForgeError> {
        let url = self.repo_url(&format!("pulls/{}/merge", request.number));
        let body = MergePrBody {
            sha: &request.sha,
            merge_method: request.method.to_string(),
        };
        let merged: ShaOnly = self.send_json(self.client.put(url).json(&body)).await?;
        Ok(merged.sha)
    }

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
    ) -> Result<(), ForgeError> {
        if reviewers.is_empty() {
            return Ok(());
        }
        let url = self.repo_url(&format!("pulls/{}/requested_reviewers", number));
        let body = RequestReviewersBody { reviewers };
        self.send_empty(self.client.post(url).json(&body)).await
    }

    async fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<(), ForgeError> {
        if assignees.is_empty() {
            return Ok(());
        }
        let url = self.repo_url(&format!("issues/{}/assignees", number));
        let body = AssigneesBody { assignees };
        self.send_empty(self.client.post(url).json(&body)).await
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), ForgeError> {
        if labels.is_empty() {
            return Ok(());
        }
        let url = self.repo_url(&format!("issues/{}/labels", number));
        let body = LabelsBody { labels };
        self.send_empty(self.client.post(url).json(&body)).await
    }

    async fn list_releases(&self, opts: ListReleasesOpts) -> Result<Vec<Release>, ForgeError> {
        let query = [
            ("per_page", opts.per_page.to_string()),
            ("page", opts.page.to_string()),
        ];
        let releases: Vec<ReleaseResponse> = self
            .send_json(self.client.get(self.repo_url("releases")).query(&query))
            .await?;
        Ok(releases.into_iter().map(Release::from).collect())
    }

    async fn create_release(
        &self,
        request: CreateReleaseRequest,
    ) -> Result<Release, ForgeError> {
        let body = CreateReleaseBody {
            tag_name: &request.tag,
            target_commitish: &request.target_commitish,
            name: &request.name,
            body: &request.body,
            draft: request.draft,
            prerelease: request.prerelease,
        };
        let release: ReleaseResponse = self
            .send_json(self.client.post(self.repo_url("releases")).json(&body))
            .await?;
        Ok(release.into())
    }

    async fn update_release(
        &self,
        request: UpdateReleaseRequest,
    ) -> Result<Release, ForgeError> {
        let url = self.repo_url(&format!("releases/{}", request.id));
        let body = UpdateReleaseBody {
            name: request.name.as_deref(),
            body: request.body.as_deref(),
        };
        let release: ReleaseResponse = self.send_json(self.client.patch(url).json(&body)).await?;
        Ok(release.into())
    }

    async fn delete_release(&self, id: u64) -> Result<(), ForgeError> {
        let url = self.repo_url(&format!("releases/{}", id));
        self.send_empty(self.client.delete(url)).await
    }
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Parse a GitHub remote URL to extract owner and repo.
///
/// The host is not checked, so GitHub Enterprise remotes resolve the same
/// way as `github.com` ones. Supported forms:
/// - `git@github.com:owner/repo.git` (scp-like, any user and host)
/// - `ssh://git@github.com/owner/repo.git` (port allowed)
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// use ugh::forge::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:acme/widgets.git").unwrap();
/// assert_eq!(owner, "acme");
/// assert_eq!(repo, "widgets");
///
/// let (owner, repo) = parse_github_url("https://github.example.com/acme/widgets").unwrap();
/// assert_eq!((owner.as_str(), repo.as_str()), ("acme", "widgets"));
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let url = url.trim();
    let rest = match url.split_once("://") {
        Some((scheme, rest)) => {
            if !matches!(scheme, "ssh" | "git+ssh" | "https" | "http" | "git") {
                return None;
            }
            let (authority, path) = rest.split_once('/')?;
            if authority.is_empty() {
                return None;
            }
            path
        }
        None => {
            let (host, path) = url.split_once(':')?;
            if host.is_empty() || host.contains('/') || host.contains(char::is_whitespace) {
                return None;
            }
            path
        }
    };

    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_github_url {
        use super::*;

        fn pair(owner: &str, repo: &str) -> Option<(String, String)> {
            Some((owner.to_string(), repo.to_string()))
        }

        #[test]
        fn ssh_with_git_suffix() {
            assert_eq!(
                parse_github_url("git@github.com:acme/widgets.git"),
                pair("acme", "widgets")
            );
        }

        #[test]
        fn ssh_url_form() {
            assert_eq!(
                parse_github_url("ssh://git@github.com/acme/widgets.git"),
                pair("acme", "widgets")
            );
        }

        #[test]
        fn https_without_git_suffix() {
            assert_eq!(
                parse_github_url("https://github.com/acme/widgets"),
                pair("acme", "widgets")
            );
        }

        #[test]
        fn repo_with_dots() {
            assert_eq!(
                parse_github_url("git@github.com:acme/widgets.io.git"),
                pair("acme", "widgets.io")
            );
        }

        #[test]
        fn enterprise_hosts() {
            assert_eq!(
                parse_github_url("git@github.example.com:acme/widgets.git"),
                pair("acme", "widgets")
            );
            assert_eq!(
                parse_github_url("ssh://git@github.example.com:2222/acme/widgets.git"),
                pair("acme", "widgets")
            );
            assert_eq!(
                parse_github_url("https://github.example.com/acme/widgets/"),
                pair("acme", "widgets")
            );
        }

        #[test]
        fn unsupported_schemes() {
            assert!(parse_github_url("file:///srv/acme/widgets.git").is_none());
            assert!(parse_github_url("/srv/acme/widgets.git").is_none());
        }

        #[test]
        fn invalid_format() {
            assert!(parse_github_url("not a url").is_none());
            assert!(parse_github_url("https://github.com/").is_none());
            assert!(parse_github_url("https://github.com/owner").is_none());
            assert!(parse_github_url("https://github.com/owner/repo/tree/main").is_none());
        }
    }

    mod github_forge {
        use super::*;

        fn acme() -> RepositoryId {
            RepositoryId::parse("acme/widgets").unwrap()
        }

        #[test]
        fn new_creates_forge() {
            let forge = GitHubForge::new(acme(), None);
            assert_eq!(forge.name(), "github");
            assert_eq!(forge.repository().to_string(), "acme/widgets");
            assert_eq!(forge.api_base, "https://api.github.com");
        }

        #[test]
        fn from_remote_url_https() {
            let forge =
                GitHubForge::from_remote_url("https://github.com/acme/widgets.git", None).unwrap();
            assert_eq!(forge.repository().owner(), "acme");
            assert_eq!(forge.repository().name(), "widgets");
            assert!(GitHubForge::from_remote_url("https://gitlab.com/a/b", None).is_none());
        }

        #[test]
        fn with_api_base_trims_slash() {
            let forge =
                GitHubForge::with_api_base(acme(), None, "https://github.example.com/api/v3/");
            assert_eq!(forge.api_base, "https://github.example.com/api/v3");
        }

        #[test]
        fn repo_url_format() {
            let forge = GitHubForge::new(acme(), None);
            assert_eq!(
                forge.repo_url("pulls"),
                "https://api.github.com/repos/acme/widgets/pulls"
            );
            assert_eq!(
                forge.repo_url(""),
                "https://api.github.com/repos/acme/widgets"
            );
        }

        #[test]
        fn headers_without_token() {
            let forge = GitHubForge::new(acme(), None);
            let headers = forge.headers().unwrap();
            assert!(headers.get(AUTHORIZATION).is_none());
            assert!(headers.get(USER_AGENT).is_some());
        }

        #[test]
        fn headers_with_token() {
            let forge = GitHubForge::new(acme(), Some("ghp_abc".into()));
            let headers = forge.headers().unwrap();
            assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer ghp_abc");
        }

        #[test]
        fn debug_redacts_token() {
            let forge = GitHubForge::new(acme(), Some("secret_token_abc123".into()));
            let debug_output = format!("{:?}", forge);
            assert!(!debug_output.contains("secret_token_abc123"));
            assert!(debug_output.contains("has_token"));
        }
    }
}
