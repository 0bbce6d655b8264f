//! forge::traits
//!
//! Forge trait definition for interacting with the repository host.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network or
//! subprocess I/O. A forge instance is bound to exactly one hosted
//! repository. All methods return `Result` so the workflows can surface the
//! remote's own error message to the operator.
//!
//! # Example
//!
//! ```ignore
//! use ugh::forge::{Forge, ForgeError};
//!
//! async fn lineage_exists(forge: &dyn Forge, branch: &str) -> Result<bool, ForgeError> {
//!     Ok(forge.get_branch(branch).await?.is_some())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::RepositoryId;

/// Errors from forge operations.
///
/// These map to the failure modes of a REST-capable git host. `message`
/// fields carry the host's own text verbatim when it supplied one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// An external command could not be run or produced unreadable output.
    #[error("command '{command}' failed: {message}")]
    CommandFailed {
        /// The command line that was run
        command: String,
        /// stderr or a description of the failure
        message: String,
    },
}

impl ForgeError {
    /// Map a non-success HTTP status and message to an error.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ForgeError::AuthFailed(format!("Invalid or expired token: {}", message)),
            403 => ForgeError::AuthFailed(format!("Permission denied: {}", message)),
            404 => ForgeError::NotFound(message),
            429 => ForgeError::RateLimited,
            s if s >= 500 => ForgeError::ApiError {
                status,
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError { status, message },
        }
    }

    /// Whether this is a not-found response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ForgeError::NotFound(_))
    }
}

/// A branch reference and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Branch name (without `refs/heads/`)
    pub name: String,
    /// Commit SHA
    pub sha: String,
}

/// Pull request information returned from the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR URL (web URL for viewing)
    pub url: String,
    /// PR title
    pub title: String,
    /// Head branch name
    pub head: String,
    /// Head commit SHA at query time
    pub head_sha: String,
    /// Base branch name
    pub base: String,
}

/// Filters for listing open pull requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPullsOpts {
    /// Head branch (`branch` or `owner:branch`)
    pub head: Option<String>,
    /// Base branch
    pub base: Option<String>,
    /// Page size; a single page is fetched
    pub per_page: u32,
}

impl ListPullsOpts {
    /// Page size used when none is specified.
    pub const DEFAULT_PER_PAGE: u32 = 100;

    /// Whether a pull request passes these filters.
    pub fn admits(&self, pr: &PullRequest) -> bool {
        let head_ok = self.head.as_deref().map_or(true, |head| {
            let branch = head.split_once(':').map(|(_, b)| b).unwrap_or(head);
            pr.head == branch
        });
        let base_ok = self.base.as_deref().map_or(true, |base| pr.base == base);
        head_ok && base_ok
    }
}

impl Default for ListPullsOpts {
    fn default() -> Self {
        Self {
            head: None,
            base: None,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// Request to create a pull request.
#[derive(Debug, Clone)]
pub struct CreatePrRequest {
    /// Head branch name (the branch with changes)
    pub head: String,
    /// Base branch name (the branch to merge into)
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// Create as draft
    pub draft: bool,
}

/// Request to update a pull request.
#[derive(Debug, Clone, Default)]
pub struct UpdatePrRequest {
    /// PR number
    pub number: u64,
    /// New title (if changing)
    pub title: Option<String>,
    /// New body (if changing)
    pub body: Option<String>,
    /// New base branch (if changing)
    pub base: Option<String>,
}

/// Merge method for merging a PR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Squash all commits and merge
    #[default]
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeMethod::Merge => write!(f, "merge"),
            MergeMethod::Squash => write!(f, "squash"),
            MergeMethod::Rebase => write!(f, "rebase"),
        }
    }
}

/// Request to merge a pull request.
///
/// `sha` is the head commit the caller observed; the host rejects the merge
/// if the head has moved since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrRequest {
    /// PR number
    pub number: u64,
    /// Expected head SHA
    pub sha: String,
    /// Merge method
    pub method: MergeMethod,
}

/// A release record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Host identifier
    pub id: u64,
    /// Tag name
    pub tag: String,
    /// Release title
    pub name: Option<String>,
    /// Release notes
    pub body: String,
    /// Unpublished draft
    pub draft: bool,
    /// Marked as pre-release
    pub prerelease: bool,
    /// Web URL
    pub url: String,
}

/// One page of the release list (newest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListReleasesOpts {
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub per_page: u32,
}

impl ListReleasesOpts {
    /// Host maximum page size.
    pub const MAX_PER_PAGE: u32 = 100;

    /// The given page at the maximum page size.
    pub fn page(page: u32) -> Self {
        Self {
            page,
            per_page: Self::MAX_PER_PAGE,
        }
    }

    /// Whether a page of `len` releases is the last one.
    pub fn is_last(&self, len: usize) -> bool {
        len < self.per_page as usize
    }
}

impl Default for ListReleasesOpts {
    fn default() -> Self {
        Self::page(1)
    }
}

/// Which releases count when searching the release list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseFilter {
    /// Include unpublished drafts
    pub include_drafts: bool,
    /// Include pre-releases
    pub include_prereleases: bool,
}

impl ReleaseFilter {
    /// Published, non-prerelease releases only.
    pub fn published() -> Self {
        Self {
            include_drafts: false,
            include_prereleases: false,
        }
    }

    /// Non-prerelease releases, drafts included.
    pub fn with_drafts() -> Self {
        Self {
            include_drafts: true,
            ..Self::published()
        }
    }

    /// Whether a release passes this filter.
    pub fn admits(&self, release: &Release) -> bool {
        (self.include_drafts || !release.draft)
            && (self.include_prereleases || !release.prerelease)
    }
}

/// Request to create a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReleaseRequest {
    /// Tag to create or reuse
    pub tag: String,
    /// Branch or SHA the tag is cut from
    pub target_commitish: String,
    /// Release title
    pub name: String,
    /// Release notes
    pub body: String,
    /// Create as unpublished draft
    pub draft: bool,
    /// Mark as pre-release
    pub prerelease: bool,
}

/// Request to edit a release.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReleaseRequest {
    /// Release id
    pub id: u64,
    /// New title (if changing)
    pub name: Option<String>,
    /// New body, replacing the old one entirely (if changing)
    pub body: Option<String>,
}

/// The Forge trait for interacting with the repository host.
///
/// Implementations are bound to one repository.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so independent calls against the
/// same forge can be awaited concurrently.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Callers should handle:
/// - `NotFound`: Resource doesn't exist
/// - `AuthFailed`: Token missing, invalid or lacking permissions
/// - `ApiError`: Display the host's message to the operator
/// - `NetworkError` / `CommandFailed`: Transport failure
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github", "hub").
    fn name(&self) -> &'static str;

    /// The repository this forge is bound to.
    fn repository(&self) -> &RepositoryId;

    /// Get the repository's default branch.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the repository doesn't exist or is not visible
    async fn default_branch(&self) -> Result<String, ForgeError>;

    /// Look up a branch by exact name.
    ///
    /// Returns `None` if the branch does not exist.
    async fn get_branch(&self, name: &str) -> Result<Option<BranchRef>, ForgeError>;

    /// Create a branch pointing at `sha`.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 422 if the branch already exists
    async fn create_branch(&self, name: &str, sha: &str) -> Result<BranchRef, ForgeError>;

    /// Delete a branch.
    async fn delete_branch(&self, name: &str) -> Result<(), ForgeError>;

    /// Merge `head` into `base` on the host.
    ///
    /// Returns the merge commit SHA, or `None` when `base` already contains
    /// `head` and nothing was merged.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 409 on merge conflict
    async fn merge_branches(&self, base: &str, head: &str) -> Result<Option<String>, ForgeError>;

    /// List open pull requests (single page).
    async fn list_open_prs(&self, opts: ListPullsOpts) -> Result<Vec<PullRequest>, ForgeError>;

    /// Create a new pull request.
    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError>;

    /// Update an existing pull request.
    async fn update_pr(&self, request: UpdatePrRequest) -> Result<PullRequest, ForgeError>;

    /// Merge a pull request, returning the resulting commit SHA.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 409 if the head moved since it was queried
    /// - `ApiError` with status 405 if the pull request is not mergeable
    async fn merge_pr(&self, request: MergePrRequest) -> Result<String, ForgeError>;

    /// Request reviews from users.
    async fn request_reviewers(&self, number: u64, reviewers: &[String])
        -> Result<(), ForgeError>;

    /// Assign users to a pull request.
    async fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<(), ForgeError>;

    /// Add labels to a pull request.
    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), ForgeError>;

    /// List one page of releases, newest first, drafts and pre-releases
    /// included.
    async fn list_releases(&self, opts: ListReleasesOpts) -> Result<Vec<Release>, ForgeError>;

    /// Create a release.
    async fn create_release(&self, request: CreateReleaseRequest)
        -> Result<Release, ForgeError>;

    /// Edit a release.
    async fn update_release(&self, request: UpdateReleaseRequest)
        -> Result<Release, ForgeError>;

    /// Delete a release object. The tag is left in place.
    async fn delete_release(&self, id: u64) -> Result<(), ForgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(head: &str, base: &str) -> PullRequest {
        PullRequest {
            number: 1,
            url: String::new(),
            title: "t".into(),
            head: head.into(),
            head_sha: "abc".into(),
            base: base.into(),
        }
    }

    fn release(draft: bool, prerelease: bool) -> Release {
        Release {
            id: 1,
            tag: "1.0.1".into(),
            name: None,
            body: String::new(),
            draft,
            prerelease,
            url: String::new(),
        }
    }

    #[test]
    fn merge_method_display() {
        assert_eq!(format!("{}", MergeMethod::Merge), "merge");
        assert_eq!(format!("{}", MergeMethod::Squash), "squash");
        assert_eq!(format!("{}", MergeMethod::Rebase), "rebase");
    }

    #[test]
    fn merge_method_default_is_squash() {
        assert_eq!(MergeMethod::default(), MergeMethod::Squash);
    }

    #[test]
    fn list_pulls_filters() {
        let opts = ListPullsOpts {
            head: Some("acme:feature-x".into()),
            base: Some("master".into()),
            ..Default::default()
        };
        assert!(opts.admits(&pr("feature-x", "master")));
        assert!(!opts.admits(&pr("feature-x", "2.2.x")));
        assert!(!opts.admits(&pr("feature-y", "master")));
        assert!(ListPullsOpts::default().admits(&pr("anything", "anywhere")));
        assert_eq!(ListPullsOpts::default().per_page, 100);
    }

    #[test]
    fn release_filters() {
        let published = ReleaseFilter::published();
        assert!(published.admits(&release(false, false)));
        assert!(!published.admits(&release(true, false)));
        assert!(!published.admits(&release(false, true)));

        let drafts = ReleaseFilter::with_drafts();
        assert!(drafts.admits(&release(true, false)));
        assert!(!drafts.admits(&release(true, true)));
    }

    #[test]
    fn release_pages() {
        let first = ListReleasesOpts::default();
        assert_eq!(first, ListReleasesOpts::page(1));
        assert_eq!(first.per_page, 100);
        assert!(!first.is_last(100));
        assert!(first.is_last(99));
        assert!(first.is_last(0));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ForgeError::from_status(404, "Not Found".into()),
            ForgeError::NotFound("Not Found".into())
        );
        assert_eq!(
            ForgeError::from_status(429, String::new()),
            ForgeError::RateLimited
        );
        assert!(matches!(
            ForgeError::from_status(401, "Bad credentials".into()),
            ForgeError::AuthFailed(_)
        ));
        assert_eq!(
            ForgeError::from_status(409, "Merge conflict".into()),
            ForgeError::ApiError {
                status: 409,
                message: "Merge conflict".into()
            }
        );
        assert!(matches!(
            ForgeError::from_status(502, "Bad gateway".into()),
            ForgeError::ApiError { status: 502, .. }
        ));
    }

    #[test]
    fn forge_error_display() {
        assert_eq!(
            format!("{}", ForgeError::NotFound("Branch not found".into())),
            "not found: Branch not found"
        );
        assert_eq!(
            format!(
                "{}",
                ForgeError::ApiError {
                    status: 422,
                    message: "Validation failed".into()
                }
            ),
            "API error: 422 - Validation failed"
        );
        assert_eq!(
            format!(
                "{}",
                ForgeError::CommandFailed {
                    command: "hub api".into(),
                    message: "not found".into()
                }
            ),
            "command 'hub api' failed: not found"
        );
    }
}
