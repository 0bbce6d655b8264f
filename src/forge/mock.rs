//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge keeps branches, open pull requests and releases in memory
//! and behaves like the host for the calls the workflows make: creating an
//! existing branch fails with 422, merging a branch into one that already
//! has the same tip is a no-op, merging a pull request with a stale head SHA
//! fails with 409, and so on. Failures can be injected per operation and
//! every call is recorded for ordering assertions.
//!
//! # Example
//!
//! ```
//! use ugh::forge::mock::MockForge;
//! use ugh::forge::{CreatePrRequest, Forge};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new()
//!     .with_branch("master", "m1")
//!     .with_branch("feature", "f1");
//!
//! let pr = forge.create_pr(CreatePrRequest {
//!     head: "feature".to_string(),
//!     base: "master".to_string(),
//!     title: "Add feature".to_string(),
//!     body: None,
//!     draft: false,
//! }).await.unwrap();
//!
//! assert_eq!(pr.number, 1);
//! assert_eq!(pr.head_sha, "f1");
//! # });
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::traits::{
    BranchRef, CreatePrRequest, CreateReleaseRequest, Forge, ForgeError, ListPullsOpts,
    ListReleasesOpts, MergeMethod, MergePrRequest, PullRequest, Release, UpdatePrRequest,
    UpdateReleaseRequest,
};
use crate::core::types::RepositoryId;

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    repository: RepositoryId,
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Whether the repository is visible at all.
    exists: bool,
    default_branch: String,
    /// Branch name to tip SHA.
    branches: BTreeMap<String, String>,
    /// Open pull requests by number.
    prs: BTreeMap<u64, PullRequest>,
    /// Numbers of pull requests merged through `merge_pr`.
    merged: Vec<u64>,
    next_pr_number: u64,
    /// Releases, newest first.
    releases: Vec<Release>,
    next_release_id: u64,
    /// Counter for synthesized merge commits.
    next_commit: u64,
    /// Injected failures.
    fail_on: Vec<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    DefaultBranch(ForgeError),
    GetBranch(ForgeError),
    CreateBranch(ForgeError),
    DeleteBranch(ForgeError),
    MergeBranches(ForgeError),
    ListOpenPrs(ForgeError),
    CreatePr(ForgeError),
    /// Fail update_pr for one pull request only.
    UpdatePr { number: u64, error: ForgeError },
    MergePr(ForgeError),
    RequestReviewers(ForgeError),
    ListReleases(ForgeError),
    CreateRelease(ForgeError),
    UpdateRelease(ForgeError),
    DeleteRelease(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    DefaultBranch,
    GetBranch {
        name: String,
    },
    CreateBranch {
        name: String,
        sha: String,
    },
    DeleteBranch {
        name: String,
    },
    MergeBranches {
        base: String,
        head: String,
    },
    ListOpenPrs {
        head: Option<String>,
        base: Option<String>,
    },
    CreatePr {
        head: String,
        base: String,
        title: String,
    },
    UpdatePr {
        number: u64,
        base: Option<String>,
    },
    MergePr {
        number: u64,
        sha: String,
        method: MergeMethod,
    },
    RequestReviewers {
        number: u64,
        reviewers: Vec<String>,
    },
    AddAssignees {
        number: u64,
        assignees: Vec<String>,
    },
    AddLabels {
        number: u64,
        labels: Vec<String>,
    },
    ListReleases,
    CreateRelease {
        tag: String,
        target_commitish: String,
        body: String,
        draft: bool,
    },
    UpdateRelease {
        id: u64,
        body: Option<String>,
    },
    DeleteRelease {
        id: u64,
    },
}

impl MockOperation {
    /// Whether this operation changes remote state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            MockOperation::DefaultBranch
                | MockOperation::GetBranch { .. }
                | MockOperation::ListOpenPrs { .. }
                | MockOperation::ListReleases
        )
    }
}

impl MockForge {
    /// Create an empty mock forge for `mock/repo` with default branch `master`.
    pub fn new() -> Self {
        Self::for_repository(RepositoryId::from_static("mock", "repo"))
    }

    /// Create an empty mock forge bound to `repository`.
    pub fn for_repository(repository: RepositoryId) -> Self {
        Self {
            repository,
            inner: Arc::new(Mutex::new(MockForgeInner {
                exists: true,
                default_branch: "master".to_string(),
                branches: BTreeMap::new(),
                prs: BTreeMap::new(),
                merged: Vec::new(),
                next_pr_number: 1,
                releases: Vec::new(),
                next_release_id: 1,
                next_commit: 1,
                fail_on: Vec::new(),
                operations: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockForgeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every call behave as if the repository does not exist.
    pub fn missing_repository(self) -> Self {
        self.lock().exists = false;
        self
    }

    /// Set the default branch name.
    pub fn with_default_branch(self, name: &str) -> Self {
        self.lock().default_branch = name.to_string();
        self
    }

    /// Add a branch.
    pub fn with_branch(self, name: &str, sha: &str) -> Self {
        self.lock()
            .branches
            .insert(name.to_string(), sha.to_string());
        self
    }

    /// Add an open pull request, keeping its number.
    pub fn with_pr(self, pr: PullRequest) -> Self {
        {
            let mut inner = self.lock();
            inner.next_pr_number = inner.next_pr_number.max(pr.number + 1);
            inner.prs.insert(pr.number, pr);
        }
        self
    }

    /// Add a release as the newest one, keeping its id.
    pub fn with_release(self, release: Release) -> Self {
        {
            let mut inner = self.lock();
            inner.next_release_id = inner.next_release_id.max(release.id + 1);
            inner.releases.insert(0, release);
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use ugh::forge::mock::{FailOn, MockForge};
    /// use ugh::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::CreatePr(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on.push(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on.clear();
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Recorded operations that changed remote state.
    pub fn mutations(&self) -> Vec<MockOperation> {
        self.operations()
            .into_iter()
            .filter(MockOperation::is_mutation)
            .collect()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Tip of a branch, if it exists.
    pub fn branch_sha(&self, name: &str) -> Option<String> {
        self.lock().branches.get(name).cloned()
    }

    /// Whether a branch exists.
    pub fn has_branch(&self, name: &str) -> bool {
        self.branch_sha(name).is_some()
    }

    /// An open pull request by number.
    pub fn pr(&self, number: u64) -> Option<PullRequest> {
        self.lock().prs.get(&number).cloned()
    }

    /// All open pull requests, by number.
    pub fn open_prs(&self) -> Vec<PullRequest> {
        self.lock().prs.values().cloned().collect()
    }

    /// Numbers of pull requests merged through the forge.
    pub fn merged_prs(&self) -> Vec<u64> {
        self.lock().merged.clone()
    }

    /// All releases, newest first.
    pub fn releases(&self) -> Vec<Release> {
        self.lock().releases.clone()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    /// Return the injected error or the missing-repository error, if any.
    fn check_fail(&self, matches: impl Fn(&FailOn) -> Option<&ForgeError>) -> Result<(), ForgeError> {
        let inner = self.lock();
        if !inner.exists {
            return Err(ForgeError::NotFound("Not Found".into()));
        }
        match inner.fail_on.iter().find_map(matches) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

fn unprocessable(message: &str) -> ForgeError {
    ForgeError::ApiError {
        status: 422,
        message: message.to_string(),
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn repository(&self) -> &RepositoryId {
        &self.repository
    }

    async fn default_branch(&self) -> Result<String, ForgeError> {
        self.record(MockOperation::DefaultBranch);
        self.check_fail(|f| match f {
            FailOn::DefaultBranch(e) => Some(e),
            _ => None,
        })?;
        Ok(self.lock().default_branch.clone())
    }

    async fn get_branch(&self, name: &str) -> Result<Option<BranchRef>, ForgeError> {
        self.record(MockOperation::GetBranch {
            name: name.to_string(),
        });
        self.check_fail(|f| match f {
            FailOn::GetBranch(e) => Some(e),
            _ => None,
        })?;
        Ok(self.branch_sha(name).map(|sha| BranchRef {
            name: name.to_string(),
            sha,
        }))
    }

    async fn create_branch(&self, name: &str, sha: &str) -> Result<BranchRef, ForgeError> {
        self.record(MockOperation::CreateBranch {
            name: name.to_string(),
            sha: sha.to_string(),
        });
        self.check_fail(|f| match f {
            FailOn::CreateBranch(e) => Some(e),
            _ => None,
        })?;

        let mut inner = self.lock();
        if inner.branches.contains_key(name) {
            return Err(unprocessable("Reference already exists"));
        }
        inner.branches.insert(name.to_string(), sha.to_string());
        Ok(BranchRef {
            name: name.to_string(),
            sha: sha.to_string(),
        })
    }

    async fn delete_branch(&self, name: &str) -> Result<(), ForgeError> {
        self.record(MockOperation::DeleteBranch {
            name: name.to_string(),
        });
        self.check_fail(|f| match f {
            FailOn::DeleteBranch(e) => Some(e),
            _ => None,
        })?;

        match self.lock().branches.remove(name) {
            Some(_) => Ok(()),
            None => Err(unprocessable("Reference does not exist")),
        }
    }

    async fn merge_branches(&self, base: &str, head: &str) -> Result<Option<String>, ForgeError> {
        self.record(MockOperation::MergeBranches {
            base: base.to_string(),
            head: head.to_string(),
        });
        self.check_fail(|f| match f {
            FailOn::MergeBranches(e) => Some(e),
            _ => None,
        })?;

        let mut inner = self.lock();
        let (Some(base_sha), Some(head_sha)) =
            (inner.branches.get(base).cloned(), inner.branches.get(head).cloned())
        else {
            return Err(ForgeError::NotFound("Base or head does not exist".into()));
        };
        if base_sha == head_sha {
            return Ok(None);
        }
        let sha = format!("merge-{}", inner.next_commit);
        inner.next_commit += 1;
        inner.branches.insert(base.to_string(), sha.clone());
        Ok(Some(sha))
    }

    async fn list_open_prs(&self, opts: ListPullsOpts) -> Result<Vec<PullRequest>, ForgeError> {
        self.record(MockOperation::ListOpenPrs {
            head: opts.head.clone(),
            base: opts.base.clone(),
        });
        self.check_fail(|f| match f {
            FailOn::ListOpenPrs(e) => Some(e),
            _ => None,
        })?;

        Ok(self
            .lock()
            .prs
            .values()
            .filter(|pr| opts.admits(pr))
            .take(opts.per_page as usize)
            .cloned()
            .collect())
    }

    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError> {
        self.record(MockOperation::CreatePr {
            head: request.head.clone(),
            base: request.base.clone(),
            title: request.title.clone(),
        });
        self.check_fail(|f| match f {
            FailOn::CreatePr(e) => Some(e),
            _ => None,
        })?;

        let mut inner = self.lock();
        if !inner.branches.contains_key(&request.base) {
            return Err(unprocessable("Validation failed: base invalid"));
        }
        let Some(head_sha) = inner.branches.get(&request.head).cloned() else {
            return Err(unprocessable("Validation failed: head invalid"));
        };

        let number = inner.next_pr_number;
        inner.next_pr_number += 1;

        let pr = PullRequest {
            number,
            url: format!("https://github.com/{}/pull/{}", self.repository, number),
            title: request.title,
            head: request.head,
            head_sha,
            base: request.base,
        };
        inner.prs.insert(number, pr.clone());
        Ok(pr)
    }

    async fn update_pr(&self, request: UpdatePrRequest) -> Result<PullRequest, ForgeError> {
        self.record(MockOperation::UpdatePr {
            number: request.number,
            base: request.base.clone(),
        });
        self.check_fail(|f| match f {
            FailOn::UpdatePr { number, error } if *number == request.number => Some(error),
            _ => None,
        })?;

        let mut inner = self.lock();
        if let Some(base) = &request.base {
            if !inner.branches.contains_key(base) {
                return Err(unprocessable("Validation failed: base invalid"));
            }
        }
        let pr = inner
            .prs
            .get_mut(&request.number)
            .ok_or_else(|| ForgeError::NotFound(format!("PR #{} not found", request.number)))?;
        if let Some(title) = request.title {
            pr.title = title;
        }
        if let Some(base) = request.base {
            pr.base = base;
        }
        Ok(pr.clone())
    }

    async fn merge_pr(&self, request: MergePrRequest) -> Result<String, ForgeError> {
        self.record(MockOperation::MergePr {
            number: request.number,
            sha: request.sha.clone(),
            method: request.method,
        });
        self.check_fail(|f| match f {
            FailOn::MergePr(e) => Some(e),
            _ => None,
        })?;

        let mut inner = self.lock();
        let pr = inner
            .prs
            .get(&request.number)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("PR #{} not found", request.number)))?;
        if pr.head_sha != request.sha {
            return Err(ForgeError::ApiError {
                status: 409,
                message: "Head branch was modified. Review and try the merge again.".into(),
            });
        }

        let sha = format!("{}-{}", request.method, inner.next_commit);
        inner.next_commit += 1;
        inner.branches.insert(pr.base.clone(), sha.clone());
        inner.prs.remove(&request.number);
        inner.merged.push(request.number);
        Ok(sha)
    }

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
    ) -> Result<(), ForgeError> {
        self.record(MockOperation::RequestReviewers {
            number,
            reviewers: reviewers.to_vec(),
        });
        self.check_fail(|f| match f {
            FailOn::RequestReviewers(e) => Some(e),
            _ => None,
        })
    }

    async fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<(), ForgeError> {
        self.record(MockOperation::AddAssignees {
            number,
            assignees: assignees.to_vec(),
        });
        self.check_fail(|_| None)
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), ForgeError> {
        self.record(MockOperation::AddLabels {
            number,
            labels: labels.to_vec(),
        });
        self.check_fail(|_| None)
    }

    async fn list_releases(&self, opts: ListReleasesOpts) -> Result<Vec<Release>, ForgeError> {
        self.record(MockOperation::ListReleases);
        self.check_fail(|f| match f {
            FailOn::ListReleases(e) => Some(e),
            _ => None,
        })?;

        Ok(self
            .lock()
            .releases
            .iter()
            .skip(opts.page.saturating_sub(1) as usize * opts.per_page as usize)
            .take(opts.per_page as usize)
            .cloned()
            .collect())
    }

    async fn create_release(
        &self,
        request: CreateReleaseRequest,
    ) -> Result<Release, ForgeError> {
        self.record(MockOperation::CreateRelease {
            tag: request.tag.clone(),
            target_commitish: request.target_commitish.clone(),
            body: request.body.clone(),
            draft: request.draft,
        });
        self.check_fail(|f| match f {
            FailOn::CreateRelease(e) => Some(e),
            _ => None,
        })?;

        let mut inner = self.lock();
        if inner.releases.iter().any(|r| r.tag == request.tag) {
            return Err(unprocessable("Validation failed: tag_name already_exists"));
        }
        let id = inner.next_release_id;
        inner.next_release_id += 1;
        let release = Release {
            id,
            url: format!(
                "https://github.com/{}/releases/tag/{}",
                self.repository, request.tag
            ),
            tag: request.tag,
            name: Some(request.name),
            body: request.body,
            draft: request.draft,
            prerelease: request.prerelease,
        };
        inner.releases.insert(0, release.clone());
        Ok(release)
    }

    async fn update_release(
        &self,
        request: UpdateReleaseRequest,
    ) -> Result<Release, ForgeError> {
        self.record(MockOperation::UpdateRelease {
            id: request.id,
            body: request.body.clone(),
        });
        self.check_fail(|f| match f {
            FailOn::UpdateRelease(e) => Some(e),
            _ => None,
        })?;

        let mut inner = self.lock();
        let release = inner
            .releases
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| ForgeError::NotFound(format!("Release {} not found", request.id)))?;
        if let Some(name) = request.name {
            release.name = Some(name);
        }
        if let Some(body) = request.body {
            release.body = body;
        }
        Ok(release.clone())
    }

    async fn delete_release(&self, id: u64) -> Result<(), ForgeError> {
        self.record(MockOperation::DeleteRelease { id });
        self.check_fail(|f| match f {
            FailOn::DeleteRelease(e) => Some(e),
            _ => None,
        })?;

        let mut inner = self.lock();
        let before = inner.releases.len();
        inner.releases.retain(|r| r.id != id);
        if inner.releases.len() == before {
            return Err(ForgeError::NotFound(format!("Release {} not found", id)));
        }
        Ok(())
    }
}
