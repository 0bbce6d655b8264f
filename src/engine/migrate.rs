//! engine::migrate
//!
//! Lineage initialization and cleanup.
//!
//! # Initialize
//!
//! Creates the new lineage branch from the default branch after folding the
//! previous lineage into it:
//!
//! 1. Previous branch must exist, new branch must not
//! 2. Read the default branch
//! 3. Confirm
//! 4. Merge previous into default (no-op merge falls back to the default tip)
//! 5. Create the new branch at the resulting SHA
//!
//! # Cleanup
//!
//! Retires the previous lineage:
//!
//! 1. Repository, previous branch and new branch must all exist
//! 2. Select open pull requests based on the previous branch
//! 3. Confirm
//! 4. Re-target every selected pull request to the new branch, concurrently
//! 5. Delete the previous branch, only if every re-target succeeded
//!
//! # Example
//!
//! ```ignore
//! let lineage = ReleaseLineage::parse("2.3", None)?;
//! let outcome = migrate::initialize(&session, &lineage).await?;
//! println!("created {} at {}", outcome.branch.name, outcome.branch.sha);
//! ```

use futures::future::join_all;

use crate::core::types::{LineageVersion, ReleaseLineage};
use crate::forge::{BranchRef, ListPullsOpts, PullRequest, UpdatePrRequest};
use crate::ui::output::count_noun;

use super::gate::{self, LineageRole};
use super::{RebaseFailure, Session, WorkflowError};

/// Result of a successful initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    /// The created lineage branch
    pub branch: BranchRef,
    /// Merge commit SHA, or `None` when the default branch already
    /// contained the previous lineage
    pub merge_commit: Option<String>,
}

/// Result of a successful cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    /// Pull requests re-targeted to the new lineage
    pub rebased: Vec<u64>,
    /// The deleted branch
    pub deleted: String,
}

/// Create the lineage branch for `lineage.version()`.
pub async fn initialize(
    session: &Session<'_>,
    lineage: &ReleaseLineage,
) -> Result<InitOutcome, WorkflowError> {
    let forge = session.forge;
    let narrator = &session.narrator;
    let new = lineage.version();
    let old = lineage.previous()?;

    narrator.step(format!("Checking previous branch lineage {}", old));
    gate::require_branch(forge, &old, LineageRole::Previous).await?;
    narrator.step(format!("Checking new branch lineage {}", new));
    gate::require_no_branch(forge, &new).await?;

    narrator.step(format!("Fetching default branch of {}", forge.repository()));
    let default_branch = forge.default_branch().await?;

    session.confirm(&initialize_prompt(&old, &new, &default_branch))?;

    narrator.step(format!("Merging {} into {}", old, default_branch));
    let merge_commit = forge
        .merge_branches(&default_branch, &old.branch_name())
        .await?;

    let sha = match &merge_commit {
        Some(sha) => sha.clone(),
        None => {
            narrator.step(format!(
                "{} already contains {}; using its current tip",
                default_branch, old
            ));
            forge
                .get_branch(&default_branch)
                .await?
                .map(|b| b.sha)
                .ok_or_else(|| {
                    WorkflowError::precondition(format!(
                        "Default branch {} does not exist",
                        default_branch
                    ))
                })?
        }
    };

    narrator.step(format!("Creating {} at {}", new, sha));
    let branch = forge.create_branch(&new.branch_name(), &sha).await?;
    tracing::debug!(repository = %forge.repository(), version = %new, %sha, "lineage initialized");

    Ok(InitOutcome {
        branch,
        merge_commit,
    })
}

/// Retire `lineage.previous()` in favor of `lineage.version()`.
pub async fn cleanup(
    session: &Session<'_>,
    lineage: &ReleaseLineage,
) -> Result<CleanupOutcome, WorkflowError> {
    let forge = session.forge;
    let narrator = &session.narrator;
    let new = lineage.version();
    let old = lineage.previous()?;

    narrator.step(format!("Checking repository {}", forge.repository()));
    gate::require_repository(forge).await?;
    narrator.step(format!("Checking previous branch lineage {}", old));
    gate::require_branch(forge, &old, LineageRole::Previous).await?;
    narrator.step(format!("Checking new branch lineage {}", new));
    gate::require_branch(forge, &new, LineageRole::New).await?;

    narrator.step(format!("Listing pull requests based on {}", old));
    let affected = pull_requests_based_on(session, &old).await?;

    session.confirm(&cleanup_prompt(&old, affected.len()))?;

    rebase_all(session, &affected, &new).await?;

    narrator.step(format!("Deleting {}", old));
    forge.delete_branch(&old.branch_name()).await?;
    tracing::debug!(repository = %forge.repository(), version = %old, "lineage deleted");

    Ok(CleanupOutcome {
        rebased: affected.iter().map(|pr| pr.number).collect(),
        deleted: old.branch_name(),
    })
}

/// Open pull requests whose base is the lineage branch (single page).
async fn pull_requests_based_on(
    session: &Session<'_>,
    version: &LineageVersion,
) -> Result<Vec<PullRequest>, WorkflowError> {
    let prs = session.forge.list_open_prs(ListPullsOpts::default()).await?;
    Ok(prs
        .into_iter()
        .filter(|pr| version.matches_branch(&pr.base))
        .collect())
}

/// Re-target every pull request to `new`, issuing all updates at once.
async fn rebase_all(
    session: &Session<'_>,
    prs: &[PullRequest],
    new: &LineageVersion,
) -> Result<(), WorkflowError> {
    let base = new.branch_name();
    let updates = prs.iter().map(|pr| {
        let base = base.clone();
        async move {
            session
                .narrator
                .step(format!("Updating base of #{} {}", pr.number, pr.title));
            session
                .forge
                .update_pr(UpdatePrRequest {
                    number: pr.number,
                    base: Some(base),
                    ..Default::default()
                })
                .await
                .map_err(|error| RebaseFailure {
                    number: pr.number,
                    error,
                })
        }
    });

    let failures: Vec<RebaseFailure> = join_all(updates)
        .await
        .into_iter()
        .filter_map(Result::err)
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        for failure in &failures {
            session.narrator.error(format!(
                "Failed to update base of #{}: {}",
                failure.number, failure.error
            ));
        }
        Err(WorkflowError::RebaseFailed(failures))
    }
}

/// Confirmation text for initialization.
pub fn initialize_prompt(old: &LineageVersion, new: &LineageVersion, default_branch: &str) -> String {
    format!(
        "Are you sure you want to initialize lineage {new}? This will:\n\n\t1. Merge {old} into {default_branch}\n\t2. Create {new}\n\nProceed?"
    )
}

/// Confirmation text for cleanup.
pub fn cleanup_prompt(old: &LineageVersion, affected: usize) -> String {
    format!(
        "Are you sure you want to deprecate lineage {old}? This will:\n\n\t1. Update the base branch of {}\n\t2. Delete {old}\n\nProceed?",
        count_noun(affected, "pull request", "pull requests")
    )
}
