//! engine::release
//!
//! Draft release planning and upsert.
//!
//! # States
//!
//! ```text
//! NoRelease --merge--> DraftPending --merge--> DraftPending
//!                           |
//!                       finalize
//!                           v
//!                       Published
//! ```
//!
//! The state is recomputed from the host on every run: the latest published
//! non-prerelease tag (or `1.0.0`) is incremented to get the next version,
//! and the newest non-prerelease release (drafts included) is a pending
//! draft only when it is a draft tagged with exactly that version.
//!
//! Merging the same pull request twice into a pending draft appends its line
//! twice. Lines are never deduplicated.

use semver::Version;

use crate::core::types::{parse_release_tag, ReleaseTarget, ReleaseType};
use crate::forge::{
    CreateReleaseRequest, Forge, ListReleasesOpts, PullRequest, Release, ReleaseFilter,
    UpdateReleaseRequest,
};

use super::merge::{find_open_pull_request, merge};
use super::{Session, WorkflowError};

/// Baseline used when a repository has no published release.
pub const DEFAULT_BASELINE: Version = Version::new(1, 0, 0);

/// Pages of the release list searched before giving up.
pub const MAX_RELEASE_PAGES: u32 = 10;

/// Draft release state for the computed next version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftReleaseState {
    /// No release at all (drafts included)
    Absent,
    /// The newest release is a draft tagged with the next version
    DraftMatchesTarget(Release),
    /// The newest release is published or tagged differently
    DraftMismatch {
        /// Tag of the newest release
        tag: String,
    },
}

impl DraftReleaseState {
    /// The pending draft, if any.
    pub fn pending(&self) -> Option<&Release> {
        match self {
            DraftReleaseState::DraftMatchesTarget(release) => Some(release),
            _ => None,
        }
    }
}

/// The computed next version and its draft state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    /// Latest published version, or [`DEFAULT_BASELINE`]
    pub baseline: Version,
    /// `baseline` incremented by the release type
    pub next: Version,
    pub state: DraftReleaseState,
}

impl ReleasePlan {
    /// The tag (and title) of the next release.
    pub fn next_tag(&self) -> String {
        self.next.to_string()
    }
}

/// What a pre-release run did to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No open pull request for the ticket; nothing changed
    Skipped,
    /// Merged and created a new draft
    Created { merged: u64, release: Release },
    /// Merged and appended to the pending draft
    Appended { merged: u64, release: Release },
    /// Published the pending draft
    Finalized(Release),
}

/// Compute the next version and draft state.
pub async fn plan(forge: &dyn Forge, release_type: ReleaseType) -> Result<ReleasePlan, WorkflowError> {
    let baseline = find_release(forge, ReleaseFilter::published(), |r| {
        match parse_release_tag(&r.tag) {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!(tag = %r.tag, "ignoring release: {}", e);
                None
            }
        }
    })
    .await?
    .unwrap_or(DEFAULT_BASELINE);
    let next = release_type.increment(&baseline)?;

    let newest = find_release(forge, ReleaseFilter::with_drafts(), |r| Some(r.clone())).await?;
    let state = classify(newest, &next);

    tracing::debug!(repository = %forge.repository(), %baseline, %next, ?state, "release plan");
    Ok(ReleasePlan {
        baseline,
        next,
        state,
    })
}

/// Walk the release list newest first and return the first value `pick`
/// yields for a release admitted by `filter`.
///
/// Stops after the last page or after [`MAX_RELEASE_PAGES`] pages.
async fn find_release<T>(
    forge: &dyn Forge,
    filter: ReleaseFilter,
    mut pick: impl FnMut(&Release) -> Option<T>,
) -> Result<Option<T>, WorkflowError> {
    for page in 1..=MAX_RELEASE_PAGES {
        let opts = ListReleasesOpts::page(page);
        let releases = forge.list_releases(opts).await?;
        let found = releases
            .iter()
            .filter(|r| filter.admits(r))
            .find_map(&mut pick);
        if found.is_some() {
            return Ok(found);
        }
        if opts.is_last(releases.len()) {
            return Ok(None);
        }
    }
    tracing::warn!(
        repository = %forge.repository(),
        pages = MAX_RELEASE_PAGES,
        ?filter,
        "no matching release on the searched pages"
    );
    Ok(None)
}

/// Decide the draft state of the newest release against `next`.
pub fn classify(newest: Option<Release>, next: &Version) -> DraftReleaseState {
    match newest {
        None => DraftReleaseState::Absent,
        Some(release) => {
            let matches = parse_release_tag(&release.tag)
                .map(|v| &v == next)
                .unwrap_or(false);
            if release.draft && matches {
                DraftReleaseState::DraftMatchesTarget(release)
            } else {
                DraftReleaseState::DraftMismatch { tag: release.tag }
            }
        }
    }
}

/// The release notes line for a merged pull request.
pub fn release_line(pr: &PullRequest) -> String {
    format!("* {} #{}", pr.title, pr.number)
}

/// Append `line` to an existing body.
pub fn append_line(body: &str, line: &str) -> String {
    let body = body.trim_end_matches(['\r', '\n']);
    if body.is_empty() {
        line.to_string()
    } else {
        format!("{}\n{}", body, line)
    }
}

/// Run one pre-release step against one repository.
pub async fn pre_release(
    session: &Session<'_>,
    target: &ReleaseTarget,
    release_type: ReleaseType,
) -> Result<UpsertOutcome, WorkflowError> {
    let forge = session.forge;
    let narrator = &session.narrator;

    let default_branch = forge.default_branch().await?;
    let plan = plan(forge, release_type).await?;
    narrator.step(format!(
        "Next {} release is {} (latest published {})",
        release_type, plan.next, plan.baseline
    ));

    match target {
        ReleaseTarget::Finalize => finalize(session, &plan, &default_branch).await,
        ReleaseTarget::Ticket(ticket) => {
            let Some(pr) = find_open_pull_request(forge, ticket, &default_branch).await? else {
                narrator.step(format!(
                    "No open pull request from {} into {}; skipping",
                    ticket, default_branch
                ));
                return Ok(UpsertOutcome::Skipped);
            };

            session.confirm(&format!(
                "Are you sure you want to merge #{} {} into {} for release {}?",
                pr.number, pr.title, default_branch, plan.next
            ))?;

            narrator.step(format!("Merging #{} {}", pr.number, pr.title));
            merge(forge, &pr).await?;
            record_merge(session, &plan, &pr, &default_branch).await
        }
    }
}

/// Add a merged pull request to the next release's draft.
pub async fn record_merge(
    session: &Session<'_>,
    plan: &ReleasePlan,
    pr: &PullRequest,
    default_branch: &str,
) -> Result<UpsertOutcome, WorkflowError> {
    let forge = session.forge;
    let line = release_line(pr);

    match plan.state.pending() {
        Some(draft) => {
            session
                .narrator
                .step(format!("Adding #{} to draft release {}", pr.number, plan.next));
            let release = forge
                .update_release(UpdateReleaseRequest {
                    id: draft.id,
                    body: Some(append_line(&draft.body, &line)),
                    ..Default::default()
                })
                .await?;
            Ok(UpsertOutcome::Appended {
                merged: pr.number,
                release,
            })
        }
        None => {
            session
                .narrator
                .step(format!("Creating draft release {}", plan.next));
            let release = forge
                .create_release(CreateReleaseRequest {
                    tag: plan.next_tag(),
                    target_commitish: default_branch.to_string(),
                    name: plan.next_tag(),
                    body: line,
                    draft: true,
                    prerelease: false,
                })
                .await?;
            Ok(UpsertOutcome::Created {
                merged: pr.number,
                release,
            })
        }
    }
}

/// Publish the pending draft by deleting and recreating it.
pub async fn finalize(
    session: &Session<'_>,
    plan: &ReleasePlan,
    default_branch: &str,
) -> Result<UpsertOutcome, WorkflowError> {
    let forge = session.forge;
    let Some(draft) = plan.state.pending() else {
        return Err(WorkflowError::precondition(format!(
            "Unable to find release '{}' to finalize",
            plan.next
        )));
    };

    session.confirm(&format!(
        "Are you sure you want to publish release {}? This will:\n\n\t1. Delete the draft release\n\t2. Publish {} from {}\n\nProceed?",
        plan.next, plan.next, default_branch
    ))?;

    session
        .narrator
        .step(format!("Deleting draft release {}", plan.next));
    forge.delete_release(draft.id).await?;

    session.narrator.step(format!(
        "Publishing release {} from {}",
        plan.next, default_branch
    ));
    // The draft's own tag, which may carry a `v` prefix.
    let release = forge
        .create_release(CreateReleaseRequest {
            tag: draft.tag.clone(),
            target_commitish: default_branch.to_string(),
            name: draft.tag.clone(),
            body: draft.body.clone(),
            draft: false,
            prerelease: false,
        })
        .await?;
    Ok(UpsertOutcome::Finalized(release))
}
