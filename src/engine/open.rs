//! engine::open
//!
//! Opening a templated pull request in one repository.

use crate::core::config::PullRequestDefaults;
use crate::forge::{CreatePrRequest, PullRequest};

use super::{Session, WorkflowError};

/// What to open.
#[derive(Debug, Clone, Default)]
pub struct PullRequestDraft {
    /// Head branch
    pub head: String,
    /// Text appended to the head branch to form the title
    pub message: String,
    /// Base branch; the repository's default branch when absent
    pub base: Option<String>,
    /// Reviewers, assignees and labels applied after creation
    pub defaults: PullRequestDefaults,
}

impl PullRequestDraft {
    /// Title of the opened pull request (`"<head> <message>"`).
    pub fn title(&self) -> String {
        format!("{} {}", self.head, self.message)
    }
}

/// Whether `branch` exists in the session's repository.
pub async fn branch_present(session: &Session<'_>, branch: &str) -> Result<bool, WorkflowError> {
    Ok(session.forge.get_branch(branch).await?.is_some())
}

/// Open the pull request and apply the template defaults.
pub async fn open_pull_request(
    session: &Session<'_>,
    draft: &PullRequestDraft,
) -> Result<PullRequest, WorkflowError> {
    let forge = session.forge;
    let base = match &draft.base {
        Some(base) => base.clone(),
        None => forge.default_branch().await?,
    };

    session
        .narrator
        .step(format!("Opening pull request {} -> {}", draft.head, base));
    let pr = forge
        .create_pr(CreatePrRequest {
            head: draft.head.clone(),
            base,
            title: draft.title(),
            body: None,
            draft: false,
        })
        .await?;

    forge
        .request_reviewers(pr.number, &draft.defaults.reviewers())
        .await?;
    forge
        .add_assignees(pr.number, &draft.defaults.assignees())
        .await?;
    forge
        .add_labels(pr.number, &draft.defaults.label_names())
        .await?;

    session.narrator.step(format!("Opened #{} {}", pr.number, pr.url));
    Ok(pr)
}
