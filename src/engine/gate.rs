//! engine::gate
//!
//! Branch existence preconditions and the confirmation step.
//!
//! # Design
//!
//! Every mutating workflow starts by asserting which lineage branches exist
//! on the host. A failed assertion is a [`WorkflowError::Precondition`] and
//! ends the command for that repository; nothing is retried.

use std::fmt;

use crate::core::types::LineageVersion;
use crate::forge::{BranchRef, Forge};
use crate::ui::prompts::Prompter;

use super::WorkflowError;

/// Which side of a migration a lineage branch is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineageRole {
    /// The lineage being superseded
    Previous,
    /// The lineage replacing it
    New,
}

impl fmt::Display for LineageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineageRole::Previous => write!(f, "Previous"),
            LineageRole::New => write!(f, "New"),
        }
    }
}

/// Whether the branch for `version` exists.
pub async fn branch_exists(
    forge: &dyn Forge,
    version: &LineageVersion,
) -> Result<bool, WorkflowError> {
    Ok(lookup(forge, version).await?.is_some())
}

/// Assert the branch for `version` exists and return it.
///
/// # Errors
///
/// `Precondition("<role> branch lineage <version> does not exist")`
pub async fn require_branch(
    forge: &dyn Forge,
    version: &LineageVersion,
    role: LineageRole,
) -> Result<BranchRef, WorkflowError> {
    lookup(forge, version).await?.ok_or_else(|| {
        WorkflowError::precondition(format!(
            "{} branch lineage {} does not exist",
            role, version
        ))
    })
}

/// Assert the branch for `version` does not exist yet.
///
/// # Errors
///
/// `Precondition("New branch lineage <version> already exists")`
pub async fn require_no_branch(
    forge: &dyn Forge,
    version: &LineageVersion,
) -> Result<(), WorkflowError> {
    match lookup(forge, version).await? {
        Some(_) => Err(WorkflowError::precondition(format!(
            "{} branch lineage {} already exists",
            LineageRole::New,
            version
        ))),
        None => Ok(()),
    }
}

/// Assert the repository is visible and return its default branch.
///
/// # Errors
///
/// `Precondition("Repository <owner/name> does not exist")` when the host
/// reports it as not found.
pub async fn require_repository(forge: &dyn Forge) -> Result<String, WorkflowError> {
    match forge.default_branch().await {
        Ok(branch) => Ok(branch),
        Err(e) if e.is_not_found() => Err(WorkflowError::precondition(format!(
            "Repository {} does not exist",
            forge.repository()
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Ask before a destructive step.
///
/// Non-interactive runs proceed without asking. Declining yields
/// [`WorkflowError::UserAborted`].
pub fn confirm_step(
    prompter: &dyn Prompter,
    interactive: bool,
    message: &str,
) -> Result<(), WorkflowError> {
    if !interactive {
        tracing::debug!(%message, "skipping confirmation (non-interactive)");
        return Ok(());
    }
    if prompter.confirm(message)? {
        Ok(())
    } else {
        Err(WorkflowError::UserAborted)
    }
}

async fn lookup(
    forge: &dyn Forge,
    version: &LineageVersion,
) -> Result<Option<BranchRef>, WorkflowError> {
    let name = version.branch_name();
    let branch = forge.get_branch(&name).await?;
    tracing::debug!(repository = %forge.repository(), branch = %name, exists = branch.is_some(), "branch lookup");
    Ok(branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::MockForge;
    use crate::ui::prompts::ScriptedPrompter;

    fn v(text: &str) -> LineageVersion {
        LineageVersion::parse(text).unwrap()
    }

    #[tokio::test]
    async fn require_branch_reports_role() {
        let forge = MockForge::new().with_branch("2.3.x", "abc");
        let found = require_branch(&forge, &v("2.3"), LineageRole::New)
            .await
            .unwrap();
        assert_eq!(found.sha, "abc");

        let err = require_branch(&forge, &v("2.2"), LineageRole::Previous)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Previous branch lineage 2.2.x does not exist");
    }

    #[tokio::test]
    async fn require_no_branch_rejects_existing() {
        let forge = MockForge::new().with_branch("2.3.x", "abc");
        let err = require_no_branch(&forge, &v("2.3")).await.unwrap_err();
        assert_eq!(err.to_string(), "New branch lineage 2.3.x already exists");
        assert!(require_no_branch(&forge, &v("2.4")).await.is_ok());
        assert!(!branch_exists(&forge, &v("2.4")).await.unwrap());
    }

    #[tokio::test]
    async fn require_repository_maps_not_found() {
        let forge = MockForge::new().missing_repository();
        let err = require_repository(&forge).await.unwrap_err();
        assert_eq!(err.to_string(), "Repository mock/repo does not exist");

        let forge = MockForge::new().with_default_branch("main");
        assert_eq!(require_repository(&forge).await.unwrap(), "main");
    }

    #[test]
    fn confirm_step_outcomes() {
        let prompter = ScriptedPrompter::new([true, false]);
        assert!(confirm_step(&prompter, true, "one?").is_ok());
        assert!(matches!(
            confirm_step(&prompter, true, "two?"),
            Err(WorkflowError::UserAborted)
        ));
        assert!(confirm_step(&prompter, false, "three?").is_ok());
        assert_eq!(prompter.asked(), vec!["one?", "two?"]);
    }
}
