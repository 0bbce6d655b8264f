//! engine::error
//!
//! Workflow error taxonomy.

use thiserror::Error;

use crate::core::types::{LineageError, TypeError};
use crate::forge::ForgeError;
use crate::git::GitError;
use crate::ui::prompts::PromptError;

/// A pull request whose base could not be re-targeted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseFailure {
    /// Pull request number
    pub number: u64,
    /// Why the update failed
    pub error: ForgeError,
}

/// Errors from workflows.
///
/// Every variant is terminal for the repository being processed.
/// [`WorkflowError::UserAborted`] and prompt failures also stop a
/// multi-repository run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Malformed version or repository text.
    #[error(transparent)]
    Format(#[from] TypeError),

    /// A major release without an explicit previous version.
    #[error(transparent)]
    Lineage(#[from] LineageError),

    /// A required branch or release is missing, or a branch that must not
    /// exist already does.
    #[error("{0}")]
    Precondition(String),

    /// The host or the external command reported a failure.
    #[error(transparent)]
    Remote(#[from] ForgeError),

    /// A configured checkout could not be resolved to a hosted repository.
    #[error(transparent)]
    Checkout(#[from] GitError),

    /// Some pull request base updates failed during cleanup.
    #[error("{}", describe_rebase_failures(.0))]
    RebaseFailed(Vec<RebaseFailure>),

    /// The operator declined a confirmation prompt.
    #[error("User aborted action")]
    UserAborted,

    /// A prompt could not be shown.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// A multi-repository run finished with failures.
    #[error("{failed} of {total} repositories failed")]
    Batch {
        /// Repositories that failed
        failed: usize,
        /// Repositories attempted
        total: usize,
    },
}

impl WorkflowError {
    /// Create a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        WorkflowError::Precondition(message.into())
    }

    /// Whether this error stops the remaining repositories of a batch.
    pub fn is_terminal_for_batch(&self) -> bool {
        matches!(self, WorkflowError::UserAborted | WorkflowError::Prompt(_))
    }
}

fn describe_rebase_failures(failures: &[RebaseFailure]) -> String {
    let details: Vec<String> = failures
        .iter()
        .map(|f| format!("#{}: {}", f.number, f.error))
        .collect();
    format!(
        "Failed to update the base of {} pull request(s); branch not deleted ({})",
        failures.len(),
        details.join("; ")
    )
}
