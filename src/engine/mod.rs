//! engine
//!
//! Release-lineage workflows.
//!
//! # Architecture
//!
//! Every workflow follows the same shape:
//!
//! ```text
//! Validate input -> Gate (branch existence) -> Confirm -> Mutate
//! ```
//!
//! Input is validated into [`crate::core::types`] values before a forge is
//! created. The gate runs only read calls. A confirmation prompt precedes
//! every destructive step, and declining aborts with
//! [`WorkflowError::UserAborted`].
//!
//! # Modules
//!
//! - [`gate`] - Branch existence preconditions and confirmation
//! - [`migrate`] - Lineage initialization and cleanup
//! - [`merge`] - Locating and squash-merging a ticket's pull request
//! - [`release`] - Draft release planning and upsert
//! - [`open`] - Opening templated pull requests
//! - [`batch`] - Multi-repository iteration policy
//!
//! # Invariants
//!
//! - No mutation happens before every precondition has been checked
//! - Partial completion is never rolled back; each step is narrated instead
//! - Nothing is retried automatically

pub mod batch;
pub mod error;
pub mod gate;
pub mod merge;
pub mod migrate;
pub mod open;
pub mod release;

use std::path::PathBuf;

pub use error::{RebaseFailure, WorkflowError};

use crate::forge::Forge;
use crate::ui::output::{Narrator, Verbosity};
use crate::ui::prompts::Prompter;

/// Execution context for commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}

impl Context {
    /// Output verbosity for these flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// The directory commands run in.
    pub fn workdir(&self) -> PathBuf {
        self.cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Everything a workflow needs to act on one repository.
pub struct Session<'a> {
    /// Forge bound to the repository
    pub forge: &'a dyn Forge,
    /// Source of confirmation answers
    pub prompter: &'a dyn Prompter,
    /// Progress narration
    pub narrator: Narrator,
    /// Whether to ask before destructive steps
    pub interactive: bool,
}

impl<'a> Session<'a> {
    /// Create a session.
    pub fn new(
        forge: &'a dyn Forge,
        prompter: &'a dyn Prompter,
        narrator: Narrator,
        interactive: bool,
    ) -> Self {
        Self {
            forge,
            prompter,
            narrator,
            interactive,
        }
    }

    /// Ask before a destructive step.
    pub fn confirm(&self, message: &str) -> Result<(), WorkflowError> {
        gate::confirm_step(self.prompter, self.interactive, message)
    }
}
