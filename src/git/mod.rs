//! git
//!
//! Single doorway to local Git checkouts.
//!
//! # Architecture
//!
//! Remote state (branches, pull requests, releases) is owned by the forge.
//! The only local question this tool asks is "which hosted repository does
//! this checkout belong to?", answered by reading a remote URL. No other
//! module imports `git2`.
//!
//! # Example
//!
//! ```ignore
//! use ugh::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("~/code/widgets"))?;
//! let url = git.remote_url("origin")?;
//! ```

mod interface;

pub use interface::{Git, GitError, DEFAULT_REMOTE};
