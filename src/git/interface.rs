//! git::interface
//!
//! git2-backed checkout access.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Remote consulted when resolving a checkout's hosted repository.
pub const DEFAULT_REMOTE: &str = "origin";

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// The named remote is not configured.
    #[error("remote '{name}' is not configured in {path}")]
    RemoteNotFound {
        /// Remote name
        name: String,
        /// Checkout path
        path: PathBuf,
    },

    /// The remote does not point at a supported host.
    #[error("remote URL '{url}' does not name an owner/repository")]
    UnsupportedRemote {
        /// The remote URL
        url: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// Error message from git2
        message: String,
    },
}

/// A local checkout.
pub struct Git {
    repo: git2::Repository,
    path: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git").field("path", &self.path).finish()
    }
}

impl Git {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        Ok(Self {
            repo,
            path: path.to_path_buf(),
        })
    }

    /// The path this checkout was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the URL of a remote, or `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Internal {
                message: e.message().to_string(),
            }),
        }
    }

    /// Get the URL of a remote that must exist.
    pub fn require_remote_url(&self, name: &str) -> Result<String, GitError> {
        self.remote_url(name)?.ok_or_else(|| GitError::RemoteNotFound {
            name: name.to_string(),
            path: self.path.clone(),
        })
    }
}
