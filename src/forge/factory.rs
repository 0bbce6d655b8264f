//! forge::factory
//!
//! Forge selection and creation.
//!
//! # Design
//!
//! Commands use [`create_forge()`] instead of constructing specific forge
//! implementations, so workflows only ever see `dyn Forge`.
//!
//! # Transports
//!
//! - `http` → [`GitHubForge`] talking to the REST API with a token
//! - `hub` → [`HubForge`] running `hub api` with hub's own credentials
//!
//! # Example
//!
//! ```ignore
//! use ugh::core::config::Config;
//! use ugh::core::types::RepositoryId;
//! use ugh::forge::create_forge;
//!
//! let config = Config::load(None)?;
//! let repo = RepositoryId::parse("acme/widgets")?;
//! let forge = create_forge(&config, repo, &std::env::current_dir()?);
//! ```

use std::path::Path;

use super::github::{parse_github_url, GitHubForge};
use super::hub::{HubCli, HubForge};
use super::traits::Forge;
use crate::core::config::Config;
use crate::core::types::RepositoryId;
use crate::git::{Git, GitError, DEFAULT_REMOTE};

/// Supported remote transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Direct REST calls over HTTPS
    #[default]
    Http,
    /// Shell out to `hub api`
    Hub,
}

impl Transport {
    /// Get all transports.
    pub fn all() -> &'static [Transport] {
        &[Transport::Http, Transport::Hub]
    }

    /// The name used in configuration files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Transport::Http => "http",
            Transport::Hub => "hub",
        }
    }

    /// Parse a transport from a string.
    ///
    /// # Example
    ///
    /// ```
    /// use ugh::forge::Transport;
    ///
    /// assert_eq!(Transport::parse("hub"), Some(Transport::Hub));
    /// assert_eq!(Transport::parse("ftp"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "http" => Some(Transport::Http),
            "hub" => Some(Transport::Hub),
            _ => None,
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Valid transport names for config validation.
pub fn valid_transport_names() -> &'static [&'static str] {
    &["http", "hub"]
}

/// Create a forge bound to `repository`.
///
/// `workdir` is where the hub transport runs its program; the HTTP
/// transport ignores it.
pub fn create_forge(
    config: &Config,
    transport: Transport,
    repository: RepositoryId,
    workdir: &Path,
) -> Box<dyn Forge> {
    tracing::debug!(%repository, %transport, "creating forge");
    match transport {
        Transport::Http => Box::new(GitHubForge::with_api_base(
            repository,
            config.token().map(String::from),
            config.api_base(),
        )),
        Transport::Hub => Box::new(HubForge::new(
            HubCli::new(config.hub_program(), workdir),
            repository,
        )),
    }
}

/// Resolve the hosted repository of a local checkout from its `origin` remote.
///
/// # Errors
///
/// - `GitError::NotARepo` if `path` is not inside a checkout
/// - `GitError::RemoteNotFound` if `origin` is not configured
/// - `GitError::UnsupportedRemote` if `origin` does not name an
///   `owner/repository` on a remote host
pub fn repository_for_checkout(path: &Path) -> Result<RepositoryId, GitError> {
    let git = Git::open(path)?;
    let url = git.require_remote_url(DEFAULT_REMOTE)?;
    parse_github_url(&url)
        .and_then(|(owner, name)| RepositoryId::new(owner, name).ok())
        .ok_or(GitError::UnsupportedRemote { url })
}
