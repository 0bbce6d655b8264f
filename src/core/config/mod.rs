//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! A single user-level file configures the remote transport, credentials and
//! the repository lists used by the multi-repository commands. The loaded
//! [`Config`] is built once at the command boundary and passed explicitly to
//! every workflow.
//!
//! # Precedence
//!
//! The first existing file wins:
//! 1. Explicit path (`--config`), which must exist
//! 2. `$UGH_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/ugh/config.toml`
//! 4. `~/.ugh/config.toml`
//!
//! `$GITHUB_TOKEN` overrides `github.token`.
//!
//! # Example
//!
//! ```no_run
//! use ugh::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Transport: {}", config.transport());
//! println!("Interactive: {}", config.interactive());
//! ```

pub mod schema;

pub use schema::{
    ConfigFile, GitHubConfig, PreReleaseConfig, PullRequestDefaults, PullRequestTemplate,
};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::forge::Transport;

/// Default REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default program for the hub transport.
pub const DEFAULT_HUB_PROGRAM: &str = "hub";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "UGH_CONFIG";

/// Environment variable overriding the configured token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file '{0}' does not exist")]
    Missing(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults applied by accessor methods.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents (defaults when no file was found)
    pub file: ConfigFile,
    /// Token resolved from the environment or the file
    token: Option<String>,
    /// Path the file was loaded from
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the explicit path or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing, or if a config file
    /// exists but cannot be read, parsed or validated. Missing default
    /// locations are not an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::Missing(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                config.token = Some(token.trim().to_string());
            }
        }

        Ok(config)
    }

    /// Load a specific file without consulting the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_parsed(file, Some(path.to_path_buf()))
    }

    /// Wrap an already-parsed file.
    pub fn from_parsed(file: ConfigFile, loaded_from: Option<PathBuf>) -> Result<Self, ConfigError> {
        file.validate()?;
        let token = file
            .github
            .as_ref()
            .and_then(|g| g.token.clone())
            .filter(|t| !t.trim().is_empty());
        Ok(Self {
            file,
            token,
            loaded_from,
        })
    }

    /// Find the first existing config file in the default locations.
    fn discover() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("ugh/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".ugh/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Whether confirmation prompts are shown by default.
    ///
    /// Defaults to `true`.
    pub fn interactive(&self) -> bool {
        self.file.interactive.unwrap_or(true)
    }

    /// The remote transport.
    ///
    /// Defaults to HTTP. The value was validated at load time.
    pub fn transport(&self) -> Transport {
        self.file
            .transport
            .as_deref()
            .and_then(Transport::parse)
            .unwrap_or_default()
    }

    /// The API token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The REST API base URL.
    pub fn api_base(&self) -> &str {
        self.file
            .github
            .as_ref()
            .and_then(|g| g.api_base.as_deref())
            .unwrap_or(DEFAULT_API_BASE)
    }

    /// The program used by the hub transport.
    pub fn hub_program(&self) -> &str {
        self.file
            .github
            .as_ref()
            .and_then(|g| g.hub_program.as_deref())
            .unwrap_or(DEFAULT_HUB_PROGRAM)
    }

    /// Checkout paths visited by `pre-release`, unresolved.
    pub fn pre_release_repos(&self) -> &[String] {
        self.file
            .pre_release
            .as_ref()
            .map(|p| p.repos.as_slice())
            .unwrap_or(&[])
    }

    /// A named pull request template.
    pub fn pull_request_template(&self, name: &str) -> Option<&PullRequestTemplate> {
        self.file.pull_request.get(name)
    }

    /// Path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
