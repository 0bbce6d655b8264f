//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! In order of precedence:
//! 1. `--config <path>`
//! 2. `$UGH_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/ugh/config.toml`
//! 4. `~/.ugh/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing so that a typo in the transport
//! name or an empty repository entry fails before any command runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// The configuration file.
///
/// # Example
///
/// ```toml
/// interactive = true
/// transport = "http"
///
/// [github]
/// api_base = "https://api.github.com"
///
/// [pre_release]
/// repos = ["~/code/widgets", "/srv/gadgets"]
///
/// [pull_request.backport]
/// repos = ["~/code/widgets"]
///
/// [pull_request.backport.defaults]
/// reviewer = "alice,bob"
/// labels = "backport"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Default interactive mode
    pub interactive: Option<bool>,

    /// Remote transport ("http" or "hub")
    pub transport: Option<String>,

    /// Repository host settings
    pub github: Option<GitHubConfig>,

    /// Repositories visited by `pre-release`
    pub pre_release: Option<PreReleaseConfig>,

    /// Named pull request templates
    pub pull_request: BTreeMap<String, PullRequestTemplate>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(transport) = &self.transport {
            let valid = crate::forge::valid_transport_names();
            if !valid.contains(&transport.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid transport '{}', must be one of: {}",
                    transport,
                    valid.join(", ")
                )));
            }
        }

        if let Some(github) = &self.github {
            github.validate()?;
        }

        if let Some(pre_release) = &self.pre_release {
            validate_repos("pre_release", &pre_release.repos)?;
        }

        for (name, template) in &self.pull_request {
            validate_repos(&format!("pull_request.{}", name), &template.repos)?;
        }

        Ok(())
    }
}

fn validate_repos(section: &str, repos: &[String]) -> Result<(), ConfigError> {
    if repos.iter().any(|r| r.trim().is_empty()) {
        return Err(ConfigError::InvalidValue(format!(
            "{}.repos cannot contain empty entries",
            section
        )));
    }
    Ok(())
}

/// Repository host settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    /// Personal access token (overridden by `$GITHUB_TOKEN`)
    pub token: Option<String>,

    /// REST API base URL (GitHub Enterprise: `https://host/api/v3`)
    pub api_base: Option<String>,

    /// Program used by the hub transport
    pub hub_program: Option<String>,
}

impl GitHubConfig {
    /// Validate the host settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(api_base) = &self.api_base {
            if api_base.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "github.api_base cannot be empty".to_string(),
                ));
            }
        }
        if let Some(program) = &self.hub_program {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "github.hub_program cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// `pre-release` settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PreReleaseConfig {
    /// Absolute or home-relative checkout paths
    pub repos: Vec<String>,
}

/// A named `pull-request` template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PullRequestTemplate {
    /// Absolute or home-relative checkout paths
    pub repos: Vec<String>,

    /// Values applied to every pull request opened from this template
    pub defaults: Option<PullRequestDefaults>,
}

/// Default reviewer/assignee/label values for opened pull requests.
///
/// Each value is a comma separated list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PullRequestDefaults {
    pub reviewer: Option<String>,
    pub assign: Option<String>,
    pub labels: Option<String>,
}

impl PullRequestDefaults {
    /// Reviewer logins.
    pub fn reviewers(&self) -> Vec<String> {
        split_list(self.reviewer.as_deref())
    }

    /// Assignee logins.
    pub fn assignees(&self) -> Vec<String> {
        split_list(self.assign.as_deref())
    }

    /// Label names.
    pub fn label_names(&self) -> Vec<String> {
        split_list(self.labels.as_deref())
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_valid() {
        let config: ConfigFile = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert!(config.pull_request.is_empty());
    }

    #[test]
    fn parses_full_file() {
        let config: ConfigFile = toml::from_str(
            r#"
            interactive = false
            transport = "hub"

            [github]
            api_base = "https://github.example.com/api/v3"

            [pre_release]
            repos = ["~/code/widgets"]

            [pull_request.backport]
            repos = ["/srv/a", "/srv/b"]

            [pull_request.backport.defaults]
            reviewer = "alice, bob"
            labels = "backport"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.interactive, Some(false));
        let template = &config.pull_request["backport"];
        assert_eq!(template.repos.len(), 2);
        let defaults = template.defaults.as_ref().unwrap();
        assert_eq!(defaults.reviewers(), vec!["alice", "bob"]);
        assert!(defaults.assignees().is_empty());
        assert_eq!(defaults.label_names(), vec!["backport"]);
    }

    #[test]
    fn unknown_transport_rejected() {
        let config: ConfigFile = toml::from_str(r#"transport = "carrier-pigeon""#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn empty_repo_entry_rejected() {
        let config: ConfigFile = toml::from_str(
            r#"
            [pre_release]
            repos = ["~/a", " "]
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<ConfigFile, _> = toml::from_str("colour = \"blue\"");
        assert!(result.is_err());
    }
}
