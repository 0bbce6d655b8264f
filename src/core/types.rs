//! core::types
//!
//! Strong types for release lineage concepts.
//!
//! # Types
//!
//! - [`LineageVersion`] - A `major.minor` release lineage, rendered as `M.N.x`
//! - [`ReleaseLineage`] - A target lineage paired with its predecessor
//! - [`RepositoryId`] - An `owner/name` repository reference
//! - [`ReleaseType`] - Semantic increment applied to published releases
//! - [`ReleaseTarget`] - Ticket branch to promote, or the finalize sentinel
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid user input is
//! rejected before any remote call is made.
//!
//! # Examples
//!
//! ```
//! use ugh::core::types::{LineageVersion, ReleaseLineage, RepositoryId};
//!
//! let version = LineageVersion::parse("2.3").unwrap();
//! assert_eq!(version.to_string(), "2.3.x");
//!
//! let lineage = ReleaseLineage::parse("2.3", None).unwrap();
//! assert_eq!(lineage.previous().unwrap().to_string(), "2.2.x");
//!
//! let repo = RepositoryId::parse("acme/widgets").unwrap();
//! assert_eq!(repo.owner(), "acme");
//!
//! assert!(LineageVersion::parse("2").is_err());
//! assert!(RepositoryId::parse("acme").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from input validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("Specified version is invalid (expected <major.minor[.patch]>): {0}")]
    InvalidVersion(String),

    #[error("Specified repository is invalid (expected <owner/repository>): {0}")]
    InvalidRepository(String),

    #[error("Invalid release type \"{0}\" (expected \"patch\" or \"minor\")")]
    InvalidReleaseType(String),

    #[error("Release tag '{0}' is not a semantic version")]
    InvalidReleaseTag(String),

    #[error("Release {version} has no {release_type} successor")]
    VersionOverflow {
        version: String,
        release_type: String,
    },
}

/// Errors from lineage derivation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineageError {
    /// A major release (`minor == 0`) has no computable predecessor.
    #[error("Major releases require a previous version to be specified ({0} has no derivable predecessor)")]
    PreviousRequired(LineageVersion),
}

/// A release lineage version.
///
/// Only `major` and `minor` are significant. The canonical rendering is
/// `"<major>.<minor>.x"`, which is also the name of the lineage branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineageVersion {
    major: u64,
    minor: u64,
}

impl LineageVersion {
    /// Create a lineage version from its components.
    pub fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }

    /// Parse `major.minor` or `major.minor.patch`.
    ///
    /// The patch segment may be an integer or the wildcard `x`; it is
    /// discarded either way.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidVersion` for the wrong number of segments
    /// or any segment that is not a non-negative integer.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidVersion(text.to_string());

        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid());
        }

        let major = parse_component(parts[0]).ok_or_else(invalid)?;
        let minor = parse_component(parts[1]).ok_or_else(invalid)?;

        if let Some(patch) = parts.get(2) {
            if !patch.eq_ignore_ascii_case("x") && parse_component(patch).is_none() {
                return Err(invalid());
            }
        }

        Ok(Self { major, minor })
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.major
    }

    /// Minor component.
    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Whether this is a major release (`minor == 0`).
    pub fn is_major_release(&self) -> bool {
        self.minor == 0
    }

    /// The lineage branch name (`M.N.x`).
    pub fn branch_name(&self) -> String {
        self.to_string()
    }

    /// Textual comparison against a branch name.
    ///
    /// Used to match a pull request's base ref against this lineage.
    pub fn matches_branch(&self, name: &str) -> bool {
        self.to_string() == name
    }
}

/// Digits only; rejects signs, whitespace and empty text.
fn parse_component(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for LineageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.x", self.major, self.minor)
    }
}

/// A target lineage and the lineage it supersedes.
///
/// When the previous lineage is not given it is derived as `minor - 1`.
/// Major releases cannot derive a predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseLineage {
    version: LineageVersion,
    previous: Option<LineageVersion>,
}

impl ReleaseLineage {
    /// Create a lineage from already-parsed versions.
    pub fn new(version: LineageVersion, previous: Option<LineageVersion>) -> Self {
        Self { version, previous }
    }

    /// Parse the target version and an optional explicit previous version.
    pub fn parse(version: &str, previous: Option<&str>) -> Result<Self, TypeError> {
        Ok(Self {
            version: LineageVersion::parse(version)?,
            previous: previous.map(LineageVersion::parse).transpose()?,
        })
    }

    /// The target lineage.
    pub fn version(&self) -> LineageVersion {
        self.version
    }

    /// The lineage being superseded.
    ///
    /// # Errors
    ///
    /// Returns `LineageError::PreviousRequired` for a major release without
    /// an explicit previous version.
    pub fn previous(&self) -> Result<LineageVersion, LineageError> {
        if let Some(previous) = self.previous {
            return Ok(previous);
        }

        if self.version.is_major_release() {
            return Err(LineageError::PreviousRequired(self.version));
        }

        Ok(LineageVersion::new(
            self.version.major,
            self.version.minor - 1,
        ))
    }
}

/// An `owner/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryId {
    owner: String,
    name: String,
}

impl RepositoryId {
    /// Create from components.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepository` if either component is empty or
    /// contains a `/`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, TypeError> {
        let owner = owner.into();
        let name = name.into();
        if owner.is_empty() || name.is_empty() || owner.contains('/') || name.contains('/') {
            return Err(TypeError::InvalidRepository(format!("{}/{}", owner, name)));
        }
        Ok(Self { owner, name })
    }

    /// Build from components already known to be valid.
    pub(crate) fn from_static(owner: &'static str, name: &'static str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Parse a single `owner/name` token.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        match text.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Self::new(*owner, *name),
            _ => Err(TypeError::InvalidRepository(text.to_string())),
        }
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TryFrom<String> for RepositoryId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RepositoryId> for String {
    fn from(repo: RepositoryId) -> Self {
        repo.to_string()
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Semantic increment applied to the latest published release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseType {
    #[default]
    Patch,
    Minor,
}

impl ReleaseType {
    /// Parse `patch` or `minor`.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        match text {
            "patch" => Ok(Self::Patch),
            "minor" => Ok(Self::Minor),
            other => Err(TypeError::InvalidReleaseType(other.to_string())),
        }
    }

    /// Apply the increment.
    ///
    /// A minor increment zeroes the patch component; pre-release and build
    /// metadata are always dropped.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::VersionOverflow` when the incremented component is
    /// already `u64::MAX`.
    pub fn increment(&self, version: &semver::Version) -> Result<semver::Version, TypeError> {
        let next = match self {
            ReleaseType::Patch => version
                .patch
                .checked_add(1)
                .map(|patch| semver::Version::new(version.major, version.minor, patch)),
            ReleaseType::Minor => version
                .minor
                .checked_add(1)
                .map(|minor| semver::Version::new(version.major, minor, 0)),
        };
        next.ok_or_else(|| TypeError::VersionOverflow {
            version: version.to_string(),
            release_type: self.to_string(),
        })
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseType::Patch => write!(f, "patch"),
            ReleaseType::Minor => write!(f, "minor"),
        }
    }
}

/// Parse a release tag into a semantic version.
///
/// A leading `v` is tolerated (`v1.4.2`).
pub fn parse_release_tag(tag: &str) -> Result<semver::Version, TypeError> {
    let trimmed = tag.trim();
    let clean = trimmed.strip_prefix('v').unwrap_or(trimmed);
    semver::Version::parse(clean).map_err(|_| TypeError::InvalidReleaseTag(tag.to_string()))
}

/// The argument of a pre-release run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseTarget {
    /// Merge the pull request for this ticket branch into the draft.
    Ticket(String),
    /// Publish the accumulated draft.
    Finalize,
}

impl ReleaseTarget {
    /// Sentinel ticket name that selects the finalize path.
    pub const FINALIZE_KEYWORD: &'static str = "finalize";

    /// Interpret a ticket argument.
    pub fn from_ticket(ticket: &str) -> Self {
        if ticket == Self::FINALIZE_KEYWORD {
            ReleaseTarget::Finalize
        } else {
            ReleaseTarget::Ticket(ticket.to_string())
        }
    }

    /// Whether this is the finalize sentinel.
    pub fn is_finalize(&self) -> bool {
        matches!(self, ReleaseTarget::Finalize)
    }
}

impl fmt::Display for ReleaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseTarget::Ticket(ticket) => write!(f, "{}", ticket),
            ReleaseTarget::Finalize => write!(f, "{}", Self::FINALIZE_KEYWORD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod lineage_version {
        use super::*;

        #[test]
        fn parses_major_minor() {
            let v = LineageVersion::parse("1.4").unwrap();
            assert_eq!(v.major(), 1);
            assert_eq!(v.minor(), 4);
            assert_eq!(v.to_string(), "1.4.x");
        }

        #[test]
        fn discards_patch() {
            assert_eq!(
                LineageVersion::parse("1.4.7").unwrap(),
                LineageVersion::new(1, 4)
            );
        }

        #[test]
        fn accepts_branch_name() {
            assert_eq!(
                LineageVersion::parse("2.3.x").unwrap().to_string(),
                "2.3.x"
            );
        }

        #[test]
        fn rejects_wrong_segment_count() {
            assert!(LineageVersion::parse("1").is_err());
            assert!(LineageVersion::parse("1.2.3.4").is_err());
            assert!(LineageVersion::parse("").is_err());
        }

        #[test]
        fn rejects_non_numeric() {
            assert!(LineageVersion::parse("a.1").is_err());
            assert!(LineageVersion::parse("1.b").is_err());
            assert!(LineageVersion::parse("1.2.beta").is_err());
            assert!(LineageVersion::parse("1.").is_err());
            assert!(LineageVersion::parse(" 1.2").is_err());
        }

        #[test]
        fn rejects_negative() {
            assert!(LineageVersion::parse("-1.2").is_err());
            assert!(LineageVersion::parse("1.-2").is_err());
        }

        #[test]
        fn matches_branch_textually() {
            let v = LineageVersion::new(2, 2);
            assert!(v.matches_branch("2.2.x"));
            assert!(!v.matches_branch("2.2"));
            assert!(!v.matches_branch("master"));
        }

        #[test]
        fn error_message_names_input() {
            let err = LineageVersion::parse("oops").unwrap_err();
            assert!(err.to_string().contains("oops"));
        }
    }

    mod release_lineage {
        use super::*;

        #[test]
        fn derives_previous_minor() {
            let lineage = ReleaseLineage::parse("2.3", None).unwrap();
            assert_eq!(lineage.version().to_string(), "2.3.x");
            assert_eq!(lineage.previous().unwrap().to_string(), "2.2.x");
        }

        #[test]
        fn major_release_requires_previous() {
            let lineage = ReleaseLineage::parse("3.0", None).unwrap();
            assert_eq!(
                lineage.previous(),
                Err(LineageError::PreviousRequired(LineageVersion::new(3, 0)))
            );
        }

        #[test]
        fn explicit_previous_wins() {
            let lineage = ReleaseLineage::parse("3.0", Some("2.9")).unwrap();
            assert_eq!(lineage.previous().unwrap(), LineageVersion::new(2, 9));

            let lineage = ReleaseLineage::parse("2.5", Some("2.1")).unwrap();
            assert_eq!(lineage.previous().unwrap(), LineageVersion::new(2, 1));
        }

        #[test]
        fn invalid_previous_rejected() {
            assert!(ReleaseLineage::parse("3.0", Some("two")).is_err());
        }
    }

    mod repository_id {
        use super::*;

        #[test]
        fn parses_owner_and_name() {
            let repo = RepositoryId::parse("acme/widgets").unwrap();
            assert_eq!(repo.owner(), "acme");
            assert_eq!(repo.name(), "widgets");
            assert_eq!(repo.to_string(), "acme/widgets");
        }

        #[test]
        fn rejects_malformed() {
            assert!(RepositoryId::parse("acme").is_err());
            assert!(RepositoryId::parse("acme/").is_err());
            assert!(RepositoryId::parse("/widgets").is_err());
            assert!(RepositoryId::parse("acme/widgets/extra").is_err());
            assert!(RepositoryId::parse("").is_err());
        }

        #[test]
        fn serde_round_trip_uses_slug() {
            let repo = RepositoryId::parse("acme/widgets").unwrap();
            let json = serde_json::to_string(&repo).unwrap();
            assert_eq!(json, "\"acme/widgets\"");
            let back: RepositoryId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, repo);
        }
    }

    mod release_type {
        use super::*;

        #[test]
        fn patch_increment() {
            let v = semver::Version::parse("1.4.2").unwrap();
            assert_eq!(ReleaseType::Patch.increment(&v).unwrap().to_string(), "1.4.3");
        }

        #[test]
        fn minor_increment_zeroes_patch() {
            let v = semver::Version::parse("1.4.2").unwrap();
            assert_eq!(ReleaseType::Minor.increment(&v).unwrap().to_string(), "1.5.0");
        }

        #[test]
        fn increment_at_limit_fails() {
            let v = semver::Version::new(1, 2, u64::MAX);
            let err = ReleaseType::Patch.increment(&v).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Release 1.2.18446744073709551615 has no patch successor"
            );
            assert_eq!(
                ReleaseType::Minor.increment(&v).unwrap().to_string(),
                "1.3.0"
            );

            let v = semver::Version::new(1, u64::MAX, 0);
            assert!(ReleaseType::Minor.increment(&v).is_err());
        }

        #[test]
        fn default_is_patch() {
            assert_eq!(ReleaseType::default(), ReleaseType::Patch);
        }

        #[test]
        fn parse_rejects_major() {
            assert!(ReleaseType::parse("major").is_err());
            assert_eq!(ReleaseType::parse("minor").unwrap(), ReleaseType::Minor);
        }

        #[test]
        fn release_tag_accepts_v_prefix() {
            assert_eq!(parse_release_tag("v1.2.3").unwrap().to_string(), "1.2.3");
            assert!(parse_release_tag("latest").is_err());
        }
    }

    #[test]
    fn finalize_sentinel() {
        assert!(ReleaseTarget::from_ticket("finalize").is_finalize());
        assert_eq!(
            ReleaseTarget::from_ticket("feature-x"),
            ReleaseTarget::Ticket("feature-x".into())
        );
    }
}
