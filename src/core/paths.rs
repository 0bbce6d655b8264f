//! core::paths
//!
//! Resolution of configured repository checkout paths.
//!
//! Multi-repository commands read a list of checkout paths from the
//! configuration. Absolute paths are used verbatim; everything else
//! (`~`, `~/code/widgets`, `code/widgets`) is resolved against the home
//! directory.
//!
//! # Example
//!
//! ```
//! use ugh::core::paths::resolve_repository_path;
//! use std::path::{Path, PathBuf};
//!
//! let home = Path::new("/home/dev");
//! assert_eq!(
//!     resolve_repository_path("~/code/widgets", home),
//!     PathBuf::from("/home/dev/code/widgets")
//! );
//! assert_eq!(
//!     resolve_repository_path("/srv/gadgets", home),
//!     PathBuf::from("/srv/gadgets")
//! );
//! ```

use std::path::{Path, PathBuf};

use super::config::ConfigError;

/// Resolve one configured path against `home`.
pub fn resolve_repository_path(entry: &str, home: &Path) -> PathBuf {
    let entry = entry.trim();

    if entry == "~" {
        return home.to_path_buf();
    }

    if let Some(rest) = entry.strip_prefix("~/") {
        return home.join(rest);
    }

    let path = Path::new(entry);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}

/// Resolve every configured path against the current user's home directory.
///
/// # Errors
///
/// Returns `ConfigError::NoHomeDir` if the home directory cannot be determined.
pub fn resolve_repository_paths(entries: &[String]) -> Result<Vec<PathBuf>, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(entries
        .iter()
        .map(|entry| resolve_repository_path(entry, &home))
        .collect())
}
