//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag. Progress
//! narration for a single repository goes through a [`Narrator`], which
//! prefixes each line with the repository label during multi-repository runs.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Pluralize a count: `count_noun(1, "repository", "repositories")`.
pub fn count_noun(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Progress narration for one workflow run.
#[derive(Debug, Clone)]
pub struct Narrator {
    verbosity: Verbosity,
    prefix: Option<String>,
}

impl Narrator {
    /// Narrator without a prefix.
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            prefix: None,
        }
    }

    /// Narrator that prints nothing but errors.
    pub fn quiet() -> Self {
        Self::new(Verbosity::Quiet)
    }

    /// Copy of this narrator labelling every line with `[prefix]`.
    pub fn with_prefix(&self, prefix: impl Display) -> Self {
        Self {
            verbosity: self.verbosity,
            prefix: Some(prefix.to_string()),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Format a line with the prefix applied.
    pub fn line(&self, message: impl Display) -> String {
        match &self.prefix {
            Some(prefix) => format!("[{}] {}", prefix, message),
            None => message.to_string(),
        }
    }

    /// Report a progress step.
    pub fn step(&self, message: impl Display) {
        print(self.line(message), self.verbosity);
    }

    /// Report a warning.
    pub fn warn(&self, message: impl Display) {
        warn(self.line(message), self.verbosity);
    }

    /// Report an error (always shown).
    pub fn error(&self, message: impl Display) {
        error(self.line(message));
    }

    /// Report a debug detail.
    pub fn debug(&self, message: impl Display) {
        debug(self.line(message), self.verbosity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn narrator_prefix() {
        let narrator = Narrator::quiet();
        assert_eq!(narrator.line("Merging"), "Merging");
        let scoped = narrator.with_prefix("/srv/widgets");
        assert_eq!(scoped.line("Merging"), "[/srv/widgets] Merging");
        assert_eq!(scoped.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn count_noun_pluralizes() {
        assert_eq!(count_noun(1, "repository", "repositories"), "1 repository");
        assert_eq!(count_noun(3, "repository", "repositories"), "3 repositories");
        assert_eq!(count_noun(0, "pull request", "pull requests"), "0 pull requests");
    }
}
