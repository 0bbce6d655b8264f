//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. Workflows ask through the
//! [`Prompter`] trait so tests can script answers with
//! [`ScriptedPrompter`] while the binary reads the terminal through
//! [`TerminalPrompter`].

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Source of yes/no answers.
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question. `Ok(false)` means the operator declined.
    fn confirm(&self, message: &str) -> Result<bool, PromptError>;
}

/// Prompter that reads answers from the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> Result<bool, PromptError> {
        confirm(message, false, true)
    }
}

/// Prompter that replays prepared answers and records the questions asked.
///
/// Running out of answers is reported as `PromptError::NotInteractive`.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    /// Create a prompter that answers with `answers` in order.
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// A prompter that accepts every question.
    pub fn always_yes() -> Self {
        Self::new(std::iter::repeat(true).take(64))
    }

    /// Questions asked so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str) -> Result<bool, PromptError> {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or(PromptError::NotInteractive)
    }
}

/// Prompt for confirmation (yes/no) on the terminal.
///
/// Returns `Ok(true)` if the user confirms, `Ok(false)` if they decline.
/// An empty answer selects `default`.
///
/// # Errors
///
/// - `PromptError::NotInteractive` if `interactive` is false or stdin is not a terminal
/// - `PromptError::Cancelled` if stdin is closed before an answer
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    let stdin = io::stdin();
    if !interactive || !stdin.is_terminal() {
        return Err(PromptError::NotInteractive);
    }

    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let mut stderr = io::stderr();
    write!(stderr, "{} {} ", message, hint).map_err(|e| PromptError::IoError(e.to_string()))?;
    stderr
        .flush()
        .map_err(|e| PromptError::IoError(e.to_string()))?;

    let mut line = String::new();
    let read = stdin
        .lock()
        .read_line(&mut line)
        .map_err(|e| PromptError::IoError(e.to_string()))?;
    if read == 0 {
        return Err(PromptError::Cancelled);
    }

    Ok(parse_answer(&line).unwrap_or(default))
}

/// Interpret a typed answer. `None` for an empty or unrecognised answer.
fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_answers() {
        assert_eq!(parse_answer("y\n"), Some(true));
        assert_eq!(parse_answer(" YES "), Some(true));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("maybe"), None);
    }

    #[test]
    fn non_interactive_confirm_errors() {
        assert!(matches!(
            confirm("Proceed?", true, false),
            Err(PromptError::NotInteractive)
        ));
    }

    #[test]
    fn scripted_prompter_replays_and_records() {
        let prompter = ScriptedPrompter::new([true, false]);
        assert!(prompter.confirm("first?").unwrap());
        assert!(!prompter.confirm("second?").unwrap());
        assert!(matches!(
            prompter.confirm("third?"),
            Err(PromptError::NotInteractive)
        ));
        assert_eq!(prompter.asked(), vec!["first?", "second?", "third?"]);
    }
}
