//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Confirmation prompts (terminal and scripted)
//! - [`output`] - Output formatting and progress narration
//!
//! # Design
//!
//! All operator-facing output and prompts go through this module so that
//! quiet and non-interactive modes are handled in one place.

pub mod output;
pub mod prompts;
