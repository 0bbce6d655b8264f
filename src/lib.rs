//! ugh - release lineage automation for GitHub repositories
//!
//! ugh maintains parallel release lineages (`2.2.x`, `2.3.x`, ...) across one
//! or many repositories: it opens and squash-merges ticket pull requests,
//! accumulates them into versioned draft releases, publishes those drafts,
//! and migrates open pull requests from a retiring lineage to its successor.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Release-lineage workflows: gate, migrate, merge, release
//! - [`core`] - Domain types, configuration and path resolution
//! - [`forge`] - Repository host abstraction (REST, `hub`, in-memory mock)
//! - [`git`] - Resolves local checkouts to hosted repositories
//! - [`ui`] - Prompts and progress narration
//!
//! # Correctness Invariants
//!
//! 1. User input is validated before any remote call
//! 2. Every mutation is preceded by its branch existence checks
//! 3. A lineage branch is never deleted while a pull request may still
//!    target it
//! 4. Declining a confirmation stops the whole command

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod git;
pub mod ui;
