//! cli
//!
//! Command-line interface layer for ugh.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load the configuration once and pass it down
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, validates them into
//! [`crate::core::types`] values and dispatches to the [`crate::engine`]
//! workflows. Nothing here talks to the remote host directly.

pub mod args;
pub mod commands;
pub mod logging;

pub use args::{Cli, Shell};

use crate::core::config::Config;
use crate::engine;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    logging::init(cli.debug);

    let config = Config::load(cli.config.as_deref())?;
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded configuration");
    }

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(config.interactive()),
    };
    let transport = cli.transport.unwrap_or_else(|| config.transport());

    commands::dispatch(cli.command, &ctx, &config, transport)
}
