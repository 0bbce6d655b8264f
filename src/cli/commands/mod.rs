//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments into core types
//! 2. Builds a forge and a session per repository
//! 3. Runs the engine workflow and narrates the outcome
//!
//! Handlers do NOT call the remote host directly.
//!
//! # Async Commands
//!
//! Workflows are async because every step is a remote call. Each handler
//! builds a current-thread tokio runtime and blocks on it, so commands stay
//! strictly sequential.

mod completion;
mod pre_release;
mod pull_request;
mod release_cleanup;
mod release_init;

pub use completion::completion;
pub use pre_release::pre_release;
pub use pull_request::pull_request;
pub use release_cleanup::release_cleanup;
pub use release_init::release_init;

use std::path::Path;

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::engine::{Context, WorkflowError};
use crate::forge::{create_forge, repository_for_checkout, Forge, Transport};
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context, config: &Config, transport: Transport) -> Result<()> {
    match command {
        Command::ReleaseInit {
            repository,
            version,
            previous,
        } => release_init::release_init(
            ctx,
            config,
            transport,
            &repository,
            &version,
            previous.as_deref(),
        ),
        Command::ReleaseCleanup {
            repository,
            version,
            previous,
        } => release_cleanup::release_cleanup(
            ctx,
            config,
            transport,
            &repository,
            &version,
            previous.as_deref(),
        ),
        Command::PreRelease {
            ticket,
            release_type,
        } => pre_release::pre_release(ctx, config, transport, &ticket, &release_type),
        Command::PullRequest {
            template,
            head,
            message,
            base,
        } => pull_request::pull_request(
            ctx,
            config,
            transport,
            &template,
            &head,
            &message,
            base.as_deref(),
        ),
        Command::Completion { shell } => completion::completion(shell, &mut std::io::stdout()),
    }
}

/// Single-threaded runtime for one command.
fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Forge for the hosted repository behind a local checkout.
fn forge_for_checkout(
    config: &Config,
    transport: Transport,
    path: &Path,
) -> Result<Box<dyn Forge>, WorkflowError> {
    let repository = repository_for_checkout(path)?;
    tracing::debug!(path = %path.display(), %repository, "resolved checkout");
    Ok(create_forge(config, transport, repository, path))
}
