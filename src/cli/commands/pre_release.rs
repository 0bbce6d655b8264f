//! cli::commands::pre_release
//!
//! Merge a ticket across the configured repositories and upsert draft
//! releases, or publish the drafts with `finalize`.
//!
//! # Design
//!
//! Repositories come from `[pre_release] repos`. Each one is resolved to
//! its hosted repository through the checkout's `origin` remote and then
//! processed on its own; a failure is reported and the next repository is
//! attempted. Declining a prompt stops the command.

use std::path::Path;

use crate::core::config::Config;
use crate::core::paths::resolve_repository_paths;
use crate::core::types::{ReleaseTarget, ReleaseType};
use crate::engine::batch::BatchReport;
use crate::engine::release::{self, UpsertOutcome};
use crate::engine::{Context, Session, WorkflowError};
use crate::forge::Transport;
use crate::ui::output::Narrator;
use crate::ui::prompts::{Prompter, TerminalPrompter};
use anyhow::{bail, Result};

/// Run the pre-release command.
pub fn pre_release(
    ctx: &Context,
    config: &Config,
    transport: Transport,
    ticket: &str,
    release_type: &str,
) -> Result<()> {
    let release_type = ReleaseType::parse(release_type)?;
    let target = ReleaseTarget::from_ticket(ticket);

    let repos = config.pre_release_repos();
    if repos.is_empty() {
        bail!("pre-release configuration not defined");
    }
    let paths = resolve_repository_paths(repos)?;

    let rt = super::runtime()?;
    let narrator = Narrator::new(ctx.verbosity());
    let prompter = TerminalPrompter;
    let mut report = BatchReport::new();

    for path in &paths {
        let label = path.display().to_string();
        let local = narrator.with_prefix(&label);
        let outcome = rt.block_on(run_one(
            config,
            transport,
            path,
            &target,
            release_type,
            &prompter,
            local.clone(),
            ctx.interactive,
        ));
        if let Ok(outcome) = &outcome {
            describe(&local, outcome);
        }
        report.record(label, outcome, &local)?;
    }

    report.into_result()?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_one(
    config: &Config,
    transport: Transport,
    path: &Path,
    target: &ReleaseTarget,
    release_type: ReleaseType,
    prompter: &dyn Prompter,
    narrator: Narrator,
    interactive: bool,
) -> Result<UpsertOutcome, WorkflowError> {
    if let ReleaseTarget::Ticket(ticket) = target {
        narrator.step(format!(
            "Checking if pull request for ticket '{}' exists",
            ticket
        ));
    }
    let forge = super::forge_for_checkout(config, transport, path)?;
    let session = Session::new(forge.as_ref(), prompter, narrator, interactive);
    release::pre_release(&session, target, release_type).await
}

fn describe(narrator: &Narrator, outcome: &UpsertOutcome) {
    match outcome {
        UpsertOutcome::Skipped => {}
        UpsertOutcome::Created { merged, release } => narrator.step(format!(
            "Created draft release '{}' with #{}",
            release.tag, merged
        )),
        UpsertOutcome::Appended { merged, release } => narrator.step(format!(
            "Updated draft release '{}' with #{}",
            release.tag, merged
        )),
        UpsertOutcome::Finalized(release) => {
            narrator.step(format!("Published release '{}' {}", release.tag, release.url))
        }
    }
}
