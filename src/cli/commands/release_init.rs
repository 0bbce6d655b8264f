//! cli::commands::release_init
//!
//! Initialize a release lineage branch.
//!
//! # Example
//!
//! ```bash
//! # Merge 2.2.x into the default branch and create 2.3.x
//! ugh release:init acme/widgets 2.3
//!
//! # Major releases need the previous version spelled out
//! ugh release:init acme/widgets 3.0 --previous 2.9
//! ```

use crate::core::config::Config;
use crate::core::types::{ReleaseLineage, RepositoryId};
use crate::engine::{migrate, Context, Session};
use crate::forge::{create_forge, Transport};
use crate::ui::output::Narrator;
use crate::ui::prompts::TerminalPrompter;
use anyhow::Result;

/// Run the release:init command.
pub fn release_init(
    ctx: &Context,
    config: &Config,
    transport: Transport,
    repository: &str,
    version: &str,
    previous: Option<&str>,
) -> Result<()> {
    let repository = RepositoryId::parse(repository)?;
    let lineage = ReleaseLineage::parse(version, previous)?;
    let old = lineage.previous()?;

    let narrator = Narrator::new(ctx.verbosity());
    narrator.step(format!(
        "Initializing {}...{} release",
        old,
        lineage.version()
    ));

    let forge = create_forge(config, transport, repository, &ctx.workdir());
    let prompter = TerminalPrompter;
    let session = Session::new(forge.as_ref(), &prompter, narrator, ctx.interactive);

    let outcome = super::runtime()?.block_on(migrate::initialize(&session, &lineage))?;

    match &outcome.merge_commit {
        Some(sha) => session
            .narrator
            .step(format!("Merged {} as {}", old, sha)),
        None => session
            .narrator
            .step(format!("{} was already merged", old)),
    }
    session.narrator.step(format!(
        "Created {} at {}",
        outcome.branch.name, outcome.branch.sha
    ));
    Ok(())
}
