//! cli::commands::release_cleanup
//!
//! Retire a release lineage branch.

use crate::core::config::Config;
use crate::core::types::{ReleaseLineage, RepositoryId};
use crate::engine::{migrate, Context, Session};
use crate::forge::{create_forge, Transport};
use crate::ui::output::{count_noun, Narrator};
use crate::ui::prompts::TerminalPrompter;
use anyhow::Result;

/// Run the release:cleanup command.
pub fn release_cleanup(
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
        "Cleaning up {}...{} release",
        old,
        lineage.version()
    ));

    let forge = create_forge(config, transport, repository, &ctx.workdir());
    let prompter = TerminalPrompter;
    let session = Session::new(forge.as_ref(), &prompter, narrator, ctx.interactive);

    let outcome = super::runtime()?.block_on(migrate::cleanup(&session, &lineage))?;

    session.narrator.step(format!(
        "Updated {} and deleted {}",
        count_noun(outcome.rebased.len(), "pull request", "pull requests"),
        outcome.deleted
    ));
    Ok(())
}
