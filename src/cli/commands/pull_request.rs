//! cli::commands::pull_request
//!
//! Open the same pull request across the repositories of a template.
//!
//! # Design
//!
//! 1. Keep the template's repositories in which the head branch exists
//! 2. Fail if there are none
//! 3. Confirm once for the whole set
//! 4. Open the pull request in each, applying the template defaults

use std::path::PathBuf;

use crate::core::config::Config;
use crate::core::paths::resolve_repository_paths;
use crate::engine::batch::BatchReport;
use crate::engine::open::{branch_present, open_pull_request, PullRequestDraft};
use crate::engine::{gate, Context, Session};
use crate::forge::{Forge, Transport};
use crate::ui::output::{count_noun, Narrator};
use crate::ui::prompts::TerminalPrompter;
use anyhow::{anyhow, bail, Result};

/// Run the pull-request command.
pub fn pull_request(
    ctx: &Context,
    config: &Config,
    transport: Transport,
    template: &str,
    head: &str,
    message: &str,
    base: Option<&str>,
) -> Result<()> {
    let template_config = config
        .pull_request_template(template)
        .ok_or_else(|| anyhow!("pull-request.{} configuration not defined", template))?;
    let paths = resolve_repository_paths(&template_config.repos)?;

    let rt = super::runtime()?;
    let narrator = Narrator::new(ctx.verbosity());
    let prompter = TerminalPrompter;

    let mut targets: Vec<(PathBuf, Box<dyn Forge>)> = Vec::new();
    for path in paths {
        let local = narrator.with_prefix(path.display());
        local.step(format!("Checking if branch '{}' exists", head));

        let forge = match super::forge_for_checkout(config, transport, &path) {
            Ok(forge) => forge,
            Err(e) => {
                local.warn(&e);
                continue;
            }
        };
        let session = Session::new(forge.as_ref(), &prompter, local.clone(), ctx.interactive);
        match rt.block_on(branch_present(&session, head)) {
            Ok(true) => targets.push((path, forge)),
            Ok(false) => local.debug(format!("Branch '{}' not found", head)),
            Err(e) => local.warn(&e),
        }
    }

    if targets.is_empty() {
        bail!(
            "Branch '{}' does not exist in any of the configured repositories",
            head
        );
    }

    gate::confirm_step(
        &prompter,
        ctx.interactive,
        &format!(
            "Are you sure you want to open a pull request from '{}' across {}?",
            head,
            count_noun(targets.len(), "repository", "repositories")
        ),
    )?;

    let draft = PullRequestDraft {
        head: head.to_string(),
        message: message.to_string(),
        base: base.map(String::from),
        defaults: template_config.defaults.clone().unwrap_or_default(),
    };

    let mut report = BatchReport::new();
    for (path, forge) in &targets {
        let label = path.display().to_string();
        let local = narrator.with_prefix(&label);
        local.step("Creating pull request");
        let session = Session::new(forge.as_ref(), &prompter, local.clone(), ctx.interactive);
        let outcome = rt.block_on(open_pull_request(&session, &draft));
        report.record(label, outcome, &local)?;
    }

    report.into_result()?;
    Ok(())
}
