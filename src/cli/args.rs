//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output; implies `--no-interactive`
//! - `--no-interactive` / `--yes`: Never prompt
//! - `--config <path>`: Configuration file
//! - `--transport <http|hub>`: Remote transport override

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::forge::Transport;

/// ugh - release lineages, draft releases and cross-repository pull requests
#[derive(Parser, Debug)]
#[command(name = "ugh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if ugh was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Never prompt; answer every confirmation with yes
    #[arg(long, global = true, visible_alias = "yes")]
    pub no_interactive: bool,

    /// Configuration file (default: $UGH_CONFIG, then ~/.config/ugh/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Remote transport, overriding the configured one
    #[arg(long, global = true, value_parser = parse_transport)]
    pub transport: Option<Transport>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Whether prompts are allowed, given the configured default.
    pub fn interactive(&self, configured: bool) -> bool {
        configured && !self.no_interactive && !self.quiet
    }
}

fn parse_transport(value: &str) -> Result<Transport, String> {
    Transport::parse(value).ok_or_else(|| {
        format!(
            "invalid transport '{}', must be one of: {}",
            value,
            crate::forge::valid_transport_names().join(", ")
        )
    })
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a release lineage branch
    #[command(
        name = "release:init",
        long_about = "Initialize the specified release lineage.\n\n\
            Merges the previous lineage branch into the repository's default branch, \
            then creates the new lineage branch at the result. The previous lineage \
            must exist and the new one must not.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Create 2.3.x from master after merging 2.2.x into it
    ugh release:init acme/widgets 2.3

    # Major releases have no derivable predecessor
    ugh release:init acme/widgets 3.0 --previous 2.9"
    )]
    ReleaseInit {
        /// Repository as <owner/name>
        repository: String,

        /// Lineage version as <major.minor[.patch]>
        version: String,

        /// Previous version, required for major releases
        #[arg(long)]
        previous: Option<String>,
    },

    /// Retire the previous release lineage branch
    #[command(
        name = "release:cleanup",
        long_about = "Deprecate the previous release lineage in favor of the specified one.\n\n\
            Every open pull request based on the previous lineage is re-targeted to \
            the new lineage, then the previous lineage branch is deleted. The branch \
            is kept if any pull request could not be updated.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Move pull requests from 2.2.x to 2.3.x and delete 2.2.x
    ugh release:cleanup acme/widgets 2.3"
    )]
    ReleaseCleanup {
        /// Repository as <owner/name>
        repository: String,

        /// Lineage version as <major.minor[.patch]>
        version: String,

        /// Previous version, required for major releases
        #[arg(long)]
        previous: Option<String>,
    },

    /// Merge a ticket's pull requests and upsert a draft release
    #[command(
        name = "pre-release",
        long_about = "Merge pull requests across the configured repositories for <ticket> and \
            upsert a draft release of the given type.\n\n\
            Pass `finalize` as the ticket to publish the pending draft releases.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Squash-merge TICKET-42 everywhere and add it to the next patch draft
    ugh pre-release TICKET-42

    # Accumulate into the next minor release instead
    ugh pre-release TICKET-42 minor

    # Publish the drafts
    ugh pre-release finalize"
    )]
    PreRelease {
        /// Ticket branch name, or `finalize`
        ticket: String,

        /// Release type: patch or minor
        #[arg(default_value = "patch")]
        release_type: String,
    },

    /// Open a pull request across the repositories of a template
    #[command(
        name = "pull-request",
        after_help = "\
WORKFLOW EXAMPLES:
    # Open TICKET-42 pull requests in every repository of the backport template
    ugh pull-request backport TICKET-42 \"Fix widget alignment\"

    # Against a lineage branch
    ugh pull-request backport TICKET-42 \"Fix widget alignment\" -b 2.3.x"
    )]
    PullRequest {
        /// Template name under [pull_request] in the configuration
        template: String,

        /// Head branch
        head: String,

        /// Title text following the head branch name
        message: String,

        /// Base branch (default: the repository's default branch)
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
SETUP EXAMPLES:
    # Bash (add to ~/.bashrc)
    eval \"$(ugh completion bash)\"

    # Zsh (add to ~/.zshrc)
    eval \"$(ugh completion zsh)\"

    # Fish
    ugh completion fish > ~/.config/fish/completions/ugh.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
