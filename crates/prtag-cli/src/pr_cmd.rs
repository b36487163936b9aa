//! CLI commands for pull request provenance
//!
//! Implements `pr tag` and `pr merge`.

use crate::cli::{Commands, PrArgs};
use colored::Colorize;
use prtag::{Config, GitRepository, Result, SystemExecutor, Workflow};

/// Run a pr subcommand.
pub fn run_pr(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Tag(args) => run_tag(args, config),
        Commands::Merge(args) => run_merge(args, config),
    }
}

// ---------------------------------------------------------------------------
// tag
// ---------------------------------------------------------------------------

fn run_tag(args: PrArgs, config: &Config) -> Result<()> {
    let repo = GitRepository::discover_from_cwd()?;
    let executor = SystemExecutor::new(repo.workdir());
    let mut stdout = std::io::stdout().lock();

    let outcome = Workflow::new(&repo, &executor, config).tag(
        &mut stdout,
        args.pr,
        args.message.as_deref(),
    )?;

    eprintln!(
        "  {} {} -> {}",
        "TAGGED".green(),
        outcome.tag_name,
        short_id(outcome.target.as_str())
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// merge
// ---------------------------------------------------------------------------

fn run_merge(args: PrArgs, config: &Config) -> Result<()> {
    let repo = GitRepository::discover_from_cwd()?;
    let executor = SystemExecutor::new(repo.workdir());
    let mut stdout = std::io::stdout().lock();

    let outcome = Workflow::new(&repo, &executor, config).merge(
        &mut stdout,
        args.pr,
        args.message.as_deref(),
    )?;

    eprintln!(
        "  {} {} ({})",
        "MERGED".green(),
        outcome.tag_name,
        short_id(outcome.target.as_str())
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
