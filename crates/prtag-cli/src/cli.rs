//! Command line definition

use clap::{Args, Parser, Subcommand};
use prtag::PrNumber;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Examples:
  Create a tag for PR 1
    $ pr tag 1

  Merge PR tag 1 with a message
    $ pr merge --message \"fixes\" 1";

#[derive(Debug, Parser)]
#[command(name = "pr")]
#[command(about = "Create and merge signed provenance tags for pull requests")]
#[command(after_help = AFTER_HELP)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to a config.json (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a signed tag for a PR (creates the tag 'pr/<PR number>')
    Tag(PrArgs),
    /// Merge a PR tag (merges tag 'pr/<PR number>' into the current branch)
    Merge(PrArgs),
}

#[derive(Debug, Args)]
pub struct PrArgs {
    /// Message to include in the tag or merge commit
    #[arg(long, short)]
    pub message: Option<String>,

    /// Pull request number
    #[arg(value_name = "PR number", value_parser = parse_pr_number, allow_negative_numbers = true)]
    pub pr: PrNumber,
}

fn parse_pr_number(s: &str) -> Result<PrNumber, String> {
    s.parse::<PrNumber>().map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parse_tag() {
        let cli = Cli::try_parse_from(["pr", "tag", "42"]).unwrap();
        match cli.command {
            Commands::Tag(args) => {
                assert_eq!(args.pr.get(), 42);
                assert!(args.message.is_none());
            }
            Commands::Merge(_) => panic!("expected tag"),
        }
        assert!(!cli.debug);
    }

    #[test]
    fn parse_merge_with_message() {
        let cli = Cli::try_parse_from(["pr", "merge", "--message", "fixes", "1"]).unwrap();
        match cli.command {
            Commands::Merge(args) => {
                assert_eq!(args.pr.get(), 1);
                assert_eq!(args.message.as_deref(), Some("fixes"));
            }
            Commands::Tag(_) => panic!("expected merge"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["pr", "tag", "--debug", "--config", "/tmp/c.json", "3"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
    }

    #[test]
    fn zero_is_rejected() {
        let err = Cli::try_parse_from(["pr", "tag", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("pr number must be positive: 0"));
    }

    #[test]
    fn negative_is_rejected() {
        let err = Cli::try_parse_from(["pr", "merge", "-4"]).unwrap_err();
        assert!(err.to_string().contains("pr number must be positive: -4"));
    }

    #[test]
    fn non_numeric_is_rejected() {
        let err = Cli::try_parse_from(["pr", "tag", "abc"]).unwrap_err();
        assert!(err.to_string().contains("pr number is invalid: abc"));
    }

    #[test]
    fn missing_pr_number() {
        let err = Cli::try_parse_from(["pr", "tag"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn unknown_command() {
        assert!(Cli::try_parse_from(["pr", "push", "1"]).is_err());
    }

    #[test]
    fn short_message_flag() {
        let cli = Cli::try_parse_from(["pr", "tag", "-m", "reviewed", "8"]).unwrap();
        match cli.command {
            Commands::Tag(args) => assert_eq!(args.message.as_deref(), Some("reviewed")),
            Commands::Merge(_) => panic!("expected tag"),
        }
    }

    #[test]
    fn extra_positional_rejected() {
        assert!(Cli::try_parse_from(["pr", "tag", "1", "2"]).is_err());
    }
}
