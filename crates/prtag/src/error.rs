//! Error taxonomy for provenance tagging and merging
//!
//! Every failure aborts the running workflow and is surfaced to the operator
//! as a single line, so each variant renders to one human-readable sentence.

use std::path::PathBuf;

/// Errors produced by the provenance workflows and their collaborators.
#[derive(Debug, thiserror::Error)]
pub enum PrtagError {
    /// No repository was found above the starting directory.
    #[error("not in a git repo {}", path.display())]
    RepositoryNotFound { path: PathBuf },

    /// A repository was found but could not be opened or inspected.
    #[error("unable to open repo {}: {reason}", path.display())]
    Repository { path: PathBuf, reason: String },

    /// HEAD could not be resolved to a commit.
    #[error("unable to resolve HEAD: {0}")]
    Reference(String),

    /// The content digest of a commit could not be computed.
    #[error("unable to compute content digest: {0}")]
    Digest(String),

    /// No forge, organisation and repository could be inferred from remotes.
    #[error("unable to infer forge from remotes: {0}")]
    ForgeResolution(String),

    /// Creating the signed tag failed (name collision or signing failure).
    #[error("failed to create signed tag '{tag}': {reason}")]
    TagCreation { tag: String, reason: String },

    /// The signed merge failed (conflict, signing failure or missing tag).
    #[error("failed to merge '{tag}': {reason}")]
    Merge { tag: String, reason: String },

    /// A tag that a previous step relied on is missing or unreadable.
    #[error("unable to resolve tag '{tag}': {reason}")]
    TagResolution { tag: String, reason: String },

    /// Invalid operator input (PR number, message, URL line).
    #[error("{0}")]
    Argument(String),

    /// A configuration file exists but could not be parsed.
    #[error("invalid configuration: {0}")]
    ConfigParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PrtagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_not_found_names_the_path() {
        let err = PrtagError::RepositoryNotFound {
            path: PathBuf::from("/tmp/nowhere"),
        };
        assert_eq!(err.to_string(), "not in a git repo /tmp/nowhere");
    }

    #[test]
    fn tag_creation_is_single_line() {
        let err = PrtagError::TagCreation {
            tag: "pr/7".to_string(),
            reason: "git exited with status 128".to_string(),
        };
        let text = err.to_string();
        assert!(!text.contains('\n'));
        assert!(text.contains("pr/7"));
    }

    #[test]
    fn argument_is_verbatim() {
        let err = PrtagError::Argument("pr number must be positive: 0".to_string());
        assert_eq!(err.to_string(), "pr number must be positive: 0");
    }
}
