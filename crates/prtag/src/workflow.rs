//! Tag and merge workflows
//!
//! ```text
//! tag:   HEAD --> content digest --> forge --> message --> stdout --> git tag -s
//! merge: forge --> message --> stdout --> git merge -S --> tag target --> approval URL
//! ```
//!
//! Every step either succeeds or aborts the workflow; nothing is retried and
//! nothing is rolled back. The provenance message is written to `out` before
//! the external command runs, so the operator sees it even if signing or
//! merging fails.

use crate::config::Config;
use crate::error::{PrtagError, Result};
use crate::exec::CommandExecutor;
use crate::provenance::digest::hex_encode;
use crate::provenance::forge::infer_forge;
use crate::provenance::message::{
    approval_line, approval_url, merge_message, tag_message, validate_message,
};
use crate::provenance::types::{ForgeIdentity, ObjectId, PrNumber};
use crate::repository::{ContentDigest, Repository};
use std::io::Write;

/// Result of a successful tag workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOutcome {
    pub tag_name: String,
    /// Commit the tag was created at
    pub target: ObjectId,
    /// Hex content digest embedded in the trailer
    pub digest_hex: String,
    pub message: String,
}

/// Result of a successful merge workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub tag_name: String,
    /// Commit the merged tag targets
    pub target: ObjectId,
    pub approval_url: String,
    pub message: String,
}

/// Both provenance workflows over one repository and one executor.
pub struct Workflow<'a, R, E> {
    repo: &'a R,
    executor: &'a E,
    config: &'a Config,
}

impl<'a, R: Repository, E: CommandExecutor> Workflow<'a, R, E> {
    pub fn new(repo: &'a R, executor: &'a E, config: &'a Config) -> Self {
        Self {
            repo,
            executor,
            config,
        }
    }

    /// Merge the `pr/<n>` tag into the current branch with a signed merge
    /// commit, then print the approval URL for the tagged commit.
    ///
    /// # Errors
    ///
    /// - `PrtagError::ForgeResolution` before any command runs if no forge
    ///   can be inferred
    /// - `PrtagError::Merge` if `git merge -S` cannot start or exits non-zero
    /// - `PrtagError::TagResolution` if the tag cannot be read back after a
    ///   successful merge (the merge commit is kept)
    pub fn merge<W: Write>(
        &self,
        out: &mut W,
        pr: PrNumber,
        message: Option<&str>,
    ) -> Result<MergeOutcome> {
        if let Some(m) = message {
            validate_message(m)?;
        }
        let tag_name = pr.tag_name();

        let forge = self.forge()?;
        let text = merge_message(&forge, pr, message)?;

        out.write_all(text.as_bytes())?;
        out.flush()?;

        let args = vec![
            "merge".to_string(),
            "-S".to_string(),
            "-m".to_string(),
            text.clone(),
            tag_name.clone(),
        ];
        let status = self
            .executor
            .run(&self.config.git_program, &args)
            .map_err(|e| PrtagError::Merge {
                tag: tag_name.clone(),
                reason: e.to_string(),
            })?;
        if !status.is_success() {
            return Err(PrtagError::Merge {
                tag: tag_name,
                reason: format!("git merge {status}"),
            });
        }

        let target = self.repo.tag_target(&tag_name)?;
        tracing::debug!("{tag_name} targets {target}");

        writeln!(out)?;
        writeln!(out, "{}", approval_line(&forge, pr, &target))?;
        out.flush()?;

        Ok(MergeOutcome {
            approval_url: approval_url(&forge, pr, &target),
            tag_name,
            target,
            message: text,
        })
    }

    fn forge(&self) -> Result<ForgeIdentity> {
        let remotes = self.repo.remotes()?;
        Ok(infer_forge(&remotes, &self.config.remote)?
            .with_base_url(self.config.forge_base_url.clone()))
    }
}

impl<'a, R: Repository + ContentDigest, E: CommandExecutor> Workflow<'a, R, E> {
    /// Create a signed `pr/<n>` tag at HEAD whose message anchors the
    /// content digest of HEAD's full history.
    ///
    /// # Errors
    ///
    /// - `PrtagError::Reference` if HEAD does not resolve to a commit
    /// - `PrtagError::Digest` if the content digest cannot be computed
    /// - `PrtagError::ForgeResolution` before any command runs if no forge
    ///   can be inferred
    /// - `PrtagError::TagCreation` if `git tag -s` cannot start or exits
    ///   non-zero (existing tag, signing failure)
    pub fn tag<W: Write>(
        &self,
        out: &mut W,
        pr: PrNumber,
        message: Option<&str>,
    ) -> Result<TagOutcome> {
        if let Some(m) = message {
            validate_message(m)?;
        }
        let tag_name = pr.tag_name();

        let head = self.repo.head_commit()?;
        tracing::debug!("HEAD is {head}");

        let digest_hex = hex_encode(&self.repo.commit_digest(&head)?);
        tracing::debug!("content digest of {head} is {digest_hex}");

        let forge = self.forge()?;
        let text = tag_message(&forge, pr, message, &digest_hex)?;

        out.write_all(text.as_bytes())?;
        out.flush()?;

        let args = vec![
            "tag".to_string(),
            "-s".to_string(),
            "-m".to_string(),
            text.clone(),
            tag_name.clone(),
            head.to_string(),
        ];
        let status = self
            .executor
            .run(&self.config.git_program, &args)
            .map_err(|e| PrtagError::TagCreation {
                tag: tag_name.clone(),
                reason: e.to_string(),
            })?;
        if !status.is_success() {
            return Err(PrtagError::TagCreation {
                tag: tag_name,
                reason: format!("git tag {status}"),
            });
        }

        Ok(TagOutcome {
            tag_name,
            target: head,
            digest_hex,
            message: text,
        })
    }
}
