//! Repository capability used by the workflows
//!
//! The workflows only need three things from a repository: the commit at
//! HEAD, the commit an annotated tag points at, and the configured remotes.
//! [`GitRepository`] provides them on top of `git2`; tests substitute an
//! in-memory implementation.

use crate::error::{PrtagError, Result};
use crate::provenance::digest::ObjectHasher;
use crate::provenance::types::{ObjectId, Remote};
use git2::{ErrorCode, Oid};
use std::path::{Path, PathBuf};

/// Narrow view of a repository.
pub trait Repository {
    /// Commit that HEAD currently resolves to.
    ///
    /// # Errors
    ///
    /// Returns `PrtagError::Reference` if HEAD is unborn or does not lead to
    /// a commit.
    fn head_commit(&self) -> Result<ObjectId>;

    /// Object an annotated tag directly targets.
    ///
    /// # Errors
    ///
    /// Returns `PrtagError::TagResolution` if the tag is missing or is not an
    /// annotated tag object.
    fn tag_target(&self, name: &str) -> Result<ObjectId>;

    /// Configured remotes with their URLs.
    ///
    /// # Errors
    ///
    /// Returns `PrtagError::ForgeResolution` if remotes cannot be listed.
    fn remotes(&self) -> Result<Vec<Remote>>;
}

/// Cryptographic summary of a commit and its full history.
pub trait ContentDigest {
    /// # Errors
    ///
    /// Returns `PrtagError::Digest` if the digest cannot be computed.
    fn commit_digest(&self, commit: &ObjectId) -> Result<Vec<u8>>;
}

/// A git repository opened through libgit2.
pub struct GitRepository {
    repo: git2::Repository,
    root: PathBuf,
}

impl GitRepository {
    /// Find the repository containing `start` and open it.
    ///
    /// # Errors
    ///
    /// Returns `PrtagError::RepositoryNotFound` if no repository encloses
    /// `start`, or `PrtagError::Repository` if it cannot be opened.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = start.as_ref();
        let repo = git2::Repository::discover(start).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                PrtagError::RepositoryNotFound {
                    path: start.to_path_buf(),
                }
            } else {
                PrtagError::Repository {
                    path: start.to_path_buf(),
                    reason: e.message().to_string(),
                }
            }
        })?;

        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();
        tracing::debug!("opened repository at {}", root.display());

        Ok(Self { repo, root })
    }

    /// Open the repository enclosing the current working directory.
    ///
    /// # Errors
    ///
    /// Same as [`GitRepository::discover`], plus `PrtagError::Io` if the
    /// working directory cannot be determined.
    pub fn discover_from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::discover(cwd)
    }

    /// Working tree root, or the git directory of a bare repository.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.root
    }
}

impl Repository for GitRepository {
    fn head_commit(&self) -> Result<ObjectId> {
        let head = self
            .repo
            .head()
            .map_err(|e| PrtagError::Reference(e.message().to_string()))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| PrtagError::Reference(e.message().to_string()))?;
        Ok(ObjectId::new(commit.id().to_string()))
    }

    fn tag_target(&self, name: &str) -> Result<ObjectId> {
        let resolution = |reason: String| PrtagError::TagResolution {
            tag: name.to_string(),
            reason,
        };

        let reference = self
            .repo
            .find_reference(&format!("refs/tags/{name}"))
            .map_err(|e| resolution(e.message().to_string()))?;
        let oid = reference
            .target()
            .ok_or_else(|| resolution("tag reference is symbolic".to_string()))?;
        let tag = self
            .repo
            .find_tag(oid)
            .map_err(|_| resolution("not an annotated tag".to_string()))?;

        Ok(ObjectId::new(tag.target_id().to_string()))
    }

    fn remotes(&self) -> Result<Vec<Remote>> {
        let names = self
            .repo
            .remotes()
            .map_err(|e| PrtagError::ForgeResolution(e.message().to_string()))?;

        let mut remotes = Vec::with_capacity(names.len());
        for name in names.iter().flatten() {
            match self.repo.find_remote(name) {
                Ok(remote) => {
                    if let Some(url) = remote.url() {
                        remotes.push(Remote::new(name, url));
                    }
                }
                Err(e) => tracing::warn!("skipping remote '{name}': {}", e.message()),
            }
        }
        Ok(remotes)
    }
}

impl ContentDigest for GitRepository {
    fn commit_digest(&self, commit: &ObjectId) -> Result<Vec<u8>> {
        let oid = Oid::from_str(commit.as_str())
            .map_err(|e| PrtagError::Digest(format!("invalid commit id {commit}: {e}")))?;
        ObjectHasher::new(&self.repo)?.commit_sum(oid)
    }
}
