//! Core types for pull request provenance
//!
//! Defines the PR reference, the commit identity, the forge identity inferred
//! from remotes, and the tag naming rule shared by both workflows.

use crate::error::{PrtagError, Result};
use std::fmt;
use std::str::FromStr;

/// Prefix of every provenance tag name.
pub const TAG_PREFIX: &str = "pr/";

/// A pull request number on the hosting forge. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrNumber(u64);

impl PrNumber {
    /// Wrap a raw number.
    ///
    /// # Errors
    ///
    /// Returns `PrtagError::Argument` if `n` is zero.
    pub fn new(n: u64) -> Result<Self> {
        if n == 0 {
            return Err(PrtagError::Argument(format!(
                "pr number must be positive: {n}"
            )));
        }
        Ok(Self(n))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    /// The provenance tag name for this PR: `pr/<n>`.
    #[must_use]
    pub fn tag_name(self) -> String {
        format!("{TAG_PREFIX}{}", self.0)
    }
}

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PrNumber {
    type Err = PrtagError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(rest) = s.strip_prefix('-') {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(PrtagError::Argument(format!(
                    "pr number must be positive: {s}"
                )));
            }
        }
        let n: u64 = s
            .parse()
            .map_err(|_| PrtagError::Argument(format!("pr number is invalid: {s}")))?;
        Self::new(n)
    }
}

/// Hex identity of a git object (normally a commit).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into().to_ascii_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A configured remote: its name and fetch URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

impl Remote {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Hosting provider, organisation and repository a PR lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeIdentity {
    /// Host name, e.g. `github.com`
    pub host: String,
    /// Organisation or user; nested groups are joined with `/`
    pub org: String,
    /// Repository name without a `.git` suffix
    pub repo: String,
    /// Replaces `https://<host>` in generated URLs when set
    pub base_override: Option<String>,
}

impl ForgeIdentity {
    pub fn new(host: impl Into<String>, org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            org: org.into(),
            repo: repo.into(),
            base_override: None,
        }
    }

    /// Use `base` instead of `https://<host>` as the URL prefix.
    #[must_use]
    pub fn with_base_url(mut self, base: Option<String>) -> Self {
        self.base_override = base.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.base_override {
            Some(base) => base.clone(),
            None => format!("https://{}", self.host),
        }
    }

    /// `<base>/<org>/<repo>/pull/<n>`
    #[must_use]
    pub fn pull_url(&self, pr: PrNumber) -> String {
        format!("{}/{}/{}/pull/{pr}", self.base_url(), self.org, self.repo)
    }
}
