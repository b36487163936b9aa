//! Forge identity inference from remote URLs
//!
//! Recognises the URL shapes git accepts for network remotes:
//!
//! - `https://[user@]host[:port]/org/repo[.git]` (also `http://`, `git://`)
//! - `ssh://[user@]host[:port]/org/repo[.git]`
//! - scp-like `[user@]host:org/repo[.git]`
//!
//! Local paths and `file://` URLs never identify a forge.

use super::types::{ForgeIdentity, Remote};
use crate::error::{PrtagError, Result};

/// Parse a single remote URL into a forge identity.
#[must_use]
pub fn parse_remote_url(url: &str) -> Option<ForgeIdentity> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let (authority, path) = if let Some((scheme, rest)) = url.split_once("://") {
        match scheme.to_ascii_lowercase().as_str() {
            "https" | "http" | "git" | "ssh" | "git+ssh" | "ssh+git" => {}
            _ => return None,
        }
        rest.split_once('/')?
    } else {
        // scp-like syntax: a colon before any slash, and not a Windows drive
        let colon = url.find(':')?;
        if url[..colon].contains('/') || colon == 1 {
            return None;
        }
        (&url[..colon], &url[colon + 1..])
    };

    let host = host_of(authority)?;
    let (org, repo) = split_path(path)?;
    Some(ForgeIdentity::new(host, org, repo))
}

/// Infer the forge identity from a repository's remotes.
///
/// The `preferred` remote is tried first; the remaining remotes follow in
/// name order and the first parseable one wins.
///
/// # Errors
///
/// Returns `PrtagError::ForgeResolution` if there are no remotes or none of
/// them points at a forge.
pub fn infer_forge(remotes: &[Remote], preferred: &str) -> Result<ForgeIdentity> {
    if remotes.is_empty() {
        return Err(PrtagError::ForgeResolution(
            "no remote configured".to_string(),
        ));
    }

    let mut ordered: Vec<&Remote> = remotes.iter().collect();
    ordered.sort_by(|a, b| {
        (a.name != preferred)
            .cmp(&(b.name != preferred))
            .then_with(|| a.name.cmp(&b.name))
    });

    for remote in ordered {
        match parse_remote_url(&remote.url) {
            Some(forge) => {
                tracing::debug!(
                    "inferred forge {}/{}/{} from remote '{}'",
                    forge.host,
                    forge.org,
                    forge.repo,
                    remote.name
                );
                return Ok(forge);
            }
            None => {
                tracing::warn!(
                    "remote '{}' ({}) does not identify a forge, skipping",
                    remote.name,
                    remote.url
                );
            }
        }
    }

    let names: Vec<&str> = remotes.iter().map(|r| r.name.as_str()).collect();
    Err(PrtagError::ForgeResolution(format!(
        "none of the remotes [{}] points at a forge",
        names.join(", ")
    )))
}

fn host_of(authority: &str) -> Option<String> {
    let without_user = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = match without_user.strip_prefix('[') {
        // IPv6 literal
        Some(rest) => rest.split_once(']')?.0,
        None => without_user.split(':').next()?,
    };
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

fn split_path(path: &str) -> Option<(String, String)> {
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let (repo, org) = segments.split_last()?;
    if org.is_empty() {
        return None;
    }
    Some((org.join("/"), (*repo).to_string()))
}
