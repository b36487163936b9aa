//! Provenance message formatting
//!
//! A provenance message is the text stored in a `pr/<n>` tag or in the merge
//! commit that brings it in:
//!
//! ```text
//! PR https://github.com/acme/widgets/pull/42
//!
//! optional operator message
//!
//! Object-sha512: <128 hex chars>
//! ```
//!
//! Sections are separated by exactly one blank line. The message block and
//! the trailer are optional; merge commits never carry the trailer.

use super::types::{ForgeIdentity, ObjectId, PrNumber};
use crate::error::{PrtagError, Result};

/// Trailer key carrying the content digest of the tagged commit.
pub const DIGEST_TRAILER: &str = "Object-sha512";

/// Assemble a provenance message from its sections.
///
/// The optional message has leading and trailing line breaks stripped; if
/// nothing is left it is treated as absent.
///
/// # Errors
///
/// Returns `PrtagError::Argument` if the URL line is empty or spans more than
/// one line.
pub fn format_message(
    url_line: &str,
    message: Option<&str>,
    trailer: Option<&str>,
) -> Result<String> {
    if url_line.trim().is_empty() {
        return Err(PrtagError::Argument(
            "provenance message requires a URL line".to_string(),
        ));
    }
    if url_line.contains(['\n', '\r']) {
        return Err(PrtagError::Argument(format!(
            "URL line must be a single line: {url_line:?}"
        )));
    }

    let mut out = String::with_capacity(url_line.len() + 160);
    out.push_str(url_line);
    out.push_str("\n\n");

    if let Some(body) = message.map(normalize_message).filter(|m| !m.is_empty()) {
        out.push_str(body);
        out.push_str("\n\n");
    }

    if let Some(trailer) = trailer {
        out.push_str(trailer);
        out.push('\n');
    }

    Ok(out)
}

/// Reject messages that cannot travel on a process command line.
///
/// # Errors
///
/// Returns `PrtagError::Argument` if the message contains a NUL byte.
pub fn validate_message(message: &str) -> Result<()> {
    if message.contains('\0') {
        return Err(PrtagError::Argument(
            "message must not contain NUL characters".to_string(),
        ));
    }
    Ok(())
}

/// Message for a `pr/<n>` tag, including the digest trailer.
///
/// # Errors
///
/// Propagates [`format_message`] errors.
pub fn tag_message(
    forge: &ForgeIdentity,
    pr: PrNumber,
    message: Option<&str>,
    digest_hex: &str,
) -> Result<String> {
    let url_line = format!("PR {}", forge.pull_url(pr));
    let trailer = format!("{DIGEST_TRAILER}: {digest_hex}");
    format_message(&url_line, message, Some(trailer.as_str()))
}

/// Message for the merge commit of a `pr/<n>` tag. No digest trailer.
///
/// # Errors
///
/// Propagates [`format_message`] errors.
pub fn merge_message(
    forge: &ForgeIdentity,
    pr: PrNumber,
    message: Option<&str>,
) -> Result<String> {
    let url_line = format!("Merged PR {}", forge.pull_url(pr));
    format_message(&url_line, message, None)
}

/// URL a reviewer opens to approve exactly the tagged commit.
#[must_use]
pub fn approval_url(forge: &ForgeIdentity, pr: PrNumber, target: &ObjectId) -> String {
    format!("{}/changes/{target}", forge.pull_url(pr))
}

/// `Approve PR: <approval url>`
#[must_use]
pub fn approval_line(forge: &ForgeIdentity, pr: PrNumber, target: &ObjectId) -> String {
    format!("Approve PR: {}", approval_url(forge, pr, target))
}

fn normalize_message(message: &str) -> &str {
    message.trim_matches(['\n', '\r'])
}
