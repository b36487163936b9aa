//! Pull request provenance primitives
//!
//! This module provides the types, message format, forge inference and
//! content digest used to anchor a reviewed change to a signed tag.
//!
//! # Architecture
//!
//! ```text
//! HEAD --> content digest --> forge identity --> provenance message --> signed tag
//! ```
//!
//! Everything here is free of side effects except [`digest::ObjectHasher`],
//! which reads the object database. Running git, printing, and ordering of
//! side effects live in [`crate::workflow`].
//!
//! # Components
//!
//! - **Types** ([`types`]): PR number, tag naming, object ids, forge identity
//! - **Message** ([`message`]): provenance message and approval line format
//! - **Forge** ([`forge`]): forge/org/repo inference from remote URLs
//! - **Digest** ([`digest`]): SHA-512 over a commit and its reachable history

pub mod digest;
pub mod forge;
pub mod message;
pub mod types;

pub use digest::{bytes_digest, hex_encode, ObjectHasher, DIGEST_LEN};
pub use forge::{infer_forge, parse_remote_url};
pub use message::{
    approval_line, approval_url, format_message, merge_message, tag_message, validate_message,
    DIGEST_TRAILER,
};
pub use types::{ForgeIdentity, ObjectId, PrNumber, Remote, TAG_PREFIX};
