//! Signed, content-anchored provenance records for pull requests.
//!
//! A reviewer runs the tag workflow to create a signed `pr/<n>` tag at HEAD
//! whose message embeds a SHA-512 digest of the commit's full history. An
//! integrator later runs the merge workflow to merge that tag with a signed
//! merge commit and obtain the approval URL for exactly the tagged commit.
//!
//! Repository access and process execution sit behind the [`Repository`],
//! [`ContentDigest`] and [`CommandExecutor`] traits so the workflows can run
//! against fakes.

pub mod config;
pub mod error;
pub mod exec;
pub mod provenance;
pub mod repository;
pub mod workflow;

pub use config::{load_config, Config};
pub use error::{PrtagError, Result};
pub use exec::{CommandExecutor, CommandStatus, Invocation, RecordingExecutor, SystemExecutor};
pub use provenance::{ForgeIdentity, ObjectId, PrNumber, Remote};
pub use repository::{ContentDigest, GitRepository, Repository};
pub use workflow::{MergeOutcome, TagOutcome, Workflow};
