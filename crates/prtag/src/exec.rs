//! External command execution
//!
//! Signing and merging are delegated to the version-control tool. The
//! workflows reach it through [`CommandExecutor`], so tests can record
//! invocations instead of spawning processes.

use crate::error::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Exit status of an external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    code: Option<i32>,
}

impl CommandStatus {
    #[must_use]
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Status of a process that ended without an exit code (e.g. a signal).
    #[must_use]
    pub fn terminated() -> Self {
        Self { code: None }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exited with status {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Runs an external program to completion.
pub trait CommandExecutor {
    /// Run `program` with `args`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns `PrtagError::Io` if the program cannot be started.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandStatus>;
}

/// Spawns real processes whose output streams pass straight through to the
/// operator's terminal.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    workdir: PathBuf,
}

impl SystemExecutor {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl CommandExecutor for SystemExecutor {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandStatus> {
        tracing::debug!(
            "running {program} {} in {}",
            args.first().map_or("", String::as_str),
            self.workdir.display()
        );
        let status = Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(status.into())
    }
}

/// One recorded call to [`RecordingExecutor::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Records invocations instead of running them.
///
/// Replies with scripted statuses in order, then with success once the
/// script is exhausted.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    invocations: RefCell<Vec<Invocation>>,
    script: RefCell<VecDeque<CommandStatus>>,
}

impl RecordingExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to successive invocations with `statuses`.
    #[must_use]
    pub fn with_statuses(statuses: impl IntoIterator<Item = CommandStatus>) -> Self {
        Self {
            invocations: RefCell::default(),
            script: RefCell::new(statuses.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }
}

impl CommandExecutor for RecordingExecutor {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandStatus> {
        self.invocations.borrow_mut().push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
        });
        Ok(self
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(CommandStatus::success))
    }
}
