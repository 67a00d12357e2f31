//! Subprocess seam for the system `git` binary.
//!
//! Shelling out inherits the user's git config, SSH agent and credential
//! store. Calls block until git exits; there is no timeout.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::{ConfigError, GitError};

/// Captured result of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code, `None` if git was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait for running git commands.
///
/// This abstraction allows mocking the git subprocess in tests.
#[cfg_attr(test, mockall::automock)]
pub trait GitExecutor: Send + Sync {
    /// Run git with `args` and capture its output. Only spawn failures are errors.
    fn run(&self, args: &[String]) -> Result<GitOutput, GitError>;
}

/// Executor that runs the real `git` binary.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    workdir: Option<PathBuf>,
}

impl SystemGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command inside `workdir` instead of the process cwd.
    pub fn in_dir(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(workdir.into()),
        }
    }
}

impl GitExecutor for SystemGit {
    fn run(&self, args: &[String]) -> Result<GitOutput, GitError> {
        debug!("git {}", args.join(" "));

        let mut command = Command::new("git");
        command.args(args);
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| GitError::SpawnFailed {
            operation: args.first().cloned().unwrap_or_default(),
            source,
        })?;

        Ok(GitOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Check that a `git` executable is reachable on PATH.
pub fn check_git_installed() -> Result<(), ConfigError> {
    which::which("git")
        .map(|_| ())
        .map_err(|_| ConfigError::GitNotInstalled)
}
