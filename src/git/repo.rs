//! Repository operations built on the git subprocess seam.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::GitError;

use super::executor::{GitExecutor, GitOutput, SystemGit};
use super::stat::{COMMIT_MARKER, parse_log_sizes, parse_shortstat};

/// Number of past commits compared against the staged change.
pub const HISTORY_DEPTH: usize = 10;

/// Fallback identity when neither a remote nor a top-level directory is known.
const UNKNOWN_REPOSITORY: &str = "repository";

/// A git working copy driven through a [`GitExecutor`].
pub struct GitRepo<E = SystemGit> {
    executor: E,
}

impl GitRepo<SystemGit> {
    /// Repository rooted at the current directory.
    pub fn current() -> Self {
        Self::new(SystemGit::new())
    }
}

impl<E: GitExecutor> GitRepo<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Return the staged diff, or an empty string when nothing is staged.
    ///
    /// Runs `git diff --cached --quiet` first; exit code 0 means no staged
    /// changes and the full diff is never captured. Any failure (including
    /// running outside a repository) yields an empty string.
    pub fn staged_diff(&self) -> String {
        match self.executor.run(&args(&["diff", "--cached", "--quiet"])) {
            Ok(output) if output.success() => {
                debug!("No staged changes");
                return String::new();
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Could not check for staged changes: {e}");
                return String::new();
            }
        }

        match self.executor.run(&args(&["diff", "--cached"])) {
            Ok(output) if output.success() => output.stdout,
            Ok(output) => {
                debug!("git diff --cached failed: {}", output.stderr.trim());
                String::new()
            }
            Err(e) => {
                warn!("Could not capture staged diff: {e}");
                String::new()
            }
        }
    }

    /// Diff between `rev` and the working tree.
    pub fn diff_against(&self, rev: &str) -> Result<String, GitError> {
        self.run_checked("diff", &["diff", rev]).map(|o| o.stdout)
    }

    /// Stage every change in the working tree (`git add -A`).
    pub fn stage_all(&self) -> Result<(), GitError> {
        self.run_checked("add", &["add", "-A"]).map(|_| ())
    }

    /// Create a commit with `subject` and an optional `body`.
    ///
    /// The body is passed as a second `-m` so git keeps the blank separator line.
    pub fn commit(&self, subject: &str, body: &str, allow_empty: bool) -> Result<GitOutput, GitError> {
        let mut commit_args = vec!["commit"];
        if allow_empty {
            commit_args.push("--allow-empty");
        }
        commit_args.extend(["-m", subject]);
        if !body.is_empty() {
            commit_args.extend(["-m", body]);
        }

        self.run_checked("commit", &commit_args)
    }

    /// Push the current branch to its upstream.
    pub fn push(&self) -> Result<GitOutput, GitError> {
        self.run_checked("push", &["push"])
    }

    /// Full hash of HEAD.
    pub fn head_commit(&self) -> Result<String, GitError> {
        let output = self.run_checked("rev-parse", &["rev-parse", "HEAD"])?;
        let hash = output.stdout.trim().to_string();
        if hash.is_empty() {
            return Err(GitError::UnexpectedOutput {
                operation: "rev-parse".to_string(),
                detail: "empty commit hash".to_string(),
            });
        }
        Ok(hash)
    }

    /// Read a git config value; unset keys are `None`.
    pub fn config_value(&self, key: &str) -> Option<String> {
        let output = self.executor.run(&args(&["config", "--get", key])).ok()?;
        if !output.success() {
            return None;
        }
        let value = output.stdout.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Stable identity of this repository, e.g. `owner/repo`.
    ///
    /// Derived from the `origin` remote when there is one, otherwise from
    /// the name of the top-level directory.
    pub fn repository_identity(&self) -> String {
        if let Some(url) = self.command_stdout(&["remote", "get-url", "origin"])
            && let Some(identity) = identity_from_remote(&url)
        {
            return identity;
        }

        self.command_stdout(&["rev-parse", "--show-toplevel"])
            .and_then(|top| {
                std::path::Path::new(&top)
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| UNKNOWN_REPOSITORY.to_string())
    }

    /// Inserted plus deleted lines in the staged diff.
    pub fn staged_change_size(&self) -> Result<u64, GitError> {
        let output = self.run_checked("diff", &["diff", "--cached", "--shortstat"])?;
        Ok(parse_shortstat(&output.stdout).size())
    }

    /// Change sizes of the most recent `limit` commits, newest first.
    ///
    /// A repository without commits has no history and yields an empty list.
    pub fn recent_change_sizes(&self, limit: usize) -> Result<Vec<u64>, GitError> {
        if !self.has_commits()? {
            debug!("HEAD is unborn, no change history");
            return Ok(Vec::new());
        }

        let count = limit.to_string();
        // `tformat:` makes git accept a format without placeholders
        let format = format!("--format=tformat:{COMMIT_MARKER}");
        let output =
            self.run_checked("log", &["log", "-n", &count, &format, "--shortstat"])?;
        Ok(parse_log_sizes(&output.stdout))
    }

    /// Absolute path of the working tree root.
    pub fn toplevel(&self) -> Result<PathBuf, GitError> {
        let output = self.run_checked("rev-parse", &["rev-parse", "--show-toplevel"])?;
        let top = output.stdout.trim();
        if top.is_empty() {
            return Err(GitError::UnexpectedOutput {
                operation: "rev-parse".to_string(),
                detail: "empty top-level path".to_string(),
            });
        }
        Ok(PathBuf::from(top))
    }

    /// Whether HEAD points at a commit. An unborn branch has none.
    fn has_commits(&self) -> Result<bool, GitError> {
        let output = self
            .executor
            .run(&args(&["rev-parse", "--verify", "--quiet", "HEAD"]))?;
        match output.code {
            Some(0) => Ok(true),
            // `--verify --quiet` exits 1 without output when HEAD is unborn
            Some(1) => Ok(false),
            code => Err(GitError::NonZeroExit {
                operation: "rev-parse".to_string(),
                code: code.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            }),
        }
    }

    fn command_stdout(&self, cmd: &[&str]) -> Option<String> {
        let output = self.executor.run(&args(cmd)).ok()?;
        if !output.success() {
            return None;
        }
        let value = output.stdout.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn run_checked(&self, operation: &str, cmd: &[&str]) -> Result<GitOutput, GitError> {
        let output = self.executor.run(&args(cmd))?;
        if !output.success() {
            return Err(GitError::NonZeroExit {
                operation: operation.to_string(),
                code: output.code.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Turn a remote URL into `owner/repo`.
///
/// Handles `git@host:owner/repo.git`, `https://host/owner/repo(.git)` and
/// `ssh://git@host/owner/repo`.
pub fn identity_from_remote(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    let path = if let Some((_, rest)) = url.split_once("://") {
        rest.split_once('/').map(|(_, path)| path)?
    } else if let Some((_, path)) = url.split_once(':') {
        path
    } else {
        url
    };

    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [.., owner, repo] => Some(format!("{owner}/{repo}")),
        [repo] => Some((*repo).to_string()),
        [] => None,
    }
}
