//! Git operations via the system `git` binary.

pub mod executor;
pub mod repo;
pub mod stat;

pub use executor::{GitExecutor, GitOutput, SystemGit, check_git_installed};
pub use repo::{GitRepo, HISTORY_DEPTH, identity_from_remote};
pub use stat::{ChangeStat, parse_shortstat};
