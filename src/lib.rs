//! gitgenie - AI-written commit messages and change documentation.
//!
//! # Overview
//!
//! gitgenie reads the staged git diff, asks a hosted language model for a
//! commit message, shows it, and commits. It can score the change's impact,
//! push, and save a record of the commit to an external store. The `doc`
//! command turns a diff into a Markdown page and links it from CHANGELOG.md.

pub mod commit;
pub mod config;
pub mod doc;
pub mod error;
pub mod git;
pub mod interact;
pub mod llm;
pub mod record;

// Re-export commonly used types
pub use commit::{CommitDriver, CommitMessage, CommitOptions, CommitOutcome, ImpactScorer};
pub use config::{AppConfig, CredentialProvider, EnvCredentials, StaticCredentials};
pub use error::{CompletionError, ConfigError, DocError, DriverError, GitError, RecordError};
pub use git::GitRepo;
pub use llm::{CompletionClient, HttpCompletionClient, Prompt};
pub use record::{CommitRecord, HttpRecordStore, RecordStore};
