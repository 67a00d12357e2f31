//! Error types for gitgenie modules using thiserror.

use thiserror::Error;

/// Errors from resolving configuration and credentials.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing API credential: set {variable} in the environment or pass --api-key")]
    MissingCredential { variable: String },

    #[error(
        "Invalid impact weights: model={model}, history={history}. Weights must be non-negative and sum to 1"
    )]
    InvalidWeights { model: f64, history: f64 },

    #[error("git executable not found on PATH. Install git and try again")]
    GitNotInstalled,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors from invoking the git binary.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} exited with code {code}: {stderr}")]
    NonZeroExit {
        operation: String,
        code: i32,
        stderr: String,
    },

    #[error("Could not parse git {operation} output: {detail}")]
    UnexpectedOutput { operation: String, detail: String },
}

impl GitError {
    /// Exit code reported by git, when the process ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitError::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Raw stderr of the failed command, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            GitError::NonZeroExit { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Errors from the completion endpoint.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Completion API response is missing expected fields: {0}")]
    Parse(String),

    #[error("Model reply does not match the expected schema: {reason}")]
    Schema { reason: String, raw: String },

    #[error("Completion request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Completion request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Errors from writing documentation pages and the changelog index.
#[derive(Error, Debug)]
pub enum DocError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Generated documentation is empty")]
    EmptyDocument,

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Errors from the external commit record store.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Record store is unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("Record store rejected the write with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid record store connection string '{0}'")]
    InvalidConnection(String),
}

/// Fatal outcomes of the commit pipeline.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("git commit failed with code {code}:\n{stderr}")]
    CommitFailed { code: i32, stderr: String },
}

impl DriverError {
    /// Process exit code for this failure; git's own code is mirrored for commit failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::CommitFailed { code, .. } => *code,
            _ => 1,
        }
    }
}
