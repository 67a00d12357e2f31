//! AI-generated commit messages and the commit pipeline.

pub mod driver;
pub mod impact;
pub mod message;
pub mod prompt;

pub use driver::{
    CommitDriver, CommitOptions, CommitOutcome, CommitReport, PersistStatus, PushPolicy,
    PushStatus, preview_staged,
};
pub use impact::{HistoryPolicy, ImpactScore, ImpactScorer, ImpactWeights, heuristic};
pub use message::{CommitMessage, FALLBACK_SUBJECT, SUBJECT_MAX_CHARS, split_message};
pub use prompt::{PromptKind, build_prompt, build_structured_commit_prompt};
