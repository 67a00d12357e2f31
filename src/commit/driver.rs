//! The commit pipeline: diff → message → preview → commit → push → record.
//!
//! Every run ends in one [`CommitOutcome`]. Upstream and git failures before
//! or during the commit are fatal; push and persistence failures after the
//! commit are reported and swallowed so the local commit always stands.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{DriverError, GitError};
use crate::git::{GitExecutor, GitRepo, HISTORY_DEPTH};
use crate::interact::Prompter;
use crate::llm::CompletionClient;
use crate::record::{CommitRecord, RecordStore};

use super::impact::{ImpactScore, ImpactScorer};
use super::message::{CommitMessage, split_message};
use super::prompt::{PromptKind, build_prompt, build_structured_commit_prompt};

const PREVIEW_RULE: &str = "----- AI Commit Message -----";
const PREVIEW_END: &str = "-----------------------------";

/// Shown by `commit`, which can stage on its own with `--add-all`.
const COMMIT_NOTHING_STAGED: &str = "No staged changes. Use `--add-all` or `git add` first.";
/// Shown by `test`, which has no staging flag.
const PREVIEW_NOTHING_STAGED: &str = "No staged changes. Use `git add` first.";

/// Whether to push after committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushPolicy {
    /// Ask the user.
    #[default]
    Ask,
    Always,
    Never,
}

/// Switches for one commit run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitOptions {
    /// Run `git add -A` first.
    pub add_all: bool,
    /// Show the message and stop.
    pub dry_run: bool,
    /// Commit even when nothing is staged.
    pub allow_empty: bool,
    /// Ask before committing.
    pub confirm: bool,
    pub push: PushPolicy,
    /// Ask the model for `{subject, body, rating}` and score the change.
    pub structured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushStatus {
    Pushed,
    Declined,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    /// No store configured, or nothing was pushed.
    NotOffered,
    Declined,
    Saved,
    Failed(String),
}

/// What happened after a successful commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    pub commit_id: String,
    pub message: CommitMessage,
    pub impact: Option<ImpactScore>,
    pub push: PushStatus,
    pub persist: PersistStatus,
}

/// Terminal state of a commit run.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// Nothing staged and empty commits not allowed.
    NoChanges,
    /// Dry run; the message was shown but nothing was committed.
    NotCommitted(CommitMessage),
    /// The user declined the commit confirmation.
    Aborted,
    Committed(CommitReport),
}

impl CommitOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommitOutcome::NoChanges | CommitOutcome::Aborted => 1,
            CommitOutcome::NotCommitted(_) | CommitOutcome::Committed(_) => 0,
        }
    }
}

/// Drives one commit run against a repository.
pub struct CommitDriver<'a, E: GitExecutor> {
    repo: &'a GitRepo<E>,
    client: &'a dyn CompletionClient,
    prompter: &'a dyn Prompter,
    store: Option<&'a dyn RecordStore>,
    scorer: ImpactScorer,
    options: CommitOptions,
}

impl<'a, E: GitExecutor> CommitDriver<'a, E> {
    pub fn new(
        repo: &'a GitRepo<E>,
        client: &'a dyn CompletionClient,
        prompter: &'a dyn Prompter,
        options: CommitOptions,
    ) -> Self {
        Self {
            repo,
            client,
            prompter,
            store: None,
            scorer: ImpactScorer::default(),
            options,
        }
    }

    /// Offer to persist pushed commits to `store`.
    pub fn with_store(mut self, store: &'a dyn RecordStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_scorer(mut self, scorer: ImpactScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub async fn run(&self) -> Result<CommitOutcome, DriverError> {
        if self.options.add_all {
            println!("Staging all changes...");
            self.repo.stage_all()?;
        }

        let diff = self.repo.staged_diff();
        if diff.is_empty() && !self.options.allow_empty {
            println!("{COMMIT_NOTHING_STAGED}");
            return Ok(CommitOutcome::NoChanges);
        }

        let (message, rating) = self.generate_message(&diff).await?;
        let impact = rating.map(|rating| self.score(rating));

        print_preview(&message, impact);

        if self.options.dry_run {
            println!("Dry run: not committing.");
            return Ok(CommitOutcome::NotCommitted(message));
        }

        if self.options.confirm && !self.prompter.confirm("Commit with this message?", true) {
            println!("Aborted.");
            return Ok(CommitOutcome::Aborted);
        }

        self.repo
            .commit(&message.subject, &message.body, diff.is_empty())
            .map_err(|e| match e {
                GitError::NonZeroExit { code, stderr, .. } => {
                    DriverError::CommitFailed { code, stderr }
                }
                other => DriverError::Git(other),
            })?;

        let commit_id = self.repo.head_commit()?;
        println!("[DONE] Committed {}", short_hash(&commit_id));
        info!("Created commit {commit_id}");

        let push = self.push();
        let persist = if push == PushStatus::Pushed {
            self.persist(&commit_id, &message, impact).await
        } else {
            PersistStatus::NotOffered
        };

        Ok(CommitOutcome::Committed(CommitReport {
            commit_id,
            message,
            impact,
            push,
            persist,
        }))
    }

    async fn generate_message(
        &self,
        diff: &str,
    ) -> Result<(CommitMessage, Option<u8>), DriverError> {
        println!("Generating commit message...");

        if self.options.structured {
            let reply = self
                .client
                .complete_structured(&build_structured_commit_prompt(diff))
                .await?;
            debug!("Model rated change {}/10", reply.rating);
            return Ok((reply.message, Some(reply.rating)));
        }

        let text = self
            .client
            .complete(&build_prompt(PromptKind::Commit, diff))
            .await?;
        Ok((split_message(&text), None))
    }

    fn score(&self, rating: u8) -> ImpactScore {
        let current = self.repo.staged_change_size().unwrap_or_else(|e| {
            warn!("Could not measure staged change: {e}");
            0
        });
        let history = self
            .repo
            .recent_change_sizes(HISTORY_DEPTH)
            .unwrap_or_else(|e| {
                warn!("Could not read commit history: {e}");
                Vec::new()
            });

        debug!(
            "Scoring change of {current} lines against {} past commits",
            history.len()
        );
        self.scorer.score(rating, current, &history)
    }

    fn push(&self) -> PushStatus {
        let wanted = match self.options.push {
            PushPolicy::Always => true,
            PushPolicy::Never => false,
            PushPolicy::Ask => self.prompter.confirm("Push to remote?", true),
        };

        if !wanted {
            debug!("Push skipped");
            return PushStatus::Declined;
        }

        println!("Pushing...");
        match self.repo.push() {
            Ok(_) => {
                println!("[DONE] Pushed");
                PushStatus::Pushed
            }
            Err(e) => {
                let detail = e.stderr().map(str::to_string).unwrap_or_else(|| e.to_string());
                warn!("Push failed: {e}");
                println!("[WARN] Push failed, the commit is kept locally:\n{detail}");
                PushStatus::Failed(detail)
            }
        }
    }

    async fn persist(
        &self,
        commit_id: &str,
        message: &CommitMessage,
        impact: Option<ImpactScore>,
    ) -> PersistStatus {
        let Some(store) = self.store else {
            return PersistStatus::NotOffered;
        };

        if !self.prompter.confirm("Save this commit to the record store?", true) {
            return PersistStatus::Declined;
        }

        let record = CommitRecord {
            author_name: self.repo.config_value("user.name").unwrap_or_default(),
            author_email: self.repo.config_value("user.email").unwrap_or_default(),
            repository: self.repo.repository_identity(),
            commit_id: commit_id.to_string(),
            subject: message.subject.clone(),
            body: message.body.clone(),
            impact: impact.map(|score| score.value()),
            created_at: Utc::now(),
        };

        match store.upsert(&record).await {
            Ok(()) => {
                println!("[DONE] Saved commit record");
                PersistStatus::Saved
            }
            Err(e) => {
                warn!("Could not save commit record: {e}");
                println!("[WARN] Could not save commit record: {e}");
                PersistStatus::Failed(e.to_string())
            }
        }
    }
}

fn print_preview(message: &CommitMessage, impact: Option<ImpactScore>) {
    println!("{PREVIEW_RULE}");
    println!("{message}");
    println!("{PREVIEW_END}");
    if let Some(score) = impact {
        println!("Impact score: {score}/100");
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

/// Summarize the staged changes without committing (`gitgenie test`).
///
/// Returns `None` when nothing is staged.
pub async fn preview_staged<E: GitExecutor>(
    repo: &GitRepo<E>,
    client: &dyn CompletionClient,
) -> Result<Option<String>, DriverError> {
    let diff = repo.staged_diff();
    if diff.is_empty() {
        println!("{PREVIEW_NOTHING_STAGED}");
        return Ok(None);
    }

    let summary = client
        .complete(&build_prompt(PromptKind::Summary, &diff))
        .await?;
    Ok(Some(summary))
}
