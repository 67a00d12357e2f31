//! Markdown change documentation and the changelog index that links it.

pub mod changelog;
pub mod page;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::commit::prompt::{PromptKind, build_prompt};
use crate::error::DocError;
use crate::git::{GitExecutor, GitRepo};
use crate::llm::CompletionClient;

pub use changelog::{CHANGELOG_TITLE, insert_entry, update_changelog};
pub use page::{ChangeDoc, TIMESTAMP_FORMAT, derive_title, ensure_heading, write_change_doc};

/// Settings for one `doc` run.
#[derive(Debug, Clone)]
pub struct DocOptions {
    pub title: Option<String>,
    /// Document `git diff <range>` instead of the staged changes.
    pub range: Option<String>,
    /// Print the page without writing anything.
    pub dry_run: bool,
    /// Relative paths are taken from the repository root, not the cwd.
    pub docs_dir: PathBuf,
    /// Resolved like `docs_dir`.
    pub changelog_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocOutcome {
    NoChanges,
    Previewed(ChangeDoc),
    Written(ChangeDoc),
}

impl DocOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            DocOutcome::NoChanges => 1,
            DocOutcome::Previewed(_) | DocOutcome::Written(_) => 0,
        }
    }
}

/// Generate a change page from the diff, write it, and index it.
pub async fn generate_doc<E: GitExecutor>(
    repo: &GitRepo<E>,
    client: &dyn CompletionClient,
    options: &DocOptions,
    generated_at: NaiveDateTime,
) -> Result<DocOutcome, DocError> {
    let diff = match &options.range {
        Some(rev) => repo.diff_against(rev)?,
        None => repo.staged_diff(),
    };

    if diff.trim().is_empty() {
        println!("No changes to document. Stage changes or pass --range.");
        return Ok(DocOutcome::NoChanges);
    }

    let docs_dir = anchor_at_toplevel(repo, &options.docs_dir)?;
    let changelog_path = anchor_at_toplevel(repo, &options.changelog_path)?;

    println!("Generating documentation...");
    let markdown = client.complete(&build_prompt(PromptKind::Doc, &diff)).await?;
    let doc = ChangeDoc::new(&markdown, options.title.as_deref(), &docs_dir, generated_at)?;

    if options.dry_run {
        println!("{}", doc.content);
        println!("Dry run: not writing {}", doc.path.display());
        return Ok(DocOutcome::Previewed(doc));
    }

    write_change_doc(&doc)?;
    let changelog_dir = changelog_path.parent().unwrap_or_else(|| Path::new(""));
    update_changelog(&changelog_path, &doc.changelog_entry(changelog_dir))?;

    info!("Indexed {} in {}", doc.slug, changelog_path.display());
    println!("[DONE] Wrote {}", doc.path.display());
    println!("[DONE] Updated {}", changelog_path.display());

    Ok(DocOutcome::Written(doc))
}

/// Join a relative `path` onto the working tree root; absolute paths pass through.
fn anchor_at_toplevel<E: GitExecutor>(
    repo: &GitRepo<E>,
    path: &Path,
) -> Result<PathBuf, DocError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let root = repo.toplevel()?;
    debug!("Resolving {} against {}", path.display(), root.display());
    Ok(root.join(path))
}
