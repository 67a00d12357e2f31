//! Prompt construction for summaries, commit messages and change docs.
//!
//! Every builder is pure: the same diff always produces the same prompt.

use crate::llm::Prompt;

/// Placeholder sent when an empty commit is explicitly allowed.
pub const EMPTY_DIFF_PLACEHOLDER: &str = "(empty diff)";

/// What the model is being asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Preview of the staged changes, commit-style.
    Summary,
    /// The commit message that will be used.
    Commit,
    /// A Markdown documentation page.
    Doc,
}

const COMMIT_SYSTEM: &str = "You are a precise commit assistant. Write a git commit message with \
an imperative subject line of at most 72 characters, then a blank line, then a short body \
grouped by file that explains what changed and why. Do not use code fences or markdown headers.";

const STRUCTURED_SYSTEM: &str = "You are a precise commit assistant. Reply with a single JSON \
object and nothing else, using exactly these fields:\n\
{\"subject\": string, \"body\": string, \"rating\": integer}\n\
- subject: imperative summary of the change, at most 72 characters\n\
- body: short explanation grouped by file, what changed and why; may be empty\n\
- rating: significance of the change from 1 (trivial) to 10 (major)";

const DOC_SYSTEM: &str = "You are a technical writer documenting a code change. Write Markdown \
with exactly these sections, in this order, each as a level-two heading:\n\
## Overview\n\
## Key Changes by File\n\
## Breaking Changes\n\
## Migration/Upgrade Notes\n\
## Usage Examples\n\
## Next Steps\n\
Start with a single level-one heading that names the change. Write \"None.\" under any \
section that does not apply.";

/// Build the prompt for `kind` around `diff`.
pub fn build_prompt(kind: PromptKind, diff: &str) -> Prompt {
    let diff = diff_or_placeholder(diff);

    let (system, lead) = match kind {
        PromptKind::Summary => (
            COMMIT_SYSTEM,
            "Summarize this staged git diff as a commit-style message:",
        ),
        PromptKind::Commit => (
            COMMIT_SYSTEM,
            "Write the commit message for the following staged diff. Use an imperative subject \
of at most 72 characters, a blank line, then a readable body grouped by file:",
        ),
        PromptKind::Doc => (
            DOC_SYSTEM,
            "Document the following git diff for the project's change log:",
        ),
    };

    Prompt {
        system: system.to_string(),
        user: format!("{lead}\n\n{diff}"),
    }
}

/// Build the commit prompt that asks for a `{subject, body, rating}` object.
pub fn build_structured_commit_prompt(diff: &str) -> Prompt {
    Prompt {
        system: STRUCTURED_SYSTEM.to_string(),
        user: format!(
            "Describe and rate the following staged diff:\n\n{}",
            diff_or_placeholder(diff)
        ),
    }
}

fn diff_or_placeholder(diff: &str) -> &str {
    if diff.trim().is_empty() {
        EMPTY_DIFF_PLACEHOLDER
    } else {
        diff
    }
}
