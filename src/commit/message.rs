//! Splitting model output into a commit subject and body.

use std::fmt;

use serde::Serialize;

/// Hard cap on subject length, in characters.
pub const SUBJECT_MAX_CHARS: usize = 72;

/// Subject used when the model returns nothing usable.
pub const FALLBACK_SUBJECT: &str = "chore: update";

/// A commit message derived from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitMessage {
    pub subject: String,
    /// May be empty.
    pub body: String,
}

impl CommitMessage {
    /// Format for display or for a single-argument commit:
    /// subject, blank line, body (omitted when empty).
    pub fn format(&self) -> String {
        if self.body.is_empty() {
            self.subject.clone()
        } else {
            format!("{}\n\n{}", self.subject, self.body)
        }
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Split model output into subject and body.
///
/// Trailing whitespace is stripped from every line and leading blank lines
/// are dropped. The first remaining line, cut to 72 characters without any
/// word-boundary adjustment, is the subject; the remaining lines joined by
/// newlines and trimmed are the body. Output with no content yields
/// [`FALLBACK_SUBJECT`] and an empty body.
pub fn split_message(message: &str) -> CommitMessage {
    let mut lines = message
        .lines()
        .map(str::trim_end)
        .skip_while(|line| line.is_empty());

    let Some(first) = lines.next() else {
        return CommitMessage {
            subject: FALLBACK_SUBJECT.to_string(),
            body: String::new(),
        };
    };

    let subject: String = first.chars().take(SUBJECT_MAX_CHARS).collect();
    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();

    CommitMessage { subject, body }
}
