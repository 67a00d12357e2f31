//! Interactive yes/no prompts.

use dialoguer::Confirm;
use tracing::debug;

/// Asks the user to confirm a step.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Returns `true` when the user accepts.
    fn confirm(&self, question: &str, default: bool) -> bool;
}

/// Prompts on the terminal.
///
/// A prompt that cannot be shown (no TTY, Ctrl-C) counts as a decline.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str, default: bool) -> bool {
        Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .unwrap_or_else(|e| {
                debug!("Prompt failed, treating as no: {e}");
                false
            })
    }
}

/// Answers yes to everything (`--yes`).
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, question: &str, _default: bool) -> bool {
        debug!("Auto-confirming: {question}");
        true
    }
}
