//! Parsing of `git --shortstat` summaries into change sizes.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Marker printed by `git log --format` ahead of each commit's shortstat.
pub(crate) const COMMIT_MARKER: &str = "@@gitgenie-commit@@";

static INSERTIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) insertions?\(\+\)").expect("Invalid regex"));

static DELETIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) deletions?\(-\)").expect("Invalid regex"));

/// Line counts from a single shortstat summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeStat {
    pub insertions: u64,
    pub deletions: u64,
}

impl ChangeStat {
    /// Size of the change: inserted plus deleted lines.
    pub fn size(&self) -> u64 {
        self.insertions + self.deletions
    }
}

/// Parse a shortstat line such as ` 3 files changed, 10 insertions(+), 2 deletions(-)`.
///
/// Missing counts are zero, so an empty string parses to an empty stat.
pub fn parse_shortstat(text: &str) -> ChangeStat {
    ChangeStat {
        insertions: capture_count(&INSERTIONS_RE, text),
        deletions: capture_count(&DELETIONS_RE, text),
    }
}

fn capture_count(re: &Regex, text: &str) -> u64 {
    re.captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .sum()
}

/// Split `git log --format=<COMMIT_MARKER> --shortstat` output into one size per commit.
///
/// Commits without a stat line (merges, empty commits) count as size 0.
pub fn parse_log_sizes(output: &str) -> Vec<u64> {
    let mut sizes = Vec::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        if line.trim() == COMMIT_MARKER {
            if let Some(block) = current.take() {
                sizes.push(parse_shortstat(&block).size());
            }
            current = Some(String::new());
        } else if let Some(block) = current.as_mut() {
            block.push_str(line);
            block.push('\n');
        }
    }

    if let Some(block) = current {
        sizes.push(parse_shortstat(&block).size());
    }

    sizes
}
