//! The changelog index: one linked line per generated page, newest first.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::DocError;

/// Top-level title every changelog index starts with.
pub const CHANGELOG_TITLE: &str = "# Changelog";

/// Insert `entry` into changelog `content`.
///
/// - No file yet: the title followed by the entry.
/// - File without the title: the title and entry are prepended, the old
///   content follows unchanged.
/// - Otherwise the entry goes on the line right after the first title line.
///
/// Existing lines are never removed or reordered.
pub fn insert_entry(content: Option<&str>, entry: &str) -> String {
    let entry = entry.trim_end();

    let Some(content) = content else {
        return format!("{CHANGELOG_TITLE}\n{entry}\n");
    };

    let mut out = String::with_capacity(content.len() + entry.len() + CHANGELOG_TITLE.len() + 2);
    let mut inserted = false;

    for line in content.split_inclusive('\n') {
        out.push_str(line);
        if !inserted && line.trim_end() == CHANGELOG_TITLE {
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(entry);
            out.push('\n');
            inserted = true;
        }
    }

    if inserted {
        out
    } else {
        format!("{CHANGELOG_TITLE}\n{entry}\n{content}")
    }
}

/// Insert `entry` into the changelog at `path`, creating it if needed.
pub fn update_changelog(path: &Path, entry: &str) -> Result<(), DocError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(source) => {
            return Err(DocError::ReadFailed {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let updated = insert_entry(existing.as_deref(), entry);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| DocError::CreateDirFailed {
            path: parent.display().to_string(),
            source,
        })?;
    }

    std::fs::write(path, updated).map_err(|source| DocError::WriteFailed {
        path: path.display().to_string(),
        source,
    })
}
