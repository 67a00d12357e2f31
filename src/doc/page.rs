//! Generated documentation pages under the docs directory.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDateTime;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::DocError;

/// Slug format for page file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Timestamp format shown in changelog entries.
const ENTRY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Title used when the page has no text line to take one from.
const UNTITLED: &str = "Change notes";

/// A rendered page, ready to be written once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDoc {
    pub title: String,
    pub slug: String,
    pub path: PathBuf,
    pub content: String,
    generated_at: NaiveDateTime,
}

impl ChangeDoc {
    /// Build a page from generated Markdown.
    ///
    /// `title` wins when given and non-blank; otherwise the first non-empty
    /// line of `markdown` is used. The content always opens with a
    /// level-one heading.
    pub fn new(
        markdown: &str,
        title: Option<&str>,
        docs_dir: &Path,
        generated_at: NaiveDateTime,
    ) -> Result<Self, DocError> {
        if markdown.trim().is_empty() {
            return Err(DocError::EmptyDocument);
        }

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| derive_title(markdown));
        let slug = generated_at.format(TIMESTAMP_FORMAT).to_string();

        Ok(Self {
            content: ensure_heading(markdown, &title),
            path: docs_dir.join(format!("{slug}.md")),
            title,
            slug,
            generated_at,
        })
    }

    /// The changelog line linking to this page.
    ///
    /// The link is relative to `changelog_dir`, the directory holding the
    /// changelog, so it resolves when the changelog is rendered.
    pub fn changelog_entry(&self, changelog_dir: &Path) -> String {
        let link = relative_to(&self.path, changelog_dir)
            .to_string_lossy()
            .replace('\\', "/");
        format!(
            "- [{}]({}) — {}",
            self.title,
            link,
            self.generated_at.format(ENTRY_TIMESTAMP_FORMAT)
        )
    }
}

/// `target` expressed relative to `base`, stepping up with `..` as needed.
///
/// Falls back to `target` unchanged when the two paths share no root or
/// `base` itself climbs out with `..`.
fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let shared = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let rooted = target.has_root() || base.has_root();
    if (shared == 0 && rooted) || base_parts[shared..].contains(&Component::ParentDir) {
        return target.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in shared..base_parts.len() {
        relative.push("..");
    }
    relative.extend(&target_parts[shared..]);
    relative
}

/// Title from the first non-empty line, with heading markers stripped.
pub fn derive_title(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Make sure `markdown` opens with a level-one heading, adding `# {title}` if not.
pub fn ensure_heading(markdown: &str, title: &str) -> String {
    let body = markdown.trim_start_matches(['\n', '\r']);
    let first = body.lines().next().unwrap_or_default();

    let mut content = if first.starts_with("# ") {
        body.to_string()
    } else {
        format!("# {title}\n\n{body}")
    };

    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

/// Write `doc` to its path, creating directories as needed.
///
/// The page is written to a temporary file and renamed into place, and an
/// existing page is never overwritten.
pub fn write_change_doc(doc: &ChangeDoc) -> Result<(), DocError> {
    let write_failed = |source| DocError::WriteFailed {
        path: doc.path.display().to_string(),
        source,
    };

    let dir = doc
        .path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(dir).map_err(|source| DocError::CreateDirFailed {
        path: dir.display().to_string(),
        source,
    })?;

    let mut file = NamedTempFile::new_in(dir).map_err(write_failed)?;
    file.write_all(doc.content.as_bytes()).map_err(write_failed)?;
    file.persist_noclobber(&doc.path)
        .map_err(|e| write_failed(e.error))?;

    debug!("Wrote {}", doc.path.display());
    Ok(())
}
