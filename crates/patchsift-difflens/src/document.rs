use std::fmt;
use std::path::{Path, PathBuf};

use patchsift_core::Verdict;

use crate::filter::DiffFilter;
use crate::parser::Hunk;

/// A single file's diff body together with the paths the caller attaches.
///
/// Paths are supplied, not parsed: hosting APIs hand out per-file patch
/// bodies that start at the first `@@` header.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::document::DiffDocument;
///
/// let doc = DiffDocument::new("src/buf.c", "src/buf.c", "@@ -3 +3 @@\n-n = 0;\n+n = 1;");
/// assert_eq!(doc.hunks().len(), 1);
/// assert_eq!(
///     doc.render_filtered().unwrap(),
///     "--- a/src/buf.c\n+++ b/src/buf.c\n@@ -3 +3 @@\n-n = 0;\n+n = 1;"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct DiffDocument<'a> {
    old_path: PathBuf,
    new_path: PathBuf,
    filter: DiffFilter<'a>,
}

impl<'a> DiffDocument<'a> {
    /// Segment and classify `body` for the given path pair.
    pub fn new(old_path: impl Into<PathBuf>, new_path: impl Into<PathBuf>, body: &'a str) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            filter: DiffFilter::new(body),
        }
    }

    /// Convenience for the common case where the file was not renamed.
    pub fn for_file(path: impl Into<PathBuf>, body: &'a str) -> Self {
        let path = path.into();
        Self::new(path.clone(), path, body)
    }

    /// Path in the old version.
    pub fn old_path(&self) -> &Path {
        &self.old_path
    }

    /// Path in the new version.
    pub fn new_path(&self) -> &Path {
        &self.new_path
    }

    /// Hunks in input order.
    pub fn hunks(&self) -> &[Hunk<'a>] {
        self.filter.hunks()
    }

    /// Verdicts parallel to [`DiffDocument::hunks`].
    pub fn verdicts(&self) -> &[Verdict] {
        self.filter.verdicts()
    }

    /// The underlying classified diff.
    pub fn filter(&self) -> &DiffFilter<'a> {
        &self.filter
    }

    /// The filtered body without file headers. Empty when nothing semantic
    /// remains.
    pub fn filtered_body(&self) -> String {
        self.filter.to_diff()
    }

    /// The filtered body under synthetic `--- a/` / `+++ b/` headers, or
    /// `None` if every hunk is formatting-only.
    pub fn render_filtered(&self) -> Option<String> {
        let body = self.filtered_body();
        if body.is_empty() {
            tracing::debug!(path = %self.new_path.display(), "no semantic change");
            return None;
        }
        Some(format!(
            "--- a/{}\n+++ b/{}\n{body}",
            forward_slashes(&self.old_path),
            forward_slashes(&self.new_path)
        ))
    }
}

impl fmt::Display for DiffDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kept = self.filter.kept().count();
        write!(
            f,
            "{} ({} hunks, {} semantic)",
            self.new_path.display(),
            self.hunks().len(),
            kept
        )
    }
}

fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
