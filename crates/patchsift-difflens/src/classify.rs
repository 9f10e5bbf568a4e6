//! Per-hunk formatting-only detection.
//!
//! The comparison is deliberately positional: the n-th non-blank added line
//! is compared with the n-th non-blank removed line. Reordered lines are not
//! recognized as equivalent.

use patchsift_core::Verdict;

use crate::normalize::normalize_line;
use crate::parser::{DiffLine, Hunk};

/// Normalized added and removed lines of one hunk, blank lines dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangedLines {
    /// Keys of single-`+` lines, in order.
    pub added: Vec<String>,
    /// Keys of single-`-` lines, in order.
    pub removed: Vec<String>,
}

impl ChangedLines {
    /// Collect the normalized changed lines of `hunk`.
    pub fn collect(hunk: &Hunk<'_>) -> Self {
        let mut lines = Self::default();
        for line in hunk.lines() {
            let (target, content) = match line {
                DiffLine::Added(content) => (&mut lines.added, content),
                DiffLine::Removed(content) => (&mut lines.removed, content),
                DiffLine::Context(_) | DiffLine::Other(_) => continue,
            };
            let key = normalize_line(content);
            if !key.is_empty() {
                target.push(key);
            }
        }
        lines
    }

    /// Apply the positional pairing rule.
    pub fn verdict(&self) -> Verdict {
        if self.added.is_empty() && self.removed.is_empty() {
            return Verdict::NoSubstantiveChange;
        }

        if let Some(index) = self
            .added
            .iter()
            .zip(&self.removed)
            .position(|(added, removed)| added != removed)
        {
            return Verdict::ContentMismatch { index };
        }

        if self.added.len() == self.removed.len() {
            Verdict::WhitespaceOnly {
                pairs: self.added.len(),
            }
        } else {
            Verdict::CountMismatch {
                added: self.added.len(),
                removed: self.removed.len(),
            }
        }
    }
}

/// Classify one hunk.
///
/// # Examples
///
/// ```
/// use patchsift_core::Verdict;
/// use patchsift_difflens::classify::classify_hunk;
/// use patchsift_difflens::parser::Hunk;
///
/// let hunk = Hunk::new("@@ -1 +1 @@\n-    return 1;\n+\treturn 1;");
/// assert_eq!(classify_hunk(&hunk), Verdict::WhitespaceOnly { pairs: 1 });
/// ```
pub fn classify_hunk(hunk: &Hunk<'_>) -> Verdict {
    let verdict = ChangedLines::collect(hunk).verdict();
    tracing::debug!(
        header = hunk.header().unwrap_or(""),
        %verdict,
        "classified hunk"
    );
    verdict
}

/// Returns `true` if `hunk` only changes whitespace.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::classify::is_formatting_only;
/// use patchsift_difflens::parser::Hunk;
///
/// assert!(is_formatting_only(&Hunk::new("@@ -1 +1 @@\n   context")));
/// assert!(!is_formatting_only(&Hunk::new("@@ -1 +1 @@\n-foo\n+bar")));
/// ```
pub fn is_formatting_only(hunk: &Hunk<'_>) -> bool {
    classify_hunk(hunk).is_formatting_only()
}
