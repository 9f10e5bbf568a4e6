//! Formatting-noise removal at hunk granularity.
//!
//! Drops every hunk that only reindents or respaces code, so downstream
//! pattern matching only sees edits that change tokens. Hunks are kept or
//! dropped whole and always reproduced verbatim.

use patchsift_core::Verdict;
use serde::Serialize;

use crate::classify::classify_hunk;
use crate::parser::{segment_hunks, Hunk};

/// Remove formatting-only hunks from a diff.
///
/// Returns the surviving hunks joined with `\n` in their original order, or
/// an empty string if nothing semantic remains. An empty result means the
/// patch carries no semantic change and should not be persisted.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::filter::strip_formatting_changes;
///
/// let diff = "@@ -1 +1 @@\n-    return 1\n+\treturn 1";
/// assert_eq!(strip_formatting_changes(diff), "");
///
/// let diff = "@@ -1 +1 @@\n-return 1\n+return 0";
/// assert_eq!(strip_formatting_changes(diff), diff);
/// ```
pub fn strip_formatting_changes(diff: &str) -> String {
    DiffFilter::new(diff).into_diff()
}

/// Join the hunks whose verdict is not formatting-only.
///
/// `hunks` and `verdicts` are parallel; extra entries on either side are
/// ignored.
///
/// # Examples
///
/// ```
/// use patchsift_core::Verdict;
/// use patchsift_difflens::filter::reassemble;
/// use patchsift_difflens::parser::Hunk;
///
/// let hunks = [Hunk::new("@@ a"), Hunk::new("@@ b"), Hunk::new("@@ c")];
/// let verdicts = [
///     Verdict::ContentMismatch { index: 0 },
///     Verdict::NoSubstantiveChange,
///     Verdict::CountMismatch { added: 1, removed: 0 },
/// ];
/// assert_eq!(reassemble(&hunks, &verdicts), "@@ a\n@@ c");
/// ```
pub fn reassemble(hunks: &[Hunk<'_>], verdicts: &[Verdict]) -> String {
    hunks
        .iter()
        .zip(verdicts)
        .filter(|(_, verdict)| !verdict.is_formatting_only())
        .map(|(hunk, _)| hunk.text())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A diff split into hunks, each paired with its verdict.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::filter::DiffFilter;
///
/// let diff = "@@ -1 +1 @@\n- x\n+x\n@@ -7 +7 @@\n+y";
/// let filter = DiffFilter::new(diff);
/// assert_eq!(filter.hunks().len(), 2);
/// assert_eq!(filter.kept().count(), 1);
/// assert_eq!(filter.into_diff(), "@@ -7 +7 @@\n+y");
/// ```
#[derive(Debug, Clone)]
pub struct DiffFilter<'a> {
    hunks: Vec<Hunk<'a>>,
    verdicts: Vec<Verdict>,
}

impl<'a> DiffFilter<'a> {
    /// Segment and classify `diff`.
    pub fn new(diff: &'a str) -> Self {
        let hunks = segment_hunks(diff);
        let verdicts = hunks.iter().map(classify_hunk).collect();
        Self { hunks, verdicts }
    }

    /// All hunks in input order.
    pub fn hunks(&self) -> &[Hunk<'a>] {
        &self.hunks
    }

    /// Verdicts parallel to [`DiffFilter::hunks`].
    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    /// Hunks that carry a semantic change.
    pub fn kept(&self) -> impl Iterator<Item = &Hunk<'a>> + '_ {
        self.hunks
            .iter()
            .zip(&self.verdicts)
            .filter(|(_, v)| !v.is_formatting_only())
            .map(|(h, _)| h)
    }

    /// Returns `true` if no hunk carries a semantic change.
    pub fn is_formatting_only(&self) -> bool {
        self.verdicts.iter().all(|v| v.is_formatting_only())
    }

    /// The filtered diff text.
    pub fn to_diff(&self) -> String {
        reassemble(&self.hunks, &self.verdicts)
    }

    /// Consume the filter, returning the filtered diff text.
    pub fn into_diff(self) -> String {
        self.to_diff()
    }

    /// Build a serializable per-hunk report.
    pub fn report(&self) -> FilterReport {
        let hunks: Vec<HunkReport> = self
            .hunks
            .iter()
            .zip(&self.verdicts)
            .enumerate()
            .map(|(index, (hunk, verdict))| HunkReport {
                index,
                header: hunk.header().map(str::to_string),
                kept: !verdict.is_formatting_only(),
                verdict: *verdict,
            })
            .collect();
        let kept = hunks.iter().filter(|h| h.kept).count();

        FilterReport {
            total_hunks: hunks.len(),
            kept_hunks: kept,
            dropped_hunks: hunks.len() - kept,
            hunks,
            filtered_diff: self.to_diff(),
        }
    }
}

/// Per-hunk outcome of filtering a diff.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterReport {
    /// Number of hunks found.
    pub total_hunks: usize,
    /// Hunks retained as semantic.
    pub kept_hunks: usize,
    /// Hunks dropped as formatting-only.
    pub dropped_hunks: usize,
    /// One entry per hunk, in input order.
    pub hunks: Vec<HunkReport>,
    /// The reassembled diff; empty when nothing semantic remains.
    pub filtered_diff: String,
}

impl FilterReport {
    /// Render the report as GitHub-flavored Markdown.
    ///
    /// # Examples
    ///
    /// ```
    /// use patchsift_difflens::filter::DiffFilter;
    ///
    /// let md = DiffFilter::new("@@ -1 +1 @@\n-a\n+b").report().to_markdown();
    /// assert!(md.contains("| 0 |"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Formatting Filter\n\n");
        md.push_str(&format!(
            "{} hunks: {} kept, {} dropped as formatting-only\n\n",
            self.total_hunks, self.kept_hunks, self.dropped_hunks
        ));
        if self.hunks.is_empty() {
            return md;
        }
        md.push_str("| # | Header | Kept | Reason |\n|---|---|---|---|\n");
        for h in &self.hunks {
            md.push_str(&format!(
                "| {} | `{}` | {} | {} |\n",
                h.index,
                h.header.as_deref().unwrap_or("(none)"),
                if h.kept { "yes" } else { "no" },
                h.verdict,
            ));
        }
        if !self.filtered_diff.is_empty() {
            md.push_str(&format!("\n```diff\n{}\n```\n", self.filtered_diff.trim_end()));
        }
        md
    }
}

/// Outcome for a single hunk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkReport {
    /// Position of the hunk in the input.
    pub index: usize,
    /// The `@@` header line, if the hunk has one.
    pub header: Option<String>,
    /// Whether the hunk survives filtering.
    pub kept: bool,
    /// The rule that decided it.
    pub verdict: Verdict,
}
