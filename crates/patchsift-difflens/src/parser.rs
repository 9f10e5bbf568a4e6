//! Hunk segmentation and line tagging for unified diff text.

use std::fmt;

/// Marker that opens a hunk header line.
pub const HUNK_MARKER: &str = "@@";

/// A contiguous region of a unified diff, borrowed verbatim from the input.
///
/// The text starts at a `@@` header line (or, for the first hunk, at any
/// preamble preceding it) and runs up to, but not including, the newline
/// that precedes the next header.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::parser::{DiffLine, Hunk};
///
/// let hunk = Hunk::new("@@ -1 +1 @@\n-old\n+new");
/// assert_eq!(hunk.header(), Some("@@ -1 +1 @@"));
/// let lines: Vec<_> = hunk.lines().collect();
/// assert_eq!(lines[1], DiffLine::Removed("old"));
/// assert_eq!(lines[2], DiffLine::Added("new"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunk<'a> {
    text: &'a str,
}

impl<'a> Hunk<'a> {
    /// Wrap raw hunk text.
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// The raw text exactly as it appeared in the diff.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The first `@@` line of the hunk, if any.
    ///
    /// For a first hunk carrying preamble lines this skips past them.
    pub fn header(&self) -> Option<&'a str> {
        self.text
            .split('\n')
            .find(|line| line.starts_with(HUNK_MARKER))
    }

    /// Tagged lines of the hunk, in order.
    pub fn lines(&self) -> impl Iterator<Item = DiffLine<'a>> + 'a {
        self.text.split('\n').map(DiffLine::parse)
    }
}

impl fmt::Display for Hunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// One line of a hunk, tagged by its diff prefix.
///
/// File header lines (`+++`/`---`) are [`DiffLine::Other`] and never take
/// part in classification.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::parser::DiffLine;
///
/// assert_eq!(DiffLine::parse("+x"), DiffLine::Added("x"));
/// assert_eq!(DiffLine::parse("--- a/x.c"), DiffLine::Other("--- a/x.c"));
/// assert_eq!(DiffLine::parse(" ctx"), DiffLine::Context("ctx"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    /// Line with a single leading `+`; holds the content after it.
    Added(&'a str),
    /// Line with a single leading `-`; holds the content after it.
    Removed(&'a str),
    /// Anything else. A leading space is dropped from the content.
    Context(&'a str),
    /// `+++`/`---` file header lines, kept whole.
    Other(&'a str),
}

impl<'a> DiffLine<'a> {
    /// Tag a single line. Total over all input.
    pub fn parse(line: &'a str) -> Self {
        if line.starts_with("+++") || line.starts_with("---") {
            DiffLine::Other(line)
        } else if let Some(rest) = line.strip_prefix('+') {
            DiffLine::Added(rest)
        } else if let Some(rest) = line.strip_prefix('-') {
            DiffLine::Removed(rest)
        } else {
            DiffLine::Context(line.strip_prefix(' ').unwrap_or(line))
        }
    }
}

/// Split raw diff text into hunks.
///
/// A new hunk begins at every line starting with `@@`, except that lines
/// before the first marker are kept at the front of the first hunk. Input
/// without any marker becomes a single implicit hunk; empty input yields no
/// hunks. Joining the returned texts with `\n` reproduces the input.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::parser::segment_hunks;
///
/// let diff = "--- a/f.c\n+++ b/f.c\n@@ -1 +1 @@\n-a\n+b\n@@ -9 +9 @@\n-c\n+d\n";
/// let hunks = segment_hunks(diff);
/// assert_eq!(hunks.len(), 2);
/// assert!(hunks[0].text().starts_with("--- a/f.c"));
/// assert_eq!(hunks[1].text(), "@@ -9 +9 @@\n-c\n+d\n");
///
/// assert!(segment_hunks("").is_empty());
/// ```
pub fn segment_hunks(input: &str) -> Vec<Hunk<'_>> {
    if input.is_empty() {
        return Vec::new();
    }

    let mut starts = vec![0];
    let mut seen_marker = false;
    let mut offset = 0;
    for line in input.split('\n') {
        if line.starts_with(HUNK_MARKER) {
            // The first marker continues whatever preamble came before it.
            if seen_marker {
                starts.push(offset);
            }
            seen_marker = true;
        }
        offset += line.len() + 1;
    }

    let hunks: Vec<Hunk<'_>> = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).map_or(input.len(), |&next| next - 1);
            Hunk::new(&input[start..end])
        })
        .collect();

    tracing::trace!(hunks = hunks.len(), bytes = input.len(), "segmented diff");
    hunks
}
