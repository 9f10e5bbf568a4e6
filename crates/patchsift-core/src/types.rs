use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of classifying a single hunk, with the rule that decided it.
///
/// Only [`Verdict::NoSubstantiveChange`] and [`Verdict::WhitespaceOnly`] mark
/// a hunk as formatting-only.
///
/// # Examples
///
/// ```
/// use patchsift_core::Verdict;
///
/// let v = Verdict::CountMismatch { added: 2, removed: 1 };
/// assert!(!v.is_formatting_only());
/// assert!(Verdict::WhitespaceOnly { pairs: 3 }.is_formatting_only());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Verdict {
    /// The hunk has no non-blank added or removed lines.
    NoSubstantiveChange,
    /// Every added line equals the removed line at the same position once
    /// whitespace is stripped, and the counts agree.
    WhitespaceOnly {
        /// Number of compared line pairs.
        pairs: usize,
    },
    /// The pair at `index` differs after whitespace is stripped.
    ContentMismatch {
        /// Zero-based position in the added/removed sequences.
        index: usize,
    },
    /// All compared pairs matched, but one side has extra lines.
    CountMismatch {
        /// Non-blank added lines.
        added: usize,
        /// Non-blank removed lines.
        removed: usize,
    },
}

impl Verdict {
    /// Returns `true` if the hunk carries no semantic change.
    pub fn is_formatting_only(self) -> bool {
        matches!(
            self,
            Verdict::NoSubstantiveChange | Verdict::WhitespaceOnly { .. }
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::NoSubstantiveChange => write!(f, "formatting only (no substantive lines)"),
            Verdict::WhitespaceOnly { pairs } => {
                write!(f, "formatting only ({pairs} whitespace-equal pairs)")
            }
            Verdict::ContentMismatch { index } => {
                write!(f, "semantic (line pair {index} differs)")
            }
            Verdict::CountMismatch { added, removed } => {
                write!(f, "semantic ({added} added vs {removed} removed)")
            }
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use patchsift_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain diff text or human-readable summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
