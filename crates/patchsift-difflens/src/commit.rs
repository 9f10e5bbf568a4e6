//! Commit-level patch selection.
//!
//! Takes a commit as returned by a hosting API (message plus per-file patch
//! bodies), keeps the source files the configuration cares about, and
//! returns their patches with formatting-only hunks removed.

use std::path::Path;
use std::sync::LazyLock;

use patchsift_core::{CommitConfig, FilterConfig, PatchsiftError};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::DiffDocument;

static CVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CVE-\d{4}-\d{4,7}").expect("valid CVE regex"));
static CWE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CWE-\d+").expect("valid CWE regex"));

/// A commit in the shape of the GitHub "get a commit" response.
///
/// Unknown fields are ignored.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::commit::CommitPatch;
///
/// let json = r#"{
///     "sha": "abc123",
///     "commit": { "message": "Fix CVE-2021-1234" },
///     "files": [{ "filename": "src/a.c", "patch": "@@ -1 +1 @@\n-a\n+b" }]
/// }"#;
/// let commit = CommitPatch::from_json(json).unwrap();
/// assert_eq!(commit.message(), "Fix CVE-2021-1234");
/// assert_eq!(commit.files.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitPatch {
    /// Commit hash.
    #[serde(default)]
    pub sha: String,
    /// Commit metadata.
    #[serde(default)]
    pub commit: CommitMeta,
    /// Changed files.
    #[serde(default)]
    pub files: Vec<CommitFile>,
}

/// Commit metadata nested under `commit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitMeta {
    /// Full commit message.
    #[serde(default)]
    pub message: String,
}

/// One changed file of a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitFile {
    /// Repository-relative path.
    pub filename: String,
    /// Hunk body of the patch. Absent for binary or oversized files.
    #[serde(default)]
    pub patch: Option<String>,
}

impl CommitPatch {
    /// Decode a commit from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PatchsiftError::Serialization`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, PatchsiftError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The commit message.
    pub fn message(&self) -> &str {
        &self.commit.message
    }
}

/// Decides which files of a commit are classified and filters their patches.
///
/// # Examples
///
/// ```
/// use patchsift_core::PatchsiftConfig;
/// use patchsift_difflens::commit::PatchSelector;
///
/// let selector = PatchSelector::from_config(&PatchsiftConfig::default()).unwrap();
/// assert!(selector.is_source_file("src/net/http.c"));
/// assert!(!selector.is_source_file("README.md"));
/// assert!(selector.mentions_keyword("Fix Vuln in parser"));
/// ```
#[derive(Debug, Clone)]
pub struct PatchSelector {
    source_extensions: Vec<String>,
    skip_patterns: Vec<glob::Pattern>,
    keywords: Vec<String>,
}

impl PatchSelector {
    /// Build a selector from the `[filter]` and `[commit]` sections.
    ///
    /// # Errors
    ///
    /// Returns [`PatchsiftError::Parse`] if a skip pattern is not a valid glob.
    pub fn new(filter: &FilterConfig, commit: &CommitConfig) -> Result<Self, PatchsiftError> {
        let skip_patterns = filter
            .skip_patterns
            .iter()
            .map(|pat| {
                glob::Pattern::new(pat)
                    .map_err(|e| PatchsiftError::Parse(format!("invalid skip pattern {pat:?}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source_extensions: filter.source_extensions.clone(),
            skip_patterns,
            keywords: commit.keywords.clone(),
        })
    }

    /// Build a selector from a full configuration.
    ///
    /// # Errors
    ///
    /// See [`PatchSelector::new`].
    pub fn from_config(config: &patchsift_core::PatchsiftConfig) -> Result<Self, PatchsiftError> {
        Self::new(&config.filter, &config.commit)
    }

    /// Whether `path` has a source extension and matches no skip pattern.
    pub fn is_source_file(&self, path: &str) -> bool {
        let has_extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.source_extensions.iter().any(|s| s == ext));
        has_extension && !self.skip_patterns.iter().any(|p| p.matches(path))
    }

    /// Whether `message` contains any configured keyword (case-sensitive).
    pub fn mentions_keyword(&self, message: &str) -> bool {
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }

    /// Filter every selected file of `commit`.
    ///
    /// Files that are not source files, have no patch body, or reduce to
    /// formatting-only changes are left out. Each returned patch carries
    /// synthetic `--- a/` / `+++ b/` headers.
    pub fn select(&self, commit: &CommitPatch) -> Vec<SelectedPatch> {
        let mut selected = Vec::new();
        for file in &commit.files {
            if !self.is_source_file(&file.filename) {
                tracing::trace!(file = %file.filename, "not a source file");
                continue;
            }
            let Some(body) = file.patch.as_deref() else {
                tracing::debug!(file = %file.filename, "no patch body");
                continue;
            };
            let doc = DiffDocument::for_file(&file.filename, body);
            if let Some(patch) = doc.render_filtered() {
                selected.push(SelectedPatch {
                    filename: file.filename.clone(),
                    patch,
                });
            }
        }
        tracing::debug!(
            sha = %commit.sha,
            files = commit.files.len(),
            selected = selected.len(),
            "selected commit patches"
        );
        selected
    }
}

/// A file patch that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPatch {
    /// Repository-relative path.
    pub filename: String,
    /// Filtered patch under synthetic file headers.
    pub patch: String,
}

/// Pick the identifier a patch is filed under: the first CVE id, or failing
/// that the first CWE id.
///
/// # Examples
///
/// ```
/// use patchsift_difflens::commit::extract_identifier;
///
/// assert_eq!(
///     extract_identifier("CWE-787 fix, see CVE-2023-12345").as_deref(),
///     Some("CVE-2023-12345")
/// );
/// assert_eq!(extract_identifier("CWE-787 fix").as_deref(), Some("CWE-787"));
/// assert_eq!(extract_identifier("tidy up"), None);
/// ```
pub fn extract_identifier(text: &str) -> Option<String> {
    CVE_RE
        .find(text)
        .or_else(|| CWE_RE.find(text))
        .map(|m| m.as_str().to_string())
}
