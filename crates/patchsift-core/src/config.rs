use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PatchsiftError;

/// Top-level configuration loaded from `.patchsift.toml`.
///
/// Resolution order: `--config` flag, then `.patchsift.toml` in the working
/// directory, then defaults.
///
/// # Examples
///
/// ```
/// use patchsift_core::PatchsiftConfig;
///
/// let config = PatchsiftConfig::default();
/// assert_eq!(config.filter.source_extensions, vec!["c", "cpp"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchsiftConfig {
    /// Which files of a patch are worth classifying.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Commit message screening.
    #[serde(default)]
    pub commit: CommitConfig,
    /// Batch processing settings.
    #[serde(default)]
    pub batch: BatchConfig,
}

impl PatchsiftConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PatchsiftError::FileNotFound`] if `path` does not exist,
    /// [`PatchsiftError::Io`] if it cannot be read, or
    /// [`PatchsiftError::Toml`] / [`PatchsiftError::Config`] if the content
    /// is invalid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use patchsift_core::PatchsiftConfig;
    /// use std::path::Path;
    ///
    /// let config = PatchsiftConfig::from_file(Path::new(".patchsift.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, PatchsiftError> {
        if !path.exists() {
            return Err(PatchsiftError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`PatchsiftError::Toml`] if parsing fails, or
    /// [`PatchsiftError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use patchsift_core::PatchsiftConfig;
    ///
    /// let toml = r#"
    /// [filter]
    /// source_extensions = ["c", "h"]
    /// "#;
    /// let config = PatchsiftConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.filter.source_extensions, vec!["c", "h"]);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, PatchsiftError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), PatchsiftError> {
        if self.batch.workers == Some(0) {
            return Err(PatchsiftError::Config(
                "batch.workers must be at least 1".into(),
            ));
        }
        if self.filter.source_extensions.iter().any(|e| e.starts_with('.')) {
            return Err(PatchsiftError::Config(
                "filter.source_extensions entries must not start with '.'".into(),
            ));
        }
        Ok(())
    }
}

/// Which files of a multi-file patch get classified at all.
///
/// # Examples
///
/// ```
/// use patchsift_core::FilterConfig;
///
/// let config = FilterConfig::default();
/// assert!(config.skip_patterns.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// File extensions (without the dot) treated as source files.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    /// Glob patterns for paths to leave out, e.g. `"tests/*"`.
    #[serde(default)]
    pub skip_patterns: Vec<String>,
}

fn default_source_extensions() -> Vec<String> {
    vec!["c".into(), "cpp".into()]
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            source_extensions: default_source_extensions(),
            skip_patterns: Vec::new(),
        }
    }
}

/// Commit message screening.
///
/// # Examples
///
/// ```
/// use patchsift_core::CommitConfig;
///
/// let config = CommitConfig::default();
/// assert!(config.keywords.contains(&"CVE".to_string()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
    /// Case-sensitive substrings that mark a commit as security relevant.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

fn default_keywords() -> Vec<String> {
    vec![
        "CVE".into(),
        "Vuln".into(),
        "Vulnerability".into(),
        "CWE".into(),
    ]
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
        }
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of concurrent workers. Defaults to the available parallelism
    /// minus one.
    pub workers: Option<usize>,
}

impl BatchConfig {
    /// Resolve the configured worker count, never returning zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use patchsift_core::BatchConfig;
    ///
    /// let config = BatchConfig { workers: Some(3) };
    /// assert_eq!(config.effective_workers(), 3);
    /// assert!(BatchConfig::default().effective_workers() >= 1);
    /// ```
    pub fn effective_workers(&self) -> usize {
        match self.workers {
            Some(n) => n.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1))
                .unwrap_or(1)
                .max(1),
        }
    }
}
