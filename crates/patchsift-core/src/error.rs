use std::path::PathBuf;

/// Errors raised at the edges of patchsift: reading input, loading
/// configuration, and decoding commit payloads.
///
/// The classification core itself is total and never produces one of these.
/// Library crates return this type directly; the binary reports it through
/// `miette`.
///
/// # Examples
///
/// ```
/// use patchsift_core::PatchsiftError;
///
/// let err = PatchsiftError::Config("workers must be at least 1".into());
/// assert!(err.to_string().contains("workers must be at least 1"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PatchsiftError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(patchsift::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(patchsift::config),
        help("check the values in your .patchsift.toml")
    )]
    Config(String),

    /// Input that could not be interpreted, e.g. a malformed skip pattern.
    #[error("parse error: {0}")]
    #[diagnostic(code(patchsift::parse))]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(patchsift::json))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(patchsift::toml))]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(patchsift::not_found))]
    FileNotFound(PathBuf),
}
