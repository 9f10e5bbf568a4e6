//! Core types, configuration, and error handling for patchsift.
//!
//! This crate provides the shared foundation used by the other patchsift crates:
//! - [`PatchsiftError`]: unified error type using `thiserror` and `miette`
//! - [`PatchsiftConfig`]: configuration loaded from `.patchsift.toml`
//! - Shared types: [`Verdict`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{BatchConfig, CommitConfig, FilterConfig, PatchsiftConfig};
pub use error::PatchsiftError;
pub use types::{OutputFormat, Verdict};

/// A convenience `Result` type for patchsift operations.
pub type Result<T> = std::result::Result<T, PatchsiftError>;
