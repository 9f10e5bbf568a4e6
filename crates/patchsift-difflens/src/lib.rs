//! Hunk segmentation, whitespace-insensitive classification, and formatting
//! noise removal for unified diffs.
//!
//! The pipeline is a pure function from diff text to diff text:
//! [`parser::segment_hunks`] splits the input, [`classify::classify_hunk`]
//! decides per hunk whether only whitespace changed, and
//! [`filter::strip_formatting_changes`] reassembles the hunks that carry a
//! real change. Every step is total and safe to call from any number of
//! threads at once.

pub mod classify;
pub mod commit;
pub mod document;
pub mod filter;
pub mod normalize;
pub mod parser;

pub use filter::strip_formatting_changes;
