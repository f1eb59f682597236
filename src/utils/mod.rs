//! Utility functions and helpers

pub mod pattern;
pub mod text;

pub use pattern::{glob_match, glob_regex, sanitize};
pub use text::normalize_newlines;
