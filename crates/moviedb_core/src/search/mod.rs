//! Full-text search helpers.
//!
//! # Responsibility
//! - Turn caller-supplied title text into FTS5 match expressions.
//! - Keep FTS5 syntax from leaking into repository callers.

pub mod title_match;
