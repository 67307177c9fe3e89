//! Diff algorithms and tree comparison
//!
//! - `diff_algorithm`: Myers' diff for line-by-line comparison
//! - `hunk`: grouping of an edit script into unified-diff hunks
//! - `tree_diff`: path-level comparison of two snapshots
//! - `file_diff`: per-file result of comparing two revisions

pub mod diff_algorithm;
pub mod file_diff;
pub mod hunk;
pub mod tree_diff;
