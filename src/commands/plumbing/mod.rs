//! Plumbing operations
//!
//! - `cat-file`: full content of a stored blob, replaying its delta chain

pub mod cat_file;
