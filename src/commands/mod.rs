//! Repository operations
//!
//! Every operation is an `impl Repository` block in its own module:
//!
//! - `plumbing`: direct access to stored objects (materializing a blob)
//! - `porcelain`: the user-facing workflow (stage, commit, branch, merge, ...)
//!
//! Mutating operations take the repository lock for their whole duration;
//! operations that rewrite the working tree take the working-tree lock too.

pub mod plumbing;
pub mod porcelain;
