//! Data types and algorithms
//!
//! - `branch`: branch names
//! - `checkout`: working tree migrations and the conflicts that block them
//! - `database`: entries recorded in trees
//! - `delta`: full-copy vs. patch storage of blob versions and chain replay
//! - `diff`: Myers line diff, hunks and tree-to-tree comparison
//! - `index`: staging index file format
//! - `log`: commit history traversal
//! - `merge`: merge base, three-way merge and conflict reporting
//! - `objects`: blobs, trees and commits
//! - `status`: working tree inspection

pub mod branch;
pub mod checkout;
pub mod database;
pub mod delta;
pub mod diff;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod status;
