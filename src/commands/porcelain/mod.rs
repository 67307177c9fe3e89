//! Porcelain operations
//!
//! ## Commands
//!
//! - `init`: create a repository
//! - `add`: stage and unstage paths
//! - `rm`: delete tracked files and stage their removal
//! - `status`: staged entries and working tree changes
//! - `commit`: record the staged snapshot
//! - `log`: commit history
//! - `diff`: changes between two commits
//! - `branch`: create, delete and list branches
//! - `switch`: move HEAD and the working tree to another branch
//! - `merge`: three-way merge of another branch into the active one
//! - `rollback`: forward commit restoring an earlier snapshot
//! - `show`: revisions and file content at a commit

pub mod add;
pub mod branch;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod merge;
pub mod rm;
pub mod rollback;
pub mod show;
pub mod status;
pub mod switch;
