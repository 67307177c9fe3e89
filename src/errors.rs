//! Error kinds reported by repository operations.
//!
//! Operations return `anyhow::Result` so context can be attached on the way up;
//! callers that need to react to a specific failure downcast to [`GibleError`]:
//!
//! ```rust,ignore
//! match repository.commit("msg").await {
//!     Err(e) if matches!(e.downcast_ref(), Some(GibleError::EmptyCommit)) => { /* ... */ }
//!     other => { /* ... */ }
//! }
//! ```

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GibleError {
    /// The requested object id is not present in the store.
    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    /// A delta chain could not be replayed into the content it claims to produce.
    #[error("corrupt delta chain for {oid}: {reason}")]
    CorruptChain { oid: ObjectId, reason: String },

    #[error("nothing to commit, the staging index is empty")]
    EmptyCommit,

    #[error("a branch named '{0}' already exists")]
    DuplicateBranch(String),

    #[error("branch '{0}' does not exist")]
    UnknownBranch(String),

    #[error("invalid branch name '{0}'")]
    InvalidBranchName(String),

    #[error("cannot delete branch '{0}' while it is checked out")]
    ActiveBranch(String),

    /// The active branch has no commit yet.
    #[error("branch '{0}' has no commits yet")]
    UnbornHead(String),

    /// Pending staged changes or unstaged modifications block the operation.
    #[error("working tree has uncommitted changes:\n{}", format_paths(.0))]
    DirtyWorkingTree(Vec<PathBuf>),

    #[error("refusing to merge unrelated histories")]
    UnrelatedHistory,

    #[error("timed out after {timeout:?} waiting for lock {}", path.display())]
    LockTimeout { path: PathBuf, timeout: Duration },

    /// A merge stopped with conflicts; the working tree holds the marked files.
    #[error("merge stopped with conflicts in:\n{}", format_paths(.0))]
    MergeConflict(Vec<PathBuf>),

    #[error("a merge is in progress; resolve and commit, or abort it first")]
    MergeInProgress,

    #[error("not a gible repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("pathspec '{}' did not match any tracked file", .0.display())]
    PathNotTracked(PathBuf),

    #[error("unknown revision '{0}'")]
    UnknownRevision(String),

    #[error("revision '{prefix}' is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousRevision {
        prefix: String,
        candidates: Vec<String>,
    },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("\t{}", path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

impl GibleError {
    /// Shortcut used by callers that only care about the kind of failure.
    pub fn kind_of(error: &anyhow::Error) -> Option<&GibleError> {
        error.downcast_ref::<GibleError>()
    }
}
