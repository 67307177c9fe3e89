use crate::artifacts::merge::tree_merge::ConflictKind;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use std::path::PathBuf;

/// What `merge` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The source tip is HEAD or one of its ancestors
    AlreadyUpToDate,
    /// The branch pointer moved to the source tip without a merge commit;
    /// `from` is `None` when the branch was unborn
    FastForward { from: Option<ObjectId>, to: ObjectId },
    /// A two-parent merge commit was created
    Merged { commit: ObjectId },
    /// Nothing was committed; the paths below await resolution
    Conflicted { conflicts: Vec<Conflict> },
}

impl MergeOutcome {
    pub fn conflicted_paths(&self) -> Vec<PathBuf> {
        match self {
            MergeOutcome::Conflicted { conflicts } => {
                conflicts.iter().map(|conflict| conflict.path.clone()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// A path the merge could not decide, with the three versions involved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub path: PathBuf,
    pub kind: ConflictKind,
    pub base: Option<Bytes>,
    pub ours: Option<Bytes>,
    pub theirs: Option<Bytes>,
    /// Content written to the working tree with conflict markers; `None` for
    /// binary files, which keep one side as is
    pub marked: Option<String>,
}
