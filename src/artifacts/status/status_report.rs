use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::index_entry::StageState;
use crate::artifacts::merge::merge_state::MergeState;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{FileChangeType, WorkspaceChangeType};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub type ChangeSet = BTreeMap<PathBuf, FileChangeType>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub branch: BranchName,
    /// `None` while the branch is unborn
    pub head: Option<ObjectId>,
    pub pending_merge: Option<MergeState>,
    /// Staged operations sorted by path
    pub staged: Vec<(PathBuf, StageState)>,
    /// Differences between disk and HEAD plus the staged operations
    pub unstaged: BTreeMap<PathBuf, WorkspaceChangeType>,
}

impl StatusReport {
    /// Nothing staged and nothing changed on disk; untracked files are allowed
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self
                .unstaged
                .values()
                .all(|change| *change == WorkspaceChangeType::Untracked)
    }

    pub fn index_changeset(&self) -> ChangeSet {
        self.staged
            .iter()
            .map(|(path, state)| (path.clone(), FileChangeType::Index(*state)))
            .collect()
    }

    pub fn workspace_changeset(&self) -> ChangeSet {
        self.unstaged
            .iter()
            .filter(|(_, change)| **change != WorkspaceChangeType::Untracked)
            .map(|(path, change)| (path.clone(), FileChangeType::Workspace(*change)))
            .collect()
    }

    pub fn untracked_files(&self) -> Vec<&PathBuf> {
        self.unstaged
            .iter()
            .filter(|(_, change)| **change == WorkspaceChangeType::Untracked)
            .map(|(path, _)| path)
            .collect()
    }
}
