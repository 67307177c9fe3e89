//! Working tree migration between two trees
//!
//! A migration is planned from the diff between the tree the working tree
//! currently reflects and the target tree. Planning is pure; conflicts with
//! local state are detected separately so callers can refuse before touching
//! any file, and the workspace applies the plan.
//!
//! ## Conflict Detection
//!
//! - Staged changes: the staging index must be empty
//! - Stale files: a tracked file differs from the current tree on disk
//! - Stale directories: a directory holding untracked files is in the way of a file
//! - Untracked overwrites: an untracked file would be replaced

use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::checkout::conflict::{ConflictType, ConflictsSet};
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::diff::tree_diff::{TreeChangeType, TreeDiff};
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use crate::artifacts::status::inspector::Inspector;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Type of file system action required by a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    /// Create new file
    Add,
    /// Delete file
    Delete,
    /// Modify existing file
    Modify,
}

pub type ActionsSet = BTreeMap<ActionType, Vec<(PathBuf, Option<DatabaseEntry>)>>;

#[derive(Debug, Clone, Default)]
pub struct Migration {
    actions: ActionsSet,
    /// Directories that may be left empty by deletions
    rmdirs: BTreeSet<PathBuf>,
}

impl Migration {
    pub fn plan(tree_diff: &TreeDiff) -> Self {
        let mut migration = Migration::default();

        for (path, change) in tree_diff.changes() {
            migration.record_change(path, change);
        }

        migration
    }

    pub fn actions(&self, action_type: ActionType) -> &[(PathBuf, Option<DatabaseEntry>)] {
        self.actions
            .get(&action_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn rmdirs(&self) -> &BTreeSet<PathBuf> {
        &self.rmdirs
    }

    pub fn is_empty(&self) -> bool {
        self.actions.values().all(Vec::is_empty)
    }

    fn record_change(&mut self, path: &Path, change: &TreeChangeType) {
        let (action_type, target) = match change {
            TreeChangeType::Added(new) => (ActionType::Add, Some(new.clone())),
            TreeChangeType::Deleted(_) => {
                self.rmdirs.extend(
                    path.ancestors()
                        .skip(1)
                        .filter(|ancestor| !ancestor.as_os_str().is_empty())
                        .map(Path::to_path_buf),
                );
                (ActionType::Delete, None)
            }
            TreeChangeType::Modified { new, .. } => (ActionType::Modify, Some(new.clone())),
        };

        self.actions
            .entry(action_type)
            .or_default()
            .push((path.to_path_buf(), target));
    }

    /// Everything that makes applying this migration unsafe for the working
    /// tree, which is expected to reflect `current` plus the staged `index`.
    pub fn detect_conflicts(
        &self,
        workspace: &Workspace,
        index: &Index,
        current: &Tree,
    ) -> anyhow::Result<ConflictsSet> {
        let inspector = Inspector::new(workspace);
        let mut conflicts = ConflictsSet::new();

        let staged = index.entries().map(|entry| entry.path.clone()).collect::<Vec<_>>();
        if !staged.is_empty() {
            conflicts.insert(ConflictType::StagedChanges, staged);
        }

        for (path, change) in inspector.workspace_changes(current)? {
            if matches!(change, WorkspaceChangeType::Modified | WorkspaceChangeType::Deleted) {
                conflicts.entry(ConflictType::StaleFile).or_default().push(path);
            }
        }

        for action_type in [ActionType::Add, ActionType::Modify] {
            for (path, target) in self.actions(action_type) {
                self.check_target_path(&inspector, workspace, current, path, target.as_ref(), &mut conflicts)?;
            }
        }

        for paths in conflicts.values_mut() {
            paths.sort();
            paths.dedup();
        }

        Ok(conflicts)
    }

    fn check_target_path(
        &self,
        inspector: &Inspector,
        workspace: &Workspace,
        current: &Tree,
        path: &Path,
        target: Option<&DatabaseEntry>,
        conflicts: &mut ConflictsSet,
    ) -> anyhow::Result<()> {
        if workspace.is_dir(path) {
            if inspector.has_untracked_files(path, current)? {
                conflicts
                    .entry(ConflictType::StaleDirectory)
                    .or_default()
                    .push(path.to_path_buf());
            }
        } else if current.get(path).is_none()
            && workspace.is_file(path)
            && inspector.check_workspace_against(path, target)? != WorkspaceChangeType::None
        {
            conflicts
                .entry(ConflictType::UntrackedOverwritten)
                .or_default()
                .push(path.to_path_buf());
        }

        // an untracked file where the target needs a directory
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            if workspace.is_file(ancestor) && current.get(ancestor).is_none() {
                conflicts
                    .entry(ConflictType::UntrackedOverwritten)
                    .or_default()
                    .push(ancestor.to_path_buf());
            }
        }

        Ok(())
    }
}
