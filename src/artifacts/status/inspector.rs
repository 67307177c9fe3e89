use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::StagedChange;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Compares files on disk with the state they are expected to have.
///
/// The expected state of a path is its staged entry when one exists, and its
/// entry in HEAD's tree otherwise.
#[derive(new)]
pub struct Inspector<'w> {
    workspace: &'w Workspace,
}

impl<'w> Inspector<'w> {
    /// HEAD's tree with the staged operations applied on top
    pub fn expected_tree(head_tree: &Tree, index: &Index) -> Tree {
        let mut expected = head_tree.clone();

        for entry in index.entries() {
            match &entry.change {
                StagedChange::Added(db_entry) | StagedChange::Modified(db_entry) => {
                    expected.insert(entry.path.clone(), db_entry.clone());
                }
                StagedChange::Deleted => {
                    expected.remove(&entry.path);
                }
            }
        }

        expected
    }

    pub fn is_content_changed(&self, path: &Path, expected: &DatabaseEntry) -> anyhow::Result<bool> {
        let blob = Blob::new(self.workspace.read_file(path)?);

        Ok(blob.object_id()? != expected.oid)
    }

    pub fn check_workspace_against(
        &self,
        path: &Path,
        expected: Option<&DatabaseEntry>,
    ) -> anyhow::Result<WorkspaceChangeType> {
        let on_disk = self.workspace.is_file(path);

        match (expected, on_disk) {
            (None, true) => Ok(WorkspaceChangeType::Untracked),
            (None, false) => Ok(WorkspaceChangeType::None),
            (Some(_), false) => Ok(WorkspaceChangeType::Deleted),
            (Some(expected), true) if self.workspace.file_mode(path) != expected.mode => {
                Ok(WorkspaceChangeType::Modified)
            }
            (Some(expected), true) if self.is_content_changed(path, expected)? => {
                Ok(WorkspaceChangeType::Modified)
            }
            _ => Ok(WorkspaceChangeType::None),
        }
    }

    /// Every path whose file on disk differs from `expected`, with the kind of difference
    pub fn workspace_changes(
        &self,
        expected: &Tree,
    ) -> anyhow::Result<BTreeMap<PathBuf, WorkspaceChangeType>> {
        let paths = self
            .workspace
            .list_files(None)?
            .into_iter()
            .chain(expected.entries().keys().cloned())
            .collect::<BTreeSet<_>>();

        let mut changes = BTreeMap::new();
        for path in paths {
            let change = self.check_workspace_against(&path, expected.get(&path))?;
            if change != WorkspaceChangeType::None {
                changes.insert(path, change);
            }
        }

        Ok(changes)
    }

    /// Whether a directory holds any file `tracked` does not know about
    pub fn has_untracked_files(&self, dir: &Path, tracked: &Tree) -> anyhow::Result<bool> {
        Ok(self
            .workspace
            .list_files(Some(dir))?
            .iter()
            .any(|path| tracked.get(path).is_none()))
    }
}
