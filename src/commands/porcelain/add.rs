use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::{IndexEntry, StageState, StagedChange};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::tree::Tree;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

impl Repository {
    /// Stage every file at or below `paths`, including tracked files that were
    /// deleted from disk. Returns what staging did to each path.
    pub async fn stage(&self, paths: &[PathBuf]) -> anyhow::Result<Vec<(PathBuf, StageState)>> {
        let _lock = self.lock().await?;

        let head_tree = self.head_tree()?;
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let mut targets = BTreeSet::new();
        for path in paths {
            let path = self.workspace().relativize(path)?;
            targets.extend(self.workspace().list_files(Some(&path))?);
            targets.extend(head_tree.paths_under(&path).cloned());
            targets.extend(index.entries_under_path(&path));
        }

        let mut outcome = Vec::with_capacity(targets.len());
        for path in targets {
            if let Some(state) = self.stage_path(&mut index, &head_tree, &path)? {
                outcome.push((path, state));
            }
        }

        index.write_updates()?;

        Ok(outcome)
    }

    fn stage_path(
        &self,
        index: &mut Index,
        head_tree: &Tree,
        path: &Path,
    ) -> anyhow::Result<Option<StageState>> {
        let head_entry = head_tree.get(path);

        if !self.workspace().is_file(path) {
            return match head_entry {
                Some(_) => {
                    index.add(IndexEntry::new(path.to_path_buf(), StagedChange::Deleted));
                    Ok(Some(StageState::Deleted))
                }
                // neither on disk nor tracked; drop a stale addition if any
                None => Ok(index.remove(path).map(|_| StageState::Unchanged)),
            };
        }

        let content = self.workspace().read_file(path)?;
        let mode = self.workspace().file_mode(path);
        let oid = Blob::new(content.clone()).object_id()?;

        if head_entry.is_some_and(|entry| entry.oid == oid && entry.mode == mode) {
            index.remove(path);
            return Ok(Some(StageState::Unchanged));
        }

        // the latest version of the path is the best base for a patch
        let prior = index
            .entry_by_path(path)
            .and_then(IndexEntry::database_entry)
            .or(head_entry)
            .map(|entry| entry.oid.clone());
        let (oid, decision) = self
            .delta()
            .store_blob(self.database(), content, prior.as_ref())?;
        tracing::debug!(path = %path.display(), %oid, ?decision, "staged blob");

        let entry = DatabaseEntry::new(oid, mode);
        let (change, state) = match head_entry {
            Some(_) => (StagedChange::Modified(entry), StageState::Modified),
            None => (StagedChange::Added(entry), StageState::Added),
        };
        index.add(IndexEntry::new(path.to_path_buf(), change));

        Ok(Some(state))
    }

    /// Drop pending entries at or below `paths`; returns the unstaged paths
    pub async fn unstage(&self, paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
        let _lock = self.lock().await?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let mut removed = BTreeSet::new();
        for path in paths {
            let path = self.workspace().relativize(path)?;
            for staged in index.entries_under_path(&path) {
                index.remove(&staged);
                removed.insert(staged);
            }
        }

        index.write_updates()?;

        Ok(removed.into_iter().collect())
    }
}
