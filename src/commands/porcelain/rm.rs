use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::{IndexEntry, StagedChange};
use crate::errors::GibleError;
use std::collections::BTreeSet;
use std::path::PathBuf;

impl Repository {
    /// Delete the tracked files at or below `paths` from the working tree and
    /// stage their removal. Nothing is touched when any path matches no
    /// tracked file. Returns the removed paths.
    pub async fn remove(&self, paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
        let _lock = self.lock().await?;
        let _worktree_lock = self.lock_worktree().await?;

        let head_tree = self.head_tree()?;
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let mut targets = BTreeSet::new();
        for path in paths {
            let path = self.workspace().relativize(path)?;
            let mut matched = head_tree.paths_under(&path).cloned().collect::<Vec<_>>();
            matched.extend(
                index
                    .entries_under_path(&path)
                    .into_iter()
                    .filter(|staged| head_tree.get(staged).is_none()),
            );

            if matched.is_empty() {
                return Err(GibleError::PathNotTracked(path).into());
            }
            targets.extend(matched);
        }

        for path in &targets {
            self.workspace().remove_file(path)?;

            if head_tree.get(path).is_some() {
                index.add(IndexEntry::new(path.clone(), StagedChange::Deleted));
            } else {
                // only a staged addition; forgetting it restores HEAD's view
                index.remove(path);
            }
            tracing::debug!(path = %path.display(), "removed tracked file");
        }

        index.write_updates()?;

        Ok(targets.into_iter().collect())
    }
}
