use crate::areas::repository::Repository;
use crate::artifacts::diff::file_diff::FileDiff;
use crate::artifacts::diff::tree_diff::{DiffFilter, TreeDiff};
use std::path::{Path, PathBuf};

impl Repository {
    /// Changes from `rev_a` to `rev_b`, optionally restricted to `path` and below
    pub async fn diff(&self, rev_a: &str, rev_b: &str, path: Option<&Path>) -> anyhow::Result<Vec<FileDiff>> {
        self.diff_filtered(rev_a, rev_b, path, DiffFilter::default()).await
    }

    /// Like [`Repository::diff`], keeping only the change kinds in `filter`
    pub async fn diff_filtered(
        &self,
        rev_a: &str,
        rev_b: &str,
        path: Option<&Path>,
        filter: DiffFilter,
    ) -> anyhow::Result<Vec<FileDiff>> {
        let old_tree = self.commit_tree(&self.resolve(rev_a).await?)?;
        let new_tree = self.commit_tree(&self.resolve(rev_b).await?)?;
        let prefix = match path {
            Some(path) => self.workspace().relativize(path)?,
            None => PathBuf::new(),
        };

        let mut tree_diff = TreeDiff::new();
        tree_diff.compare_trees(&old_tree, &new_tree, &prefix, filter);

        let mut diffs = Vec::with_capacity(tree_diff.changes().len());
        for (path, change) in tree_diff.into_changes() {
            let old = self.load_entry(change.old_entry())?.unwrap_or_default();
            let new = self.load_entry(change.new_entry())?.unwrap_or_default();
            let binary = self.is_binary(&old) || self.is_binary(&new);

            diffs.push(FileDiff::build(path, change, &old, &new, binary));
        }

        Ok(diffs)
    }
}
