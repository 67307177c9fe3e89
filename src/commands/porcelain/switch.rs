use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::conflict::ensure_no_conflicts;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::diff::tree_diff::{DiffFilter, TreeDiff};
use crate::artifacts::objects::tree::Tree;
use crate::errors::GibleError;
use std::path::Path;

impl Repository {
    /// Make `name` the active branch, migrating the working tree to its
    /// snapshot. Returns `false` when the branch was already active.
    pub async fn switch_branch(&self, name: &str) -> anyhow::Result<bool> {
        let branch_name = BranchName::try_parse(name)?;
        let _lock = self.lock().await?;
        let _worktree_lock = self.lock_worktree().await?;

        if !self.refs().branch_exists(&branch_name) {
            return Err(GibleError::UnknownBranch(branch_name.to_string()).into());
        }
        self.ensure_no_pending_merge()?;

        if self.refs().is_current_branch(&branch_name)? {
            return Ok(false);
        }

        let current_tree = self.head_tree()?;
        let target_tree = match self.refs().read_branch(&branch_name)? {
            Some(oid) => self.commit_tree(&oid)?,
            None => Tree::default(),
        };

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let migration = self.plan_migration(&index, &current_tree, &target_tree)?;
        self.apply_migration(&migration)?;
        self.refs().set_head(&branch_name)?;

        Ok(true)
    }

    /// Migration from `current` to `target`, refused when the working tree is
    /// not clean or when applying it would overwrite untracked files
    pub(crate) fn plan_migration(&self, index: &Index, current: &Tree, target: &Tree) -> anyhow::Result<Migration> {
        let mut tree_diff = TreeDiff::new();
        tree_diff.compare_trees(current, target, Path::new(""), DiffFilter::default());

        let migration = Migration::plan(&tree_diff);
        let conflicts = migration.detect_conflicts(self.workspace(), index, current)?;
        ensure_no_conflicts(&conflicts)?;

        Ok(migration)
    }

    pub(crate) fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        self.workspace()
            .apply_migration(migration, |oid| self.load_blob(oid))
    }
}
