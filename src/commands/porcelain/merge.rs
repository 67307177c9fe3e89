use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::diff::tree_diff::{DiffFilter, TreeChangeType, TreeDiff};
use crate::artifacts::index::index_entry::{IndexEntry, StagedChange};
use crate::artifacts::merge::bca_finder::BCAFinder;
use crate::artifacts::merge::merge_state::MergeState;
use crate::artifacts::merge::outcome::{Conflict, MergeOutcome};
use crate::artifacts::merge::three_way;
use crate::artifacts::merge::tree_merge::{ConflictKind, PathConflict, TreeMerge};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::GibleError;
use bytes::Bytes;
use std::path::Path;

/// Content written to the working tree for one conflicted path
struct Resolution {
    conflict: Conflict,
    content: Bytes,
    entry: DatabaseEntry,
}

impl Repository {
    /// Merge branch `source` into the active branch.
    ///
    /// Conflicts are a result, not an error: the clean part of the merge is
    /// applied and staged, conflicted files are written with markers and the
    /// merge waits for `commit` (or `merge_abort`).
    pub async fn merge(&self, source: &str, message: Option<&str>) -> anyhow::Result<MergeOutcome> {
        let source_branch = BranchName::try_parse(source)?;
        let _lock = self.lock().await?;
        let _worktree_lock = self.lock_worktree().await?;

        if !self.refs().branch_exists(&source_branch) {
            return Err(GibleError::UnknownBranch(source_branch.to_string()).into());
        }
        self.ensure_no_pending_merge()?;

        let source_oid = self
            .refs()
            .read_branch(&source_branch)?
            .ok_or_else(|| GibleError::UnbornHead(source_branch.to_string()))?;
        let target_branch = self.refs().current_branch()?;
        let head = self.refs().read_head()?;
        let head_tree = self.head_tree()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        // staged entries and unstaged edits block every kind of merge
        self.plan_migration(&index, &head_tree, &head_tree)?;

        let Some(head_oid) = head else {
            return self.fast_forward(&index, &head_tree, None, source_oid);
        };

        if self.commits().is_ancestor(&source_oid, &head_oid)? {
            tracing::info!(source = %source_branch, "already up to date");
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let base_oid = self.ancestor_path(&head_oid, &source_oid).await?;
        if base_oid == head_oid {
            return self.fast_forward(&index, &head_tree, Some(head_oid), source_oid);
        }

        tracing::info!(
            source = %source_branch,
            target = %target_branch,
            base = %base_oid.to_short_oid(),
            "three-way merge"
        );

        let base_tree = self.commit_tree(&base_oid)?;
        let source_tree = self.commit_tree(&source_oid)?;
        let mut tree_merge = TreeMerge::classify(&base_tree, &head_tree, &source_tree);
        if self.config().merge.auto_resolve_text {
            self.auto_resolve(&mut tree_merge)?;
        }

        if tree_merge.conflicts.is_empty() {
            let message = match message {
                Some(message) => message.trim().to_string(),
                None => format!("Merge branch '{source_branch}' into {target_branch}"),
            };
            let commit = self.merge_clean(&index, &head_tree, &tree_merge.merged, vec![head_oid, source_oid], message)?;
            return Ok(MergeOutcome::Merged { commit });
        }

        let conflicts = self.merge_conflicted(
            &mut index,
            &head_tree,
            tree_merge,
            target_branch.as_ref(),
            source_branch.as_ref(),
        )?;
        MergeState {
            source_oid,
            source_branch,
            conflicts: conflicts.iter().map(|conflict| conflict.path.clone()).collect(),
        }
        .save(&self.metadata_path())?;

        Ok(MergeOutcome::Conflicted { conflicts })
    }

    /// Best common ancestor of two commits
    pub async fn ancestor_path(&self, a: &ObjectId, b: &ObjectId) -> anyhow::Result<ObjectId> {
        BCAFinder::new(|oid: &ObjectId| self.commits().load_slim(oid))
            .find_best_common_ancestor(a, b)?
            .ok_or_else(|| GibleError::UnrelatedHistory.into())
    }

    /// Discard a conflicted merge: the index, the merge state and every file
    /// the merge touched go back to HEAD
    pub async fn merge_abort(&self) -> anyhow::Result<()> {
        let _lock = self.lock().await?;
        let _worktree_lock = self.lock_worktree().await?;

        let Some(merge_state) = self.pending_merge()? else {
            anyhow::bail!("there is no merge to abort");
        };

        let head_tree = self.head_tree()?;
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let mut merged = Inspector::expected_tree(&head_tree, &index);
        for path in &merge_state.conflicts {
            merged.remove(path);
            if self.workspace().is_file(path) {
                self.workspace().remove_file(path)?;
            }
        }

        let mut tree_diff = TreeDiff::new();
        tree_diff.compare_trees(&merged, &head_tree, Path::new(""), DiffFilter::default());
        self.apply_migration(&Migration::plan(&tree_diff))?;

        index.clear();
        index.write_updates()?;
        MergeState::clear(&self.metadata_path())?;
        tracing::info!(source = %merge_state.source_branch, "merge aborted");

        Ok(())
    }

    fn fast_forward(
        &self,
        index: &Index,
        head_tree: &Tree,
        from: Option<ObjectId>,
        to: ObjectId,
    ) -> anyhow::Result<MergeOutcome> {
        let target_tree = self.commit_tree(&to)?;
        let migration = self.plan_migration(index, head_tree, &target_tree)?;

        self.refs().update_head(&to)?;
        self.apply_migration(&migration)?;
        tracing::info!(to = %to.to_short_oid(), "fast-forward");

        Ok(MergeOutcome::FastForward { from, to })
    }

    fn merge_clean(
        &self,
        index: &Index,
        head_tree: &Tree,
        merged: &Tree,
        parents: Vec<ObjectId>,
        message: String,
    ) -> anyhow::Result<ObjectId> {
        let migration = self.plan_migration(index, head_tree, merged)?;

        let tree_oid = self.database().store(merged)?;
        let commit = Commit::new(parents, tree_oid, self.config().author(), message);
        let summary = self.record_commit(&commit)?;

        self.apply_migration(&migration)?;

        Ok(summary.oid)
    }

    /// Replace text conflicts whose regions do not overlap with their merge
    fn auto_resolve(&self, tree_merge: &mut TreeMerge) -> anyhow::Result<()> {
        let mut remaining = Vec::with_capacity(tree_merge.conflicts.len());

        for conflict in std::mem::take(&mut tree_merge.conflicts) {
            let (Some(base), Some(ours), Some(theirs)) = (&conflict.base, &conflict.ours, &conflict.theirs) else {
                remaining.push(conflict);
                continue;
            };
            let mode = if ours.mode == theirs.mode || theirs.mode == base.mode {
                ours.mode
            } else if ours.mode == base.mode {
                theirs.mode
            } else {
                remaining.push(conflict);
                continue;
            };

            let base_content = self.load_blob(&base.oid)?;
            let ours_content = self.load_blob(&ours.oid)?;
            let theirs_content = self.load_blob(&theirs.oid)?;
            if [&base_content, &ours_content, &theirs_content]
                .into_iter()
                .any(|content| self.is_binary(content))
            {
                remaining.push(conflict);
                continue;
            }

            let text_merge = three_way::merge(&base_content, &ours_content, &theirs_content, "ours", "theirs");
            if !text_merge.is_clean() {
                remaining.push(conflict);
                continue;
            }

            let (oid, _) = self
                .delta()
                .store_blob(self.database(), Bytes::from(text_merge.content), Some(&ours.oid))?;
            tracing::debug!(path = %conflict.path.display(), "merged text automatically");
            tree_merge.merged.insert(conflict.path, DatabaseEntry::new(oid, mode));
        }

        tree_merge.conflicts = remaining;
        Ok(())
    }

    /// Apply and stage the clean part of the merge, write every conflicted
    /// file with markers (or one side, for binaries)
    fn merge_conflicted(
        &self,
        index: &mut Index,
        head_tree: &Tree,
        tree_merge: TreeMerge,
        ours_label: &str,
        theirs_label: &str,
    ) -> anyhow::Result<Vec<Conflict>> {
        let mut resolutions = Vec::with_capacity(tree_merge.conflicts.len());
        for path_conflict in &tree_merge.conflicts {
            resolutions.push(self.resolve_conflict(path_conflict, ours_label, theirs_label)?);
        }

        // conflicted paths keep our entry so the migration leaves them alone;
        // paths only on their side are checked against their entry
        let mut clean_target = tree_merge.merged.clone();
        let mut checked_target = tree_merge.merged;
        for resolution in &resolutions {
            let path = &resolution.conflict.path;
            match head_tree.get(path) {
                Some(entry) => {
                    clean_target.insert(path.clone(), entry.clone());
                    checked_target.insert(path.clone(), entry.clone());
                }
                None => checked_target.insert(path.clone(), resolution.entry.clone()),
            }
        }
        self.plan_migration(index, head_tree, &checked_target)?;

        let mut tree_diff = TreeDiff::new();
        tree_diff.compare_trees(head_tree, &clean_target, Path::new(""), DiffFilter::default());
        let migration = Migration::plan(&tree_diff);
        self.apply_migration(&migration)?;

        for (path, change) in tree_diff.into_changes() {
            let change = match change {
                TreeChangeType::Added(entry) => StagedChange::Added(entry),
                TreeChangeType::Modified { new, .. } => StagedChange::Modified(new),
                TreeChangeType::Deleted(_) => StagedChange::Deleted,
            };
            index.add(IndexEntry::new(path, change));
        }
        index.write_updates()?;

        let mut conflicts = Vec::with_capacity(resolutions.len());
        for resolution in resolutions {
            let path = &resolution.conflict.path;
            self.workspace()
                .write_file(path, &resolution.content, resolution.entry.mode)?;
            tracing::warn!(path = %path.display(), kind = %resolution.conflict.kind, "merge conflict");
            conflicts.push(resolution.conflict);
        }

        Ok(conflicts)
    }

    fn resolve_conflict(
        &self,
        path_conflict: &PathConflict,
        ours_label: &str,
        theirs_label: &str,
    ) -> anyhow::Result<Resolution> {
        let base = self.load_entry(path_conflict.base.as_ref())?;
        let ours = self.load_entry(path_conflict.ours.as_ref())?;
        let theirs = self.load_entry(path_conflict.theirs.as_ref())?;

        let entry = path_conflict
            .ours
            .as_ref()
            .or(path_conflict.theirs.as_ref())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("conflict at {} has no side", path_conflict.path.display()))?;

        let binary = [&base, &ours, &theirs]
            .into_iter()
            .flatten()
            .any(|content| self.is_binary(content));

        let (content, marked) = if binary {
            let kept = ours.clone().or_else(|| theirs.clone()).unwrap_or_default();
            (kept, None)
        } else {
            let ours_content = ours.as_deref().unwrap_or_default();
            let theirs_content = theirs.as_deref().unwrap_or_default();

            let marked = match path_conflict.kind {
                ConflictKind::BothModified | ConflictKind::BothAdded => {
                    let base_content = base.as_deref().unwrap_or_default();
                    let text_merge =
                        three_way::merge(base_content, ours_content, theirs_content, ours_label, theirs_label);
                    if text_merge.is_clean() {
                        three_way::whole_file_markers(ours_content, theirs_content, ours_label, theirs_label)
                    } else {
                        text_merge.content
                    }
                }
                ConflictKind::ModifyDelete | ConflictKind::DeleteModify => {
                    three_way::whole_file_markers(ours_content, theirs_content, ours_label, theirs_label)
                }
            };
            let text = String::from_utf8_lossy(&marked).into_owned();
            (Bytes::from(marked), Some(text))
        };

        Ok(Resolution {
            conflict: Conflict {
                path: path_conflict.path.clone(),
                kind: path_conflict.kind,
                base,
                ours,
                theirs,
                marked,
            },
            content,
            entry,
        })
    }
}
