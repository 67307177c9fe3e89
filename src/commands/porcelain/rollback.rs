use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::commands::porcelain::commit::CommitSummary;
use crate::errors::GibleError;

impl Repository {
    /// Forward commit on the active branch whose snapshot equals the one
    /// `revision` names; history is left untouched
    pub async fn rollback(&self, revision: &str, message: Option<&str>) -> anyhow::Result<CommitSummary> {
        let _lock = self.lock().await?;
        let _worktree_lock = self.lock_worktree().await?;
        self.ensure_no_pending_merge()?;

        let branch = self.refs().current_branch()?;
        let head = self
            .refs()
            .read_head()?
            .ok_or_else(|| GibleError::UnbornHead(branch.to_string()))?;
        let target = self.resolve(revision).await?;

        let head_commit = self.commits().load(&head)?;
        let target_commit = self.commits().load(&target)?;
        if head_commit.tree_oid() == target_commit.tree_oid() {
            return Err(GibleError::EmptyCommit.into());
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head_tree = self.database().parse_object_as_tree(head_commit.tree_oid())?;
        let target_tree = self.database().parse_object_as_tree(target_commit.tree_oid())?;
        let migration = self.plan_migration(&index, &head_tree, &target_tree)?;

        let message = match message {
            Some(message) => message.trim().to_string(),
            None => format!(
                "Rollback to {}: {}",
                target.to_short_oid(),
                target_commit.short_message()
            ),
        };
        let commit = Commit::new(
            vec![head],
            target_commit.tree_oid().clone(),
            self.config().author(),
            message,
        );
        let summary = self.record_commit(&commit)?;

        self.apply_migration(&migration)?;

        Ok(summary)
    }
}
