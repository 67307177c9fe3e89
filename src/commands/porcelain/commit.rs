use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::merge::merge_state::MergeState;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::GibleError;

/// What `commit` and `rollback` recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub oid: ObjectId,
    pub branch: BranchName,
    pub parents: Vec<ObjectId>,
    pub short_message: String,
}

impl CommitSummary {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

impl Repository {
    /// Record HEAD's tree with the staged operations applied and advance the
    /// active branch. Also finalizes a pending merge with a two-parent commit.
    pub async fn commit(&self, message: &str) -> anyhow::Result<CommitSummary> {
        let _lock = self.lock().await?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head = self.refs().read_head()?;
        let pending_merge = self.pending_merge()?;

        if index.is_empty() && head.is_some() && pending_merge.is_none() {
            return Err(GibleError::EmptyCommit.into());
        }

        let head_tree = self.head_tree()?;
        let tree = Inspector::expected_tree(&head_tree, &index);

        if let Some(merge_state) = &pending_merge {
            // conflicted files must be resolved and staged
            let inspector = Inspector::new(self.workspace());
            let mut unresolved = Vec::new();
            for path in &merge_state.conflicts {
                if inspector.check_workspace_against(path, tree.get(path))? != WorkspaceChangeType::None {
                    unresolved.push(path.clone());
                }
            }
            if !unresolved.is_empty() {
                return Err(GibleError::DirtyWorkingTree(unresolved).into());
            }
        }

        let tree_oid = self.database().store(&tree)?;
        let parents = head
            .into_iter()
            .chain(pending_merge.map(|merge_state| merge_state.source_oid))
            .collect::<Vec<_>>();

        let commit = Commit::new(
            parents.clone(),
            tree_oid,
            self.config().author(),
            message.trim().to_string(),
        );
        let summary = self.record_commit(&commit)?;

        index.clear();
        index.write_updates()?;
        MergeState::clear(&self.metadata_path())?;

        Ok(summary)
    }

    /// Store `commit` and move the active branch onto it
    pub(crate) fn record_commit(&self, commit: &Commit) -> anyhow::Result<CommitSummary> {
        let oid = self.commits().store(commit)?;
        self.refs().update_head(&oid)?;

        let summary = CommitSummary {
            oid,
            branch: self.refs().current_branch()?,
            parents: commit.parents().to_vec(),
            short_message: commit.short_message(),
        };
        tracing::info!(
            oid = %summary.oid.to_short_oid(),
            branch = %summary.branch,
            parents = summary.parents.len(),
            "committed"
        );

        Ok(summary)
    }
}
