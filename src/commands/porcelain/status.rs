use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::StageState;
use crate::artifacts::status::inspector::Inspector;
use crate::artifacts::status::status_report::StatusReport;
use std::path::PathBuf;

impl Repository {
    /// Staged entries, sorted by path
    pub async fn status(&self) -> anyhow::Result<Vec<(PathBuf, StageState)>> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        Ok(index
            .entries()
            .map(|entry| (entry.path.clone(), entry.state()))
            .collect())
    }

    /// Branch, pending merge, staged entries and unstaged working tree changes
    pub async fn status_report(&self) -> anyhow::Result<StatusReport> {
        let branch = self.refs().current_branch()?;
        let head = self.refs().read_head()?;
        let head_tree = self.head_tree()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let staged = index
            .entries()
            .map(|entry| (entry.path.clone(), entry.state()))
            .collect();
        let expected = Inspector::expected_tree(&head_tree, &index);
        let unstaged = Inspector::new(self.workspace()).workspace_changes(&expected)?;

        Ok(StatusReport {
            branch,
            head,
            pending_merge: self.pending_merge()?,
            staged,
            unstaged,
        })
    }
}
