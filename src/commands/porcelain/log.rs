use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::{AllRevList, RevList};

impl Repository {
    /// First-parent history from HEAD, newest first. The returned iterator
    /// loads commits lazily; cloning it before iterating gives a restartable
    /// copy of the walk.
    pub async fn history(&self, limit: Option<usize>) -> anyhow::Result<RevList<'_>> {
        let head = self.refs().read_head()?;

        Ok(RevList::new(self.commits(), head, limit))
    }

    /// Every commit reachable from HEAD through any parent, each once, in
    /// reverse chronological order
    pub async fn history_all(&self, limit: Option<usize>) -> anyhow::Result<AllRevList<'_>> {
        let head = self.refs().read_head()?;

        Ok(AllRevList::new(self.commits(), head, limit))
    }
}
