use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use std::path::Path;

impl Repository {
    /// Commit named by `revision`: `HEAD`, a branch, a full or abbreviated
    /// commit id, optionally followed by `^` or `~<n>`
    pub async fn resolve(&self, revision: &str) -> anyhow::Result<ObjectId> {
        Revision::try_parse(revision)?.resolve(self.refs(), self.commits())
    }

    /// Content of `path` as recorded by the commit `revision` names
    pub async fn file_at(&self, revision: &str, path: &Path) -> anyhow::Result<Bytes> {
        let commit_oid = self.resolve(revision).await?;
        let path = self.workspace().relativize(path)?;

        let tree = self.commit_tree(&commit_oid)?;
        let entry = tree.get(&path).with_context(|| {
            format!(
                "path '{}' does not exist in {}",
                path.display(),
                commit_oid.to_short_oid()
            )
        })?;

        self.load_blob(&entry.oid)
    }
}
