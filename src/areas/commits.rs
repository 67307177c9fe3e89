//! Commit graph
//!
//! Commit nodes live in their own record store (`.gible/commits/`), separate
//! from blobs and trees. The graph is append-only: a node is never rewritten
//! once stored, and a node's parents are always stored before it.

use crate::areas::database::Database;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object_id::ObjectId;
use std::path::Path;

#[derive(Debug)]
pub struct CommitGraph {
    database: Database,
}

impl CommitGraph {
    pub fn new(path: Box<Path>) -> Self {
        CommitGraph {
            database: Database::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.database.objects_path()
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.database.contains(oid)
    }

    pub fn store(&self, commit: &Commit) -> anyhow::Result<ObjectId> {
        for parent in commit.parents() {
            if !self.contains(parent) {
                anyhow::bail!("parent commit {} is not in the graph", parent);
            }
        }

        let oid = self.database.store(commit)?;
        tracing::debug!(%oid, parents = commit.parents().len(), "stored commit");

        Ok(oid)
    }

    /// `ObjectNotFound` when no such commit exists
    pub fn load(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        self.database.parse_object_as_commit(oid)
    }

    pub fn load_slim(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit> {
        Ok(self.load(oid)?.to_slim(oid.clone()))
    }

    pub fn find_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        self.database.find_objects_by_prefix(prefix)
    }

    /// Whether `ancestor` is reachable from `descendant` through any parent link
    /// (a commit is its own ancestor).
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool> {
        let mut visited = std::collections::HashSet::new();
        let mut pending = vec![descendant.clone()];

        while let Some(oid) = pending.pop() {
            if &oid == ancestor {
                return Ok(true);
            }
            if !visited.insert(oid.clone()) {
                continue;
            }
            pending.extend(self.load(&oid)?.parents().iter().cloned());
        }

        Ok(false)
    }
}
