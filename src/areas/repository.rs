//! The repository aggregate
//!
//! A `Repository` is an explicit value: every operation runs against one, and
//! several can be open at the same time. It owns the object store, the commit
//! graph, refs, the staging index, the workspace, the configuration and the
//! delta engine. The operations themselves live in `commands`, one
//! `impl Repository` block per command.
//!
//! ## Layout (`<root>/.gible/`)
//!
//! - `objects/`: blobs (full or delta) and trees
//! - `commits/`: commit nodes
//! - `refs/branches/<name>`: branch tips
//! - `HEAD`: active branch
//! - `index`: staging index
//! - `MERGE_HEAD`: pending merge
//! - `config.toml`: configuration
//! - `LOCK`, `WORKTREE_LOCK`: transient lock files

use crate::areas::commits::CommitGraph;
use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::lock::{LockGuard, REPOSITORY_LOCK, WORKTREE_LOCK};
use crate::areas::refs::Refs;
use crate::areas::workspace::{METADATA_DIR, Workspace};
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::delta::DeltaEngine;
use crate::artifacts::delta::classifier::ContentKind;
use crate::artifacts::merge::merge_state::MergeState;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::GibleError;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CONFIG_FILE: &str = "config.toml";
pub const INDEX_FILE: &str = "index";
pub const OBJECTS_DIR: &str = "objects";
pub const COMMITS_DIR: &str = "commits";

pub struct Repository {
    path: Box<Path>,
    config: Config,
    index: Arc<Mutex<Index>>,
    database: Database,
    commits: CommitGraph,
    workspace: Workspace,
    refs: Refs,
    delta: DeltaEngine,
}

impl Repository {
    /// Open the repository rooted at `path`
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let root = path
            .canonicalize()
            .map_err(|_| GibleError::NotARepository(path.to_path_buf()))?;

        if !root.join(METADATA_DIR).is_dir() {
            return Err(GibleError::NotARepository(root).into());
        }

        let config = Config::load(&root.join(METADATA_DIR).join(CONFIG_FILE))?;
        Ok(Self::assemble(root, config))
    }

    /// Open the repository containing `path`, looking at its ancestors too
    pub fn discover(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let start = path
            .canonicalize()
            .with_context(|| format!("cannot access {}", path.display()))?;

        match start
            .ancestors()
            .find(|ancestor| ancestor.join(METADATA_DIR).is_dir())
        {
            Some(root) => Self::open(root),
            None => Err(GibleError::NotARepository(start).into()),
        }
    }

    pub(crate) fn assemble(root: PathBuf, config: Config) -> Self {
        let metadata_path = root.join(METADATA_DIR);

        Repository {
            index: Arc::new(Mutex::new(Index::new(
                metadata_path.join(INDEX_FILE).into_boxed_path(),
            ))),
            database: Database::new(metadata_path.join(OBJECTS_DIR).into_boxed_path()),
            commits: CommitGraph::new(metadata_path.join(COMMITS_DIR).into_boxed_path()),
            workspace: Workspace::new(root.clone().into_boxed_path()),
            refs: Refs::new(metadata_path.into_boxed_path()),
            delta: DeltaEngine::new(&config.delta),
            config,
            path: root.into_boxed_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_DIR)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn commits(&self) -> &CommitGraph {
        &self.commits
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn delta(&self) -> &DeltaEngine {
        &self.delta
    }

    /// Exclusive lock over refs, the staging index and the stores
    pub(crate) async fn lock(&self) -> anyhow::Result<LockGuard> {
        LockGuard::acquire(
            &self.metadata_path().join(REPOSITORY_LOCK),
            self.config.lock_timeout(),
        )
        .await
    }

    /// Exclusive lock over the working tree, taken after [`Repository::lock`]
    pub(crate) async fn lock_worktree(&self) -> anyhow::Result<LockGuard> {
        LockGuard::acquire(
            &self.metadata_path().join(WORKTREE_LOCK),
            self.config.lock_timeout(),
        )
        .await
    }

    /// Tree of a commit
    pub(crate) fn commit_tree(&self, commit_oid: &ObjectId) -> anyhow::Result<Tree> {
        let commit = self.commits.load(commit_oid)?;
        self.database.parse_object_as_tree(commit.tree_oid())
    }

    /// Tree of HEAD, empty while the branch is unborn
    pub(crate) fn head_tree(&self) -> anyhow::Result<Tree> {
        match self.refs.read_head()? {
            Some(head) => self.commit_tree(&head),
            None => Ok(Tree::default()),
        }
    }

    /// Full content of a blob, however it is stored
    pub(crate) fn load_blob(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        self.delta.materialize(&self.database, oid)
    }

    /// Content behind a tree entry, `None` for an absent entry
    pub(crate) fn load_entry(&self, entry: Option<&DatabaseEntry>) -> anyhow::Result<Option<Bytes>> {
        entry.map(|entry| self.load_blob(&entry.oid)).transpose()
    }

    pub(crate) fn is_binary(&self, content: &[u8]) -> bool {
        !content.is_empty() && self.delta.classify(content) == ContentKind::Binary
    }

    pub fn pending_merge(&self) -> anyhow::Result<Option<MergeState>> {
        MergeState::load(&self.metadata_path())
    }

    pub(crate) fn ensure_no_pending_merge(&self) -> anyhow::Result<()> {
        match self.pending_merge()? {
            Some(_) => Err(GibleError::MergeInProgress.into()),
            None => Ok(()),
        }
    }
}
