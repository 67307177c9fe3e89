use crate::areas::config::Config;
use crate::areas::refs::Refs;
use crate::areas::repository::{COMMITS_DIR, CONFIG_FILE, INDEX_FILE, OBJECTS_DIR, Repository};
use crate::areas::workspace::METADATA_DIR;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::GibleError;
use anyhow::Context;
use std::fs;
use std::path::Path;

impl Repository {
    /// Create `.gible/` under `path` (created if missing) with an unborn
    /// `master` branch, an empty index and the default configuration.
    pub async fn init(path: impl AsRef<Path>) -> anyhow::Result<Repository> {
        let path = path.as_ref();
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;

        let root = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        let metadata_path = root.join(METADATA_DIR);
        if metadata_path.exists() {
            return Err(GibleError::AlreadyInitialized(root).into());
        }

        fs::create_dir_all(metadata_path.join(OBJECTS_DIR))
            .context("Failed to create .gible/objects directory")?;
        fs::create_dir_all(metadata_path.join(COMMITS_DIR))
            .context("Failed to create .gible/commits directory")?;

        let refs = Refs::new(metadata_path.clone().into_boxed_path());
        fs::create_dir_all(refs.branches_path())
            .context("Failed to create .gible/refs/branches directory")?;

        let default_branch = BranchName::default_branch();
        refs.write_branch(&default_branch, None)
            .context("Failed to create default branch")?;
        refs.set_head(&default_branch)
            .context("Failed to create initial HEAD reference")?;

        fs::write(metadata_path.join(INDEX_FILE), b"").context("Failed to create .gible/index file")?;
        Config::default()
            .save(&metadata_path.join(CONFIG_FILE))
            .context("Failed to write .gible/config.toml")?;

        tracing::info!(path = %root.display(), "initialized empty repository");

        Repository::open(root)
    }
}
