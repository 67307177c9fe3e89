//! Branch pointers and HEAD
//!
//! ## File Format
//!
//! - `refs/branches/<name>`: a 40-character commit id, or empty while the
//!   branch has no commit yet
//! - `HEAD`: `ref: refs/branches/<name>`, the active branch
//!
//! Every ref update writes a temp file, fsyncs it and renames it over the
//! old one, so readers never observe a half-written ref.

use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GibleError;
use anyhow::Context;
use derive_new::new;
use fake::rand;
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

pub const HEAD_REF_NAME: &str = "HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository metadata directory (`.gible`)
    path: Box<Path>,
}

impl Refs {
    /// Branch HEAD points at
    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        let content = std::fs::read_to_string(self.head_path())
            .with_context(|| format!("failed to read {}", self.head_path().display()))?;
        let content = content.trim();

        let symref = regex::Regex::new(SYMREF_REGEX)?
            .captures(content)
            .with_context(|| format!("HEAD is not a branch reference: '{content}'"))?;

        BranchName::try_parse_sym_ref_name(&SymRefName::new(symref[1].to_string()))
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.current_branch()? == branch_name)
    }

    pub fn set_head(&self, branch_name: &BranchName) -> anyhow::Result<()> {
        let content = format!("ref: {}\n", branch_name.to_sym_ref_name().as_ref_path());
        write_atomically(&self.head_path(), content.as_bytes())?;
        tracing::info!(branch = %branch_name, "HEAD moved");

        Ok(())
    }

    /// Commit of the active branch, `None` while it is unborn
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        let branch = self.current_branch()?;
        self.read_branch(&branch)
    }

    /// Advance the active branch
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let branch = self.current_branch()?;
        self.write_branch(&branch, Some(oid))
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.branch_path(branch_name).is_file()
    }

    /// Commit a branch points at; `UnknownBranch` if there is no such branch
    pub fn read_branch(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let path = self.branch_path(branch_name);
        if !path.is_file() {
            return Err(GibleError::UnknownBranch(branch_name.to_string()).into());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read ref file at {}", path.display()))?;
        let content = content.trim();

        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ObjectId::try_parse(content.to_string())?))
        }
    }

    pub fn write_branch(&self, branch_name: &BranchName, oid: Option<&ObjectId>) -> anyhow::Result<()> {
        let content = oid.map(|oid| format!("{oid}\n")).unwrap_or_default();
        write_atomically(&self.branch_path(branch_name), content.as_bytes())?;
        tracing::info!(branch = %branch_name, oid = ?oid.map(ObjectId::to_short_oid), "branch updated");

        Ok(())
    }

    pub fn create_branch(&self, branch_name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(branch_name) {
            return Err(GibleError::DuplicateBranch(branch_name.to_string()).into());
        }

        self.write_branch(branch_name, Some(oid))
    }

    /// Remove a branch; returns the commit it pointed at
    pub fn delete_branch(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let oid = self.read_branch(branch_name)?;
        let branch_path = self.branch_path(branch_name);

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {}", branch_path.display()))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;
        tracing::info!(branch = %branch_name, "branch deleted");

        Ok(oid)
    }

    /// All branches, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let branches_path = self.branches_path();
        let mut branches = WalkDir::new(&branches_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&branches_path).ok()?;
                let name = relative_path.to_str()?.replace(std::path::MAIN_SEPARATOR, "/");
                BranchName::try_parse(name).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.branches_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {}", parent.display())
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, branch_name: &BranchName) -> Box<Path> {
        self.path
            .join(branch_name.to_sym_ref_name().as_ref_path())
            .into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn branches_path(&self) -> Box<Path> {
        self.refs_path().join("branches").into_boxed_path()
    }
}

/// Replace `path` with `content` through a synced temp file and a rename
pub(crate) fn write_atomically(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("invalid file path {}", path.display()))?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory {}", parent.display()))?;

    let file_name = path
        .file_name()
        .with_context(|| format!("invalid file path {}", path.display()))?
        .to_string_lossy();
    let temp_path = parent.join(format!(".{file_name}.tmp-{}", rand::random::<u32>()));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| format!("failed to create {}", temp_path.display()))?;
    file.write_all(content)?;
    file.sync_all()?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("failed to move {} into place", path.display()))
}
