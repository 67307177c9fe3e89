//! Pending merge awaiting resolution
//!
//! ## File Format (`.gible/MERGE_HEAD`)
//!
//! ```text
//! <source commit id>
//! <source branch name>
//! <conflicted path>...
//! ```

use crate::areas::refs::write_atomically;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub const MERGE_HEAD: &str = "MERGE_HEAD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeState {
    pub source_oid: ObjectId,
    pub source_branch: BranchName,
    pub conflicts: Vec<PathBuf>,
}

impl MergeState {
    pub fn path(metadata_path: &Path) -> PathBuf {
        metadata_path.join(MERGE_HEAD)
    }

    pub fn load(metadata_path: &Path) -> anyhow::Result<Option<Self>> {
        let path = Self::path(metadata_path);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut lines = content.lines();

        let source_oid = lines
            .next()
            .context("MERGE_HEAD is missing the source commit")?
            .trim()
            .parse::<ObjectId>()?;
        let source_branch = BranchName::try_parse(
            lines
                .next()
                .context("MERGE_HEAD is missing the source branch")?
                .trim(),
        )?;
        let conflicts = lines
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect();

        Ok(Some(MergeState {
            source_oid,
            source_branch,
            conflicts,
        }))
    }

    pub fn save(&self, metadata_path: &Path) -> anyhow::Result<()> {
        let mut content = format!("{}\n{}\n", self.source_oid, self.source_branch);
        for path in &self.conflicts {
            content.push_str(&format!("{}\n", path.display()));
        }

        write_atomically(&Self::path(metadata_path), content.as_bytes())
    }

    pub fn clear(metadata_path: &Path) -> anyhow::Result<()> {
        let path = Self::path(metadata_path);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }

        Ok(())
    }
}
