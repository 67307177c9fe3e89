use crate::errors::GibleError;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug)]
pub struct ConflictMessage {
    pub header: &'static str,
    pub footer: &'static str,
}

impl From<&ConflictType> for ConflictMessage {
    fn from(value: &ConflictType) -> Self {
        match value {
            ConflictType::StagedChanges => Self {
                header: "The following files have staged changes:",
                footer: "Please commit or unstage them before you switch branches.",
            },
            ConflictType::StaleFile => Self {
                header: "Your local changes to the following files would be overwritten:",
                footer: "Please commit your changes before you switch branches.",
            },
            ConflictType::StaleDirectory => Self {
                header: "Updating the following directories would lose untracked files in them:",
                footer: "Please move or remove them before you switch branches.",
            },
            ConflictType::UntrackedOverwritten => Self {
                header: "The following untracked working tree files would be overwritten:",
                footer: "Please move or remove them before you switch branches.",
            },
        }
    }
}

/// Why the working tree cannot be rewritten safely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictType {
    /// The staging index is not empty
    StagedChanges,
    /// A tracked file differs from HEAD on disk
    StaleFile,
    /// A directory with untracked files sits where a file must be written
    StaleDirectory,
    /// An untracked file sits where a file or directory must be written
    UntrackedOverwritten,
}

pub type ConflictsSet = BTreeMap<ConflictType, Vec<PathBuf>>;

/// Fail with `DirtyWorkingTree` listing every conflicting path, if there is any.
pub fn ensure_no_conflicts(conflicts: &ConflictsSet) -> anyhow::Result<()> {
    let mut paths = Vec::new();

    for (conflict_type, conflict_paths) in conflicts {
        if conflict_paths.is_empty() {
            continue;
        }

        let ConflictMessage { header, footer } = conflict_type.into();
        tracing::warn!(
            paths = ?conflict_paths,
            hint = footer,
            "{header}"
        );
        paths.extend(conflict_paths.iter().cloned());
    }

    if paths.is_empty() {
        return Ok(());
    }

    paths.sort();
    paths.dedup();
    Err(GibleError::DirtyWorkingTree(paths).into())
}
