//! Path-level three-way classification of base, ours and theirs trees
//!
//! Entries are compared by blob id and mode. Content and mode are merged
//! independently, so a mode change on one side and a content change on the
//! other combine cleanly.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::tree::Tree;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// Changed differently on both sides
    BothModified,
    /// Modified on our side, deleted on theirs
    ModifyDelete,
    /// Deleted on our side, modified on theirs
    DeleteModify,
    /// Added on both sides with different content
    BothAdded,
}

impl ConflictKind {
    pub fn as_str(&self) -> &str {
        match self {
            ConflictKind::BothModified => "both modified",
            ConflictKind::ModifyDelete => "deleted by them",
            ConflictKind::DeleteModify => "deleted by us",
            ConflictKind::BothAdded => "both added",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConflict {
    pub path: PathBuf,
    pub kind: ConflictKind,
    pub base: Option<DatabaseEntry>,
    pub ours: Option<DatabaseEntry>,
    pub theirs: Option<DatabaseEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeMerge {
    /// Every path that merged cleanly; conflicted paths are absent
    pub merged: Tree,
    pub conflicts: Vec<PathConflict>,
}

/// Three-way choice for one value: `None` when both sides changed it differently
fn pick<T: PartialEq + Clone>(base: &T, ours: &T, theirs: &T) -> Option<T> {
    if ours == theirs || theirs == base {
        Some(ours.clone())
    } else if ours == base {
        Some(theirs.clone())
    } else {
        None
    }
}

impl TreeMerge {
    pub fn classify(base: &Tree, ours: &Tree, theirs: &Tree) -> Self {
        let paths = base
            .entries()
            .keys()
            .chain(ours.entries().keys())
            .chain(theirs.entries().keys())
            .cloned()
            .collect::<BTreeSet<_>>();

        let mut tree_merge = TreeMerge::default();
        for path in paths {
            let base_entry = base.get(&path).cloned();
            let ours_entry = ours.get(&path).cloned();
            let theirs_entry = theirs.get(&path).cloned();

            match Self::merge_entries(&base_entry, &ours_entry, &theirs_entry) {
                Ok(Some(entry)) => tree_merge.merged.insert(path, entry),
                Ok(None) => {}
                Err(kind) => tree_merge.conflicts.push(PathConflict {
                    path,
                    kind,
                    base: base_entry,
                    ours: ours_entry,
                    theirs: theirs_entry,
                }),
            }
        }

        tree_merge
    }

    fn merge_entries(
        base: &Option<DatabaseEntry>,
        ours: &Option<DatabaseEntry>,
        theirs: &Option<DatabaseEntry>,
    ) -> Result<Option<DatabaseEntry>, ConflictKind> {
        if let Some(entry) = pick(base, ours, theirs) {
            return Ok(entry);
        }

        match (base, ours, theirs) {
            (Some(base), Some(ours), Some(theirs)) => {
                let oid = pick(&base.oid, &ours.oid, &theirs.oid);
                let mode = pick(&base.mode, &ours.mode, &theirs.mode);
                match (oid, mode) {
                    (Some(oid), Some(mode)) => Ok(Some(DatabaseEntry::new(oid, mode))),
                    _ => Err(ConflictKind::BothModified),
                }
            }
            (Some(_), Some(_), None) => Err(ConflictKind::ModifyDelete),
            (Some(_), None, Some(_)) => Err(ConflictKind::DeleteModify),
            // added on both sides; with no base even a mode difference is undecidable
            _ => Err(ConflictKind::BothAdded),
        }
    }
}
