use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::tree::Tree;
use bitflags::bitflags;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct DiffFilter: u32 {
        const ADDED = 0b0001;
        const DELETED = 0b0010;
        const MODIFIED = 0b0100;
    }
}

impl DiffFilter {
    /// Parse letters such as `"AM"`; `None` on an unknown letter
    pub fn try_parse(s: &str) -> Option<Self> {
        let mut filter = Self::empty();

        for c in s.chars() {
            match c {
                'A' => filter |= Self::ADDED,
                'D' => filter |= Self::DELETED,
                'M' => filter |= Self::MODIFIED,
                _ => return None,
            }
        }

        Some(filter)
    }
}

impl Default for DiffFilter {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChangeType {
    Added(DatabaseEntry),
    Deleted(DatabaseEntry),
    Modified { old: DatabaseEntry, new: DatabaseEntry },
}

impl TreeChangeType {
    pub fn from_entries(old: Option<DatabaseEntry>, new: Option<DatabaseEntry>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(TreeChangeType::Added(new)),
            (Some(old), None) => Some(TreeChangeType::Deleted(old)),
            (Some(old), Some(new)) if old != new => Some(TreeChangeType::Modified { old, new }),
            _ => None,
        }
    }

    pub fn matches_filter(&self, filter: DiffFilter) -> bool {
        match self {
            TreeChangeType::Added(_) => filter.contains(DiffFilter::ADDED),
            TreeChangeType::Deleted(_) => filter.contains(DiffFilter::DELETED),
            TreeChangeType::Modified { .. } => filter.contains(DiffFilter::MODIFIED),
        }
    }

    pub fn old_entry(&self) -> Option<&DatabaseEntry> {
        match self {
            TreeChangeType::Deleted(entry) => Some(entry),
            TreeChangeType::Modified { old, .. } => Some(old),
            TreeChangeType::Added(_) => None,
        }
    }

    pub fn new_entry(&self) -> Option<&DatabaseEntry> {
        match self {
            TreeChangeType::Added(entry) => Some(entry),
            TreeChangeType::Modified { new, .. } => Some(new),
            TreeChangeType::Deleted(_) => None,
        }
    }

    pub fn status_char(&self) -> char {
        match self {
            TreeChangeType::Added(_) => 'A',
            TreeChangeType::Deleted(_) => 'D',
            TreeChangeType::Modified { .. } => 'M',
        }
    }
}

pub type ChangeSet = BTreeMap<PathBuf, TreeChangeType>;

/// Path-level difference between two snapshots
#[derive(Debug, Default)]
pub struct TreeDiff {
    change_set: ChangeSet,
}

impl TreeDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.change_set
    }

    pub fn into_changes(self) -> ChangeSet {
        self.change_set
    }

    pub fn is_empty(&self) -> bool {
        self.change_set.is_empty()
    }

    pub fn get_entries(&self, path: &Path) -> (Option<&DatabaseEntry>, Option<&DatabaseEntry>) {
        match self.change_set.get(path) {
            Some(change) => (change.old_entry(), change.new_entry()),
            None => (None, None),
        }
    }

    /// Record every path under `prefix` whose entry differs between `old` and `new`
    pub fn compare_trees(&mut self, old: &Tree, new: &Tree, prefix: &Path, filter: DiffFilter) {
        self.detect_deletions(old, new, prefix, filter);
        self.detect_additions(old, new, prefix, filter);
    }

    fn detect_deletions(&mut self, old: &Tree, new: &Tree, prefix: &Path, filter: DiffFilter) {
        for path in old.paths_under(prefix) {
            let entry = old.get(path).cloned();
            let other = new.get(path).cloned();

            if let Some(change) = TreeChangeType::from_entries(entry, other)
                && change.matches_filter(filter)
            {
                self.change_set.insert(path.clone(), change);
            }
        }
    }

    fn detect_additions(&mut self, old: &Tree, new: &Tree, prefix: &Path, filter: DiffFilter) {
        for path in new.paths_under(prefix) {
            if old.get(path).is_some() {
                continue;
            }

            if let Some(entry) = new.get(path) {
                let change = TreeChangeType::Added(entry.clone());
                if change.matches_filter(filter) {
                    self.change_set.insert(path.clone(), change);
                }
            }
        }
    }
}
