use crate::artifacts::diff::diff_algorithm::{DiffAlgorithm, Edit, MyersDiff, split_lines};
use crate::artifacts::diff::hunk::Hunk;
use crate::artifacts::diff::tree_diff::TreeChangeType;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;

/// Line-level content of a changed text file
pub type TextHunk = Hunk<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDiffContent {
    Text(Vec<TextHunk>),
    /// Either side is not text; no line diff is produced
    Binary,
}

/// One changed path between two revisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub change: TreeChangeType,
    pub content: FileDiffContent,
}

impl FileDiff {
    /// Diff `old` against `new`; a missing side is empty content
    pub fn build(path: PathBuf, change: TreeChangeType, old: &[u8], new: &[u8], binary: bool) -> Self {
        let content = if binary {
            FileDiffContent::Binary
        } else {
            let (a, b) = (lossy_lines(old), lossy_lines(new));
            FileDiffContent::Text(Hunk::build(&MyersDiff::new(&a, &b).diff()))
        };

        FileDiff { path, change, content }
    }

    pub fn old_oid(&self) -> Option<&ObjectId> {
        self.change.old_entry().map(|entry| &entry.oid)
    }

    pub fn new_oid(&self) -> Option<&ObjectId> {
        self.change.new_entry().map(|entry| &entry.oid)
    }

    pub fn old_mode(&self) -> Option<FileMode> {
        self.change.old_entry().map(|entry| entry.mode)
    }

    pub fn new_mode(&self) -> Option<FileMode> {
        self.change.new_entry().map(|entry| entry.mode)
    }

    pub fn hunks(&self) -> &[TextHunk] {
        match &self.content {
            FileDiffContent::Text(hunks) => hunks,
            FileDiffContent::Binary => &[],
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.content, FileDiffContent::Binary)
    }

    /// Rendered edit lines, `+`/`-`/` ` prefixed, without colors
    pub fn lines(&self) -> Vec<String> {
        self.hunks()
            .iter()
            .flat_map(|hunk| {
                std::iter::once(hunk.header()).chain(hunk.edits().iter().map(Edit::as_string))
            })
            .collect()
    }
}

fn lossy_lines(content: &[u8]) -> Vec<String> {
    split_lines(content)
        .into_iter()
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect()
}
