//! Line-based three-way merge (diff3)
//!
//! Both sides are diffed against the base with Myers. Walking the three line
//! sequences together splits them into stable chunks, where all three agree,
//! and unstable chunks in between. An unstable chunk changed on one side only
//! takes that side; changed identically on both sides it takes either; anything
//! else is a conflicting region and is written between markers:
//!
//! ```text
//! <<<<<<< ours
//! ours lines
//! =======
//! theirs lines
//! >>>>>>> theirs
//! ```

use crate::artifacts::diff::diff_algorithm::{DiffAlgorithm, Edit, MyersDiff, split_lines};
use std::collections::HashMap;

pub const OURS_MARKER: &str = "<<<<<<<";
pub const SEPARATOR_MARKER: &str = "=======";
pub const THEIRS_MARKER: &str = ">>>>>>>";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk<'l> {
    Clean(Vec<&'l [u8]>),
    Conflict {
        ours: Vec<&'l [u8]>,
        theirs: Vec<&'l [u8]>,
    },
}

/// Result of merging one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMerge {
    /// Merged content, with markers around conflicting regions
    pub content: Vec<u8>,
    /// Number of conflicting regions
    pub conflicts: usize,
}

impl TextMerge {
    pub fn is_clean(&self) -> bool {
        self.conflicts == 0
    }
}

struct Diff3<'l> {
    base: Vec<&'l [u8]>,
    ours: Vec<&'l [u8]>,
    theirs: Vec<&'l [u8]>,
    match_ours: HashMap<usize, usize>,
    match_theirs: HashMap<usize, usize>,
    line_base: usize,
    line_ours: usize,
    line_theirs: usize,
    chunks: Vec<Chunk<'l>>,
}

impl<'l> Diff3<'l> {
    fn new(base: &'l [u8], ours: &'l [u8], theirs: &'l [u8]) -> Self {
        let base = split_lines(base);
        let ours = split_lines(ours);
        let theirs = split_lines(theirs);
        let match_ours = Self::matches(&base, &ours);
        let match_theirs = Self::matches(&base, &theirs);

        Diff3 {
            base,
            ours,
            theirs,
            match_ours,
            match_theirs,
            line_base: 0,
            line_ours: 0,
            line_theirs: 0,
            chunks: Vec::new(),
        }
    }

    /// Base line index -> other line index, for every line the diff keeps
    fn matches(base: &[&'l [u8]], other: &[&'l [u8]]) -> HashMap<usize, usize> {
        MyersDiff::new(base, other)
            .diff()
            .into_iter()
            .filter_map(|edit| match edit {
                Edit::Equal { a_index, b_index, .. } => Some((a_index, b_index)),
                _ => None,
            })
            .collect()
    }

    fn generate_chunks(mut self) -> Vec<Chunk<'l>> {
        loop {
            match self.find_next_mismatch() {
                Some(0) => match self.find_next_match() {
                    Some((base, ours, theirs)) => self.emit_chunk(base, ours, theirs),
                    None => {
                        self.emit_final_chunk();
                        return self.chunks;
                    }
                },
                Some(matched) => self.emit_chunk(
                    self.line_base + matched,
                    self.line_ours + matched,
                    self.line_theirs + matched,
                ),
                None => {
                    self.emit_final_chunk();
                    return self.chunks;
                }
            }
        }
    }

    /// Number of lines all three sequences agree on from the current position,
    /// `None` when they agree up to the end
    fn find_next_mismatch(&self) -> Option<usize> {
        let mut i = 0;
        while self.in_bounds(i)
            && self.match_ours.get(&(self.line_base + i)) == Some(&(self.line_ours + i))
            && self.match_theirs.get(&(self.line_base + i)) == Some(&(self.line_theirs + i))
        {
            i += 1;
        }

        self.in_bounds(i).then_some(i)
    }

    fn in_bounds(&self, i: usize) -> bool {
        self.line_base + i < self.base.len()
            || self.line_ours + i < self.ours.len()
            || self.line_theirs + i < self.theirs.len()
    }

    /// Next base line kept by both sides
    fn find_next_match(&self) -> Option<(usize, usize, usize)> {
        (self.line_base..self.base.len()).find_map(|base| {
            match (self.match_ours.get(&base), self.match_theirs.get(&base)) {
                (Some(&ours), Some(&theirs)) => Some((base, ours, theirs)),
                _ => None,
            }
        })
    }

    fn emit_chunk(&mut self, base: usize, ours: usize, theirs: usize) {
        let chunk = Self::resolve(
            &self.base[self.line_base..base],
            &self.ours[self.line_ours..ours],
            &self.theirs[self.line_theirs..theirs],
        );
        self.chunks.push(chunk);

        self.line_base = base;
        self.line_ours = ours;
        self.line_theirs = theirs;
    }

    fn emit_final_chunk(&mut self) {
        let chunk = Self::resolve(
            &self.base[self.line_base..],
            &self.ours[self.line_ours..],
            &self.theirs[self.line_theirs..],
        );
        self.chunks.push(chunk);
    }

    fn resolve(base: &[&'l [u8]], ours: &[&'l [u8]], theirs: &[&'l [u8]]) -> Chunk<'l> {
        if ours == theirs || theirs == base {
            Chunk::Clean(ours.to_vec())
        } else if ours == base {
            Chunk::Clean(theirs.to_vec())
        } else {
            Chunk::Conflict {
                ours: ours.to_vec(),
                theirs: theirs.to_vec(),
            }
        }
    }
}

/// Merge `ours` and `theirs` relative to `base`, marking overlapping regions
pub fn merge(base: &[u8], ours: &[u8], theirs: &[u8], ours_label: &str, theirs_label: &str) -> TextMerge {
    let mut content = Vec::with_capacity(ours.len().max(theirs.len()));
    let mut conflicts = 0;

    for chunk in Diff3::new(base, ours, theirs).generate_chunks() {
        match chunk {
            Chunk::Clean(lines) => lines.iter().for_each(|line| content.extend_from_slice(line)),
            Chunk::Conflict { ours, theirs } => {
                conflicts += 1;
                write_conflict(&mut content, &ours.concat(), &theirs.concat(), ours_label, theirs_label);
            }
        }
    }

    TextMerge { content, conflicts }
}

/// Both versions in full between one pair of markers
pub fn whole_file_markers(ours: &[u8], theirs: &[u8], ours_label: &str, theirs_label: &str) -> Vec<u8> {
    let mut content = Vec::with_capacity(ours.len() + theirs.len() + 64);
    write_conflict(&mut content, ours, theirs, ours_label, theirs_label);

    content
}

fn write_conflict(content: &mut Vec<u8>, ours: &[u8], theirs: &[u8], ours_label: &str, theirs_label: &str) {
    content.extend_from_slice(format!("{OURS_MARKER} {ours_label}\n").as_bytes());
    write_side(content, ours);
    content.extend_from_slice(format!("{SEPARATOR_MARKER}\n").as_bytes());
    write_side(content, theirs);
    content.extend_from_slice(format!("{THEIRS_MARKER} {theirs_label}\n").as_bytes());
}

fn write_side(content: &mut Vec<u8>, side: &[u8]) {
    content.extend_from_slice(side);
    if !side.is_empty() && !side.ends_with(b"\n") {
        content.push(b'\n');
    }
}
