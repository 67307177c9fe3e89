use crate::areas::commits::CommitGraph;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use chrono::{DateTime, FixedOffset};
use std::collections::{BinaryHeap, HashSet};

/// A commit visited by a history walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub oid: ObjectId,
    pub commit: Commit,
}

/// First-parent history from a starting commit, newest first.
///
/// Commits are loaded lazily; a load failure is yielded once and ends the walk.
/// A clone taken before iterating restarts the walk; a clone taken mid-walk
/// continues from where the original stands.
#[derive(Clone)]
pub struct RevList<'g> {
    graph: &'g CommitGraph,
    next_oid: Option<ObjectId>,
    remaining: Option<usize>,
}

impl<'g> RevList<'g> {
    pub fn new(graph: &'g CommitGraph, start: Option<ObjectId>, limit: Option<usize>) -> Self {
        RevList {
            graph,
            next_oid: start,
            remaining: limit,
        }
    }
}

impl Iterator for RevList<'_> {
    type Item = anyhow::Result<HistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        let oid = self.next_oid.take()?;

        match self.graph.load(&oid) {
            Ok(commit) => {
                self.next_oid = commit.parent().cloned();
                self.remaining = self.remaining.map(|remaining| remaining - 1);
                Some(Ok(HistoryEntry { oid, commit }))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct QueuedCommit {
    timestamp: DateTime<FixedOffset>,
    entry: HistoryEntry,
}

impl Ord for QueuedCommit {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.entry.oid.cmp(&other.entry.oid))
    }
}

impl PartialOrd for QueuedCommit {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Every commit reachable from a starting commit through any parent,
/// newest first, each exactly once.
pub struct AllRevList<'g> {
    graph: &'g CommitGraph,
    queue: BinaryHeap<QueuedCommit>,
    seen: HashSet<ObjectId>,
    pending_error: Option<anyhow::Error>,
    remaining: Option<usize>,
}

impl<'g> AllRevList<'g> {
    pub fn new(graph: &'g CommitGraph, start: Option<ObjectId>, limit: Option<usize>) -> Self {
        let mut rev_list = AllRevList {
            graph,
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
            pending_error: None,
            remaining: limit,
        };
        if let Some(start) = start {
            rev_list.enqueue(start);
        }

        rev_list
    }

    fn enqueue(&mut self, oid: ObjectId) {
        if !self.seen.insert(oid.clone()) {
            return;
        }

        match self.graph.load(&oid) {
            Ok(commit) => self.queue.push(QueuedCommit {
                timestamp: commit.timestamp(),
                entry: HistoryEntry { oid, commit },
            }),
            Err(e) => {
                if self.pending_error.is_none() {
                    self.pending_error = Some(e);
                }
            }
        }
    }
}

impl Iterator for AllRevList<'_> {
    type Item = anyhow::Result<HistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending_error.take() {
            self.queue.clear();
            return Some(Err(e));
        }
        if self.remaining == Some(0) {
            return None;
        }

        let QueuedCommit { entry, .. } = self.queue.pop()?;
        for parent in entry.commit.parents().to_vec() {
            self.enqueue(parent);
        }
        self.remaining = self.remaining.map(|remaining| remaining - 1);

        Some(Ok(entry))
    }
}
