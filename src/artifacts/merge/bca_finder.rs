//! Best common ancestor of two commits
//!
//! ## Algorithm Overview
//!
//! ### Phase 1: Find All Common Ancestors
//!
//! A bidirectional traversal explores the history of both commits at once:
//! - Commits are processed newest first (max-heap on timestamp)
//! - Each commit carries the sides (source, target) it was reached from
//! - A commit reached from both sides is a common ancestor
//! - Ancestors of a common ancestor are marked STALE to prune the search
//!
//! ### Phase 2: Filter to Best Common Ancestors
//!
//! > A best common ancestor of X and Y is any common ancestor of X and Y
//! > that is not an ancestor of any other common ancestor.
//!
//! Each common ancestor is checked against the others with the same traversal;
//! any that is reachable from another is redundant. When several best
//! ancestors remain (criss-cross histories) the smallest id is returned, so
//! the result is deterministic.
//!
//! Commits are read through a loader closure, so the finder works on the
//! on-disk graph as well as on in-memory fixtures. Loader failures abort the
//! search.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
        const VISITED_FROM_BOTH = Self::VISITED_FROM_SOURCE.bits() | Self::VISITED_FROM_TARGET.bits();
        const STALE = 0b100;
        const RESULT = 0b1000;
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (VisitState::VISITED_FROM_SOURCE, "SOURCE"),
            (VisitState::VISITED_FROM_TARGET, "TARGET"),
            (VisitState::STALE, "STALE"),
            (VisitState::RESULT, "RESULT"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect::<Vec<_>>();

        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

/// Finds the best common ancestor of two commits.
///
/// `CommitLoaderFn` returns the parents and timestamp of a commit.
pub struct BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// `None` when the two histories share no commit
    pub fn find_best_common_ancestor(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let common_ancestors = self
            .find_common_ancestors(source_commit_id, HashSet::from([target_commit_id]))?
            .into_keys()
            .collect::<HashSet<_>>();

        if common_ancestors.is_empty() {
            tracing::debug!(source = %source_commit_id, target = %target_commit_id, "no common ancestor");
            return Ok(None);
        }
        tracing::debug!(candidates = common_ancestors.len(), "found common ancestors");

        let mut redundant_ancestors = HashSet::<ObjectId>::new();
        for commit in &common_ancestors {
            if redundant_ancestors.contains(commit) {
                continue;
            }

            let others = common_ancestors
                .iter()
                .filter(|other| *other != commit && !redundant_ancestors.contains(*other))
                .collect::<HashSet<_>>();
            let common_states = self.find_common_ancestors(commit, others.clone())?;

            if common_states
                .get(commit)
                .unwrap_or(&VisitState::NONE)
                .contains(VisitState::VISITED_FROM_TARGET)
            {
                redundant_ancestors.insert(commit.clone());
            }

            for other in others {
                if common_states
                    .get(other)
                    .unwrap_or(&VisitState::NONE)
                    .contains(VisitState::VISITED_FROM_SOURCE)
                {
                    redundant_ancestors.insert(other.clone());
                }
            }
        }

        let best_common_ancestor = common_ancestors
            .into_iter()
            .filter(|commit| !redundant_ancestors.contains(commit))
            .min();
        tracing::debug!(
            redundant = redundant_ancestors.len(),
            best = ?best_common_ancestor.as_ref().map(ObjectId::to_short_oid),
            "filtered common ancestors"
        );

        Ok(best_common_ancestor)
    }

    /// Visit states of the common ancestors of `source` and any of `targets`,
    /// stale ones excluded.
    fn find_common_ancestors(
        &self,
        source_commit_id: &ObjectId,
        target_commit_ids: HashSet<&ObjectId>,
    ) -> anyhow::Result<HashMap<ObjectId, VisitState>> {
        if target_commit_ids.contains(source_commit_id) {
            return Ok(HashMap::from([(source_commit_id.clone(), VisitState::RESULT)]));
        }

        let mut ancestors_states = HashMap::<ObjectId, VisitState>::new();
        let mut loaded = HashMap::<ObjectId, SlimCommit>::new();
        let mut priority_queue = BinaryHeap::new();

        let source_commit = self.load(&mut loaded, source_commit_id)?;
        ancestors_states.insert(source_commit.oid.clone(), VisitState::VISITED_FROM_SOURCE);
        priority_queue.push((source_commit.timestamp, source_commit.oid));

        for &target_commit_id in target_commit_ids.iter() {
            let target_commit = self.load(&mut loaded, target_commit_id)?;
            *ancestors_states
                .entry(target_commit_id.clone())
                .or_insert(VisitState::NONE) |= VisitState::VISITED_FROM_TARGET;
            priority_queue.push((target_commit.timestamp, target_commit.oid));
        }

        while let Some((_, commit_id)) = priority_queue.pop() {
            let current_state = ancestors_states
                .get(&commit_id)
                .copied()
                .unwrap_or(VisitState::NONE);
            tracing::trace!(commit = %commit_id.to_short_oid(), state = ?current_state, "visiting");

            if current_state.contains(VisitState::STALE) {
                continue;
            }

            let is_common_ancestor = current_state.contains(VisitState::VISITED_FROM_BOTH);
            if is_common_ancestor {
                ancestors_states
                    .entry(commit_id.clone())
                    .and_modify(|state| *state |= VisitState::RESULT);
            }

            let current_commit = self.load(&mut loaded, &commit_id)?;
            for parent_id in &current_commit.parents {
                let parent_commit = self.load(&mut loaded, parent_id)?;
                let parent_state = ancestors_states
                    .get(parent_id)
                    .copied()
                    .unwrap_or(VisitState::NONE);

                let mut new_state = parent_state | current_state;
                if is_common_ancestor {
                    new_state |= VisitState::STALE;
                }

                if !parent_state.contains(current_state) {
                    ancestors_states.insert(parent_id.clone(), new_state);
                    priority_queue.push((parent_commit.timestamp, parent_id.clone()));
                }
            }
        }

        Ok(ancestors_states
            .into_iter()
            .filter(|(_, state)| {
                !state.contains(VisitState::STALE) && state.contains(VisitState::RESULT)
            })
            .collect())
    }

    fn load(
        &self,
        loaded: &mut HashMap<ObjectId, SlimCommit>,
        commit_id: &ObjectId,
    ) -> anyhow::Result<SlimCommit> {
        if let Some(commit) = loaded.get(commit_id) {
            return Ok(commit.clone());
        }

        let commit = (self.commit_loader)(commit_id)?;
        loaded.insert(commit_id.clone(), commit.clone());

        Ok(commit)
    }
}
