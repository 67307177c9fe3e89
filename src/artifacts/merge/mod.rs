//! Merging two lines of history
//!
//! - `bca_finder`: best common ancestor (merge base) of two commits
//! - `tree_merge`: per-path three-way classification of base, ours and theirs
//! - `three_way`: line-based three-way merge of one text file (diff3)
//! - `merge_state`: the pending merge recorded while conflicts await resolution
//! - `outcome`: what a merge reports back to the caller

pub mod bca_finder;
pub mod merge_state;
pub mod outcome;
pub mod three_way;
pub mod tree_merge;
